//! Systematic Vandermonde coding matrix.
//!
//! Starts from a `(k + m) x k` extended Vandermonde matrix and uses column
//! operations, which preserve the any-`k`-rows-invertible property, to turn
//! the top `k x k` block into the identity. The parity block is then
//! normalised so that the first parity row and the first column are all ones;
//! decoding relies on the all-ones first parity row.

use super::{check_capacity, Matrix};
use crate::{galois::FieldArithmetic, ErasureCodeError, Result};

/// Extended Vandermonde matrix: first row `e_0`, last row `e_{cols-1}`, and
/// row `i` in between holding the powers `i^0 .. i^(cols-1)`.
pub fn extended_matrix<F: FieldArithmetic + ?Sized>(
    field: &F,
    rows: usize,
    cols: usize,
) -> Matrix {
    let mut vdm = Matrix::zeros(rows, cols);
    vdm.set(0, 0, 1);
    if rows == 1 {
        return vdm;
    }
    vdm.set(rows - 1, cols - 1, 1);

    for i in 1..rows - 1 {
        let mut acc = 1u32;
        for j in 0..cols {
            vdm.set(i, j, acc);
            acc = field.mul(acc, i as u32);
        }
    }
    vdm
}

/// Full `(k + m) x k` distribution matrix whose top `k` rows are the identity.
pub fn distribution_matrix<F: FieldArithmetic + ?Sized>(
    field: &F,
    rows: usize,
    cols: usize,
) -> Result<Matrix> {
    let mut dist = extended_matrix(field, rows, cols);

    for i in 1..cols {
        let pivot_row = (i..rows)
            .find(|&r| dist.get(r, i) != 0)
            .ok_or(ErasureCodeError::SingularMatrix { dimension: cols })?;
        dist.swap_rows(i, pivot_row);

        let pivot = dist.get(i, i);
        if pivot != 1 {
            let scale = field.inverse(pivot)?;
            for r in 0..rows {
                dist.set(r, i, field.mul(scale, dist.get(r, i)));
            }
        }

        // Clear row i outside the diagonal: col_j += e * col_i
        for j in 0..cols {
            let e = dist.get(i, j);
            if j == i || e == 0 {
                continue;
            }
            for r in 0..rows {
                let v = dist.get(r, j) ^ field.mul(e, dist.get(r, i));
                dist.set(r, j, v);
            }
        }
    }

    // First parity row to all ones, scaling parity columns only.
    for j in 0..cols {
        let e = dist.get(cols, j);
        if e != 1 {
            let scale = field.inverse(e)?;
            for r in cols..rows {
                dist.set(r, j, field.mul(scale, dist.get(r, j)));
            }
        }
    }

    // First column of every further parity row to one.
    for r in cols + 1..rows {
        let e = dist.get(r, 0);
        if e != 1 {
            let scale = field.inverse(e)?;
            for j in 0..cols {
                dist.set(r, j, field.mul(dist.get(r, j), scale));
            }
        }
    }

    Ok(dist)
}

/// The `m x k` parity block of the systematic Vandermonde code.
pub fn coding_matrix<F: FieldArithmetic + ?Sized>(field: &F, k: usize, m: usize) -> Result<Matrix> {
    let w = field.width();
    if k == 0 || m == 0 {
        return Err(ErasureCodeError::InvalidParameters {
            k,
            m,
            w,
            reason: "k and m must both be positive".to_string(),
        });
    }
    check_capacity(k, m, w)?;

    let dist = distribution_matrix(field, k + m, k)?;
    Ok(dist.sub_rows(k, m))
}
