//! Cauchy coding matrix.
//!
//! With `X = {0, .., m-1}` and `Y = {m, .., m+k-1}`, entry `(i, j)` is
//! `1 / (x_i + y_j)`. Every square submatrix of a Cauchy matrix is
//! non-singular, which is exactly the MDS property for `[I; C]`.

use super::{check_capacity, Matrix};
use crate::{galois::FieldArithmetic, ErasureCodeError, Result};

/// The `m x k` Cauchy coding matrix over GF(2^w).
pub fn original_coding_matrix<F: FieldArithmetic + ?Sized>(
    field: &F,
    k: usize,
    m: usize,
) -> Result<Matrix> {
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

    let mut matrix = Matrix::zeros(m, k);
    for i in 0..m {
        for j in 0..k {
            let denominator = (i ^ (m + j)) as u32;
            matrix.set(i, j, field.inverse(denominator)?);
        }
    }
    Ok(matrix)
}
