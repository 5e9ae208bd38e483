//! Dense matrices over GF(2^w) and the generator-matrix builders.
//!
//! - [`vandermonde`]: systematic Vandermonde coding matrix
//! - [`cauchy`]: original Cauchy coding matrix
//!
//! A generator matrix is `m x k`; stacked under the `k x k` identity, any `k`
//! of the resulting `k + m` rows form an invertible matrix.

pub mod cauchy;
pub mod vandermonde;

use crate::{galois::FieldArithmetic, ErasureCodeError, Result};

/// Check that the field has at least `k + m` distinct elements.
pub fn check_capacity(k: usize, m: usize, w: usize) -> Result<()> {
    let total = (k + m) as u64;
    if w < 64 && total > (1u64 << w) {
        return Err(ErasureCodeError::InvalidParameters {
            k,
            m,
            w,
            reason: format!("k + m = {} exceeds field size 2^{}", total, w),
        });
    }
    Ok(())
}

/// Row-major matrix of field elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl Matrix {
    /// All-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.set(i, i, 1);
        }
        matrix
    }

    /// Wrap a row-major buffer of exactly `rows * cols` elements.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<u32>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[u32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.data
    }

    /// Copy rows `start..start + count` into a new matrix.
    pub fn sub_rows(&self, start: usize, count: usize) -> Self {
        Self::from_vec(
            count,
            self.cols,
            self.data[start * self.cols..(start + count) * self.cols].to_vec(),
        )
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    /// Invert a square matrix by Gauss-Jordan elimination.
    pub fn invert<F: FieldArithmetic + ?Sized>(&self, field: &F) -> Result<Self> {
        let n = self.rows;
        if n != self.cols {
            return Err(ErasureCodeError::SingularMatrix { dimension: n });
        }

        let mut work = self.clone();
        let mut inverse = Self::identity(n);

        for i in 0..n {
            let pivot_row = (i..n)
                .find(|&r| work.get(r, i) != 0)
                .ok_or(ErasureCodeError::SingularMatrix { dimension: n })?;
            work.swap_rows(i, pivot_row);
            inverse.swap_rows(i, pivot_row);

            let pivot = work.get(i, i);
            if pivot != 1 {
                let scale = field.inverse(pivot)?;
                for col in 0..n {
                    work.set(i, col, field.mul(work.get(i, col), scale));
                    inverse.set(i, col, field.mul(inverse.get(i, col), scale));
                }
            }

            for r in 0..n {
                let factor = work.get(r, i);
                if r == i || factor == 0 {
                    continue;
                }
                for col in 0..n {
                    let w = work.get(r, col) ^ field.mul(factor, work.get(i, col));
                    work.set(r, col, w);
                    let v = inverse.get(r, col) ^ field.mul(factor, inverse.get(i, col));
                    inverse.set(r, col, v);
                }
            }
        }

        Ok(inverse)
    }

    /// Matrix product over the field.
    pub fn multiply<F: FieldArithmetic + ?Sized>(&self, other: &Self, field: &F) -> Self {
        debug_assert_eq!(self.cols, other.rows);
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc = 0u32;
                for i in 0..self.cols {
                    acc ^= field.mul(self.get(r, i), other.get(i, c));
                }
                out.set(r, c, acc);
            }
        }
        out
    }
}
