//! Bit-matrix expansion of GF(2^w) matrices.
//!
//! Multiplication by a fixed field element is linear over GF(2), so each
//! element of an `m x k` matrix can be replaced by a `w x w` 0/1 block. The
//! resulting `(m*w) x (k*w)` matrix is applied to fragments split into `w`
//! packets per chunk using nothing but copy and XOR.

use crate::{
    galois::{region_xor, FieldArithmetic},
    matrix::Matrix,
    ErasureCodeError, Result,
};

/// Row-major matrix over GF(2), one byte (0 or 1) per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    bits: Vec<u8>,
}

impl BitMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.set(i, i, true);
        }
        matrix
    }

    /// Wrap a row-major 0/1 buffer of exactly `rows * cols` entries.
    pub fn from_vec(rows: usize, cols: usize, bits: Vec<u8>) -> Self {
        debug_assert_eq!(bits.len(), rows * cols);
        Self { rows, cols, bits }
    }

    /// Expand an `m x k` field matrix into its `(m*w) x (k*w)` bit form.
    ///
    /// Column `x` of the block for element `e` holds the bits of `e * 2^x`,
    /// row `l` being bit `l`.
    pub fn from_matrix<F: FieldArithmetic + ?Sized>(field: &F, matrix: &Matrix) -> Self {
        let w = field.width();
        let (m, k) = (matrix.rows(), matrix.cols());
        let mut bitmatrix = Self::zeros(m * w, k * w);

        for i in 0..m {
            for j in 0..k {
                let mut element = matrix.get(i, j);
                for x in 0..w {
                    for l in 0..w {
                        bitmatrix.set(i * w + l, j * w + x, (element >> l) & 1 == 1);
                    }
                    if x + 1 < w {
                        element = field.mul(element, 2);
                    }
                }
            }
        }
        bitmatrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.cols + col] != 0
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.bits[row * self.cols + col] = u8::from(value);
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.bits[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bits
    }

    /// Number of ones in `row`.
    pub fn row_weight(&self, row: usize) -> usize {
        self.row(row).iter().filter(|&&b| b != 0).count()
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.bits.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    fn xor_row_into(&mut self, src: usize, dst: usize) {
        for col in 0..self.cols {
            self.bits[dst * self.cols + col] ^= self.bits[src * self.cols + col];
        }
    }

    /// Invert a square bit-matrix by Gauss-Jordan elimination over GF(2).
    pub fn invert(&self) -> Result<Self> {
        let n = self.rows;
        if n != self.cols {
            return Err(ErasureCodeError::SingularMatrix { dimension: n });
        }

        let mut work = self.clone();
        let mut inverse = Self::identity(n);

        for i in 0..n {
            let pivot_row = (i..n)
                .find(|&r| work.get(r, i))
                .ok_or(ErasureCodeError::SingularMatrix { dimension: n })?;
            work.swap_rows(i, pivot_row);
            inverse.swap_rows(i, pivot_row);

            for r in 0..n {
                if r != i && work.get(r, i) {
                    work.xor_row_into(i, r);
                    inverse.xor_row_into(i, r);
                }
            }
        }

        Ok(inverse)
    }
}

/// Apply `w` consecutive bit-matrix rows to `k` source fragments.
///
/// `rows` is a `w x (k*w)` row-major block. Fragments are processed in chunks
/// of `w * packet_size` bytes; within a chunk, packet `x` carries bit `x` of
/// every symbol. Destination packet `j` becomes the XOR of the source packets
/// selected by row `j`, or zeros when the row is empty.
pub fn dotprod(
    rows: &[u8],
    k: usize,
    w: usize,
    sources: &[&[u8]],
    dest: &mut [u8],
    packet_size: usize,
) {
    let row_len = k * w;
    let chunk = w * packet_size;
    debug_assert_eq!(rows.len(), w * row_len);
    debug_assert_eq!(dest.len() % chunk, 0);

    for offset in (0..dest.len()).step_by(chunk) {
        for (j, bits) in rows.chunks_exact(row_len).enumerate() {
            let start = offset + j * packet_size;
            let out = &mut dest[start..start + packet_size];
            let mut started = false;

            for (col, _) in bits.iter().enumerate().filter(|(_, &b)| b != 0) {
                let (fragment, packet) = (col / w, col % w);
                let from = offset + packet * packet_size;
                let src = &sources[fragment][from..from + packet_size];
                if started {
                    region_xor(src, out);
                } else {
                    out.copy_from_slice(src);
                    started = true;
                }
            }

            if !started {
                out.fill(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galois::GaloisField;

    #[test]
    fn identity_element_expands_to_identity_block() {
        let field = GaloisField::new(4).unwrap();
        let matrix = Matrix::from_vec(1, 1, vec![1]);
        assert_eq!(BitMatrix::from_matrix(&field, &matrix), BitMatrix::identity(4));
    }

    #[test]
    fn block_multiplies_like_the_field() {
        let field = GaloisField::new(8).unwrap();
        for element in [2u32, 0x42, 0x8e, 0xff] {
            let block = BitMatrix::from_matrix(&field, &Matrix::from_vec(1, 1, vec![element]));
            for value in [1u32, 0x55, 0xaa, 0xc3] {
                let mut product = 0u32;
                for l in 0..8 {
                    let bit = (0..8)
                        .filter(|&x| block.get(l, x) && (value >> x) & 1 == 1)
                        .count()
                        % 2;
                    product |= (bit as u32) << l;
                }
                assert_eq!(product, field.mul(element, value));
            }
        }
    }

    #[test]
    fn inverse_block_is_inverse_element() {
        let field = GaloisField::new(5).unwrap();
        let element = 13u32;
        let block = BitMatrix::from_matrix(&field, &Matrix::from_vec(1, 1, vec![element]));
        let expected = BitMatrix::from_matrix(
            &field,
            &Matrix::from_vec(1, 1, vec![field.inverse(element).unwrap()]),
        );
        assert_eq!(block.invert().unwrap(), expected);
    }

    #[test]
    fn singular_bitmatrix_is_rejected() {
        let matrix = BitMatrix::from_vec(2, 2, vec![1, 1, 1, 1]);
        assert!(matches!(
            matrix.invert(),
            Err(ErasureCodeError::SingularMatrix { dimension: 2 })
        ));
    }

    #[test]
    fn dotprod_selects_and_xors_packets() {
        // k = 2, w = 2, packet size 2: dest bit 0 = a0 ^ b1, dest bit 1 = a1
        let rows = [1u8, 0, 0, 1, 0, 1, 0, 0];
        let a = [0x01u8, 0x02, 0x03, 0x04];
        let b = [0x10u8, 0x20, 0x30, 0x40];
        let mut dest = [0u8; 4];
        dotprod(&rows, 2, 2, &[&a[..], &b[..]], &mut dest, 2);
        assert_eq!(dest, [0x01 ^ 0x30, 0x02 ^ 0x40, 0x03, 0x04]);
    }

    #[test]
    fn dotprod_zeroes_empty_rows() {
        let rows = [0u8; 4];
        let a = [0xffu8; 4];
        let mut dest = [0xeeu8; 4];
        dotprod(&rows, 1, 2, &[&a[..]], &mut dest, 2);
        assert_eq!(dest, [0u8; 4]);
    }
}
