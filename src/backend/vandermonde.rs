//! Reed-Solomon with a systematic Vandermonde generator.
//!
//! Parity fragment `i` is `sum_j G[i][j] * data_j` over GF(2^w), computed with
//! region multiplies. The first parity row of `G` is all ones, so parity 0
//! is the XOR of the data and a single lost data fragment is recovered from
//! it without inverting anything.

use tracing::debug;

use super::{check_counts, check_fragments, BackendInfo, BackendKind, CoderConfig, ErasureBackend};
use crate::{
    config::{CoderArgs, VANDERMONDE_WIDTHS},
    decoding::{self, CodingKernel},
    galois::{FieldArithmetic, GaloisField},
    matrix::{vandermonde, Matrix},
    ErasureCodeError, Result,
};

#[derive(Debug)]
pub struct RsVandermonde<F: FieldArithmetic = GaloisField> {
    config: CoderConfig,
    field: F,
    generator: Matrix,
}

impl RsVandermonde<GaloisField> {
    /// Validate `args` and build the coder, defaulting `w` to 16.
    pub fn new(args: &CoderArgs) -> Result<Self> {
        let w = args.w.unwrap_or(BackendKind::RsVandermonde.default_width());
        check_width(args.k, args.m, w)?;
        Self::with_field(args, GaloisField::new(w)?)
    }
}

impl<F: FieldArithmetic> RsVandermonde<F> {
    /// Build the coder on an explicit field implementation.
    ///
    /// The field's width wins over `args.w`.
    pub fn with_field(args: &CoderArgs, field: F) -> Result<Self> {
        let w = field.width();
        check_width(args.k, args.m, w)?;

        let generator = vandermonde::coding_matrix(&field, args.k, args.m)?;
        debug!(k = args.k, m = args.m, w, "built Vandermonde generator");

        Ok(Self {
            config: CoderConfig {
                k: args.k,
                m: args.m,
                w,
            },
            field,
            generator,
        })
    }

    pub fn generator(&self) -> &Matrix {
        &self.generator
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    fn validate<D: AsRef<[u8]>, P: AsRef<[u8]>>(
        &self,
        data: &[D],
        parity: &[P],
        blocksize: usize,
    ) -> Result<()> {
        check_fragments(&self.config, self.alignment(), data, parity, blocksize)
    }
}

fn check_width(k: usize, m: usize, w: usize) -> Result<()> {
    check_counts(k, m, w)?;
    if !VANDERMONDE_WIDTHS.contains(&w) {
        return Err(ErasureCodeError::UnsupportedWidth { w });
    }
    Ok(())
}

impl<F: FieldArithmetic> CodingKernel for RsVandermonde<F> {
    type Symbol = u32;

    fn data_fragments(&self) -> usize {
        self.config.k
    }

    fn parity_fragments(&self) -> usize {
        self.config.m
    }

    fn rows_per_fragment(&self) -> usize {
        1
    }

    fn generator(&self) -> &[u32] {
        self.generator.as_slice()
    }

    fn invert(&self, matrix: Vec<u32>, dim: usize) -> Result<Vec<u32>> {
        Ok(Matrix::from_vec(dim, dim, matrix)
            .invert(&self.field)?
            .into_vec())
    }

    /// Ones are copied or XOR-ed in first, then every other coefficient is
    /// applied with a multiply-accumulate.
    fn dotprod(&self, row: &[u32], sources: &[&[u8]], dest: &mut [u8]) -> Result<()> {
        let mut started = false;

        for (&coefficient, src) in row.iter().zip(sources) {
            if coefficient != 1 {
                continue;
            }
            if started {
                self.field.region_xor(src, dest);
            } else {
                dest.copy_from_slice(src);
                started = true;
            }
        }

        for (&coefficient, src) in row.iter().zip(sources) {
            if coefficient == 0 || coefficient == 1 {
                continue;
            }
            self.field
                .region_multiply(src, coefficient, dest, started)?;
            started = true;
        }

        if !started {
            dest.fill(0);
        }
        Ok(())
    }

    fn first_parity_row_is_ones(&self) -> bool {
        true
    }
}

impl<F: FieldArithmetic> ErasureBackend for RsVandermonde<F> {
    fn info(&self) -> BackendInfo {
        BackendInfo::for_kind(BackendKind::RsVandermonde)
    }

    fn config(&self) -> CoderConfig {
        self.config
    }

    fn alignment(&self) -> usize {
        self.config.w / 8
    }

    fn element_size(&self) -> usize {
        self.config.w
    }

    fn encode(&self, data: &[&[u8]], parity: &mut [&mut [u8]], blocksize: usize) -> Result<()> {
        self.validate(data, parity, blocksize)?;
        let sources: Vec<&[u8]> = data.iter().map(|d| &d[..blocksize]).collect();
        for (i, out) in parity.iter_mut().enumerate() {
            self.dotprod(self.generator.row(i), &sources, &mut out[..blocksize])?;
        }
        Ok(())
    }

    fn decode(
        &self,
        data: &mut [&mut [u8]],
        parity: &mut [&mut [u8]],
        missing: &[usize],
        blocksize: usize,
    ) -> Result<()> {
        self.validate(data, parity, blocksize)?;
        decoding::decode(self, data, parity, missing, blocksize)
    }

    fn reconstruct(
        &self,
        data: &mut [&mut [u8]],
        parity: &mut [&mut [u8]],
        missing: &[usize],
        destination: usize,
        blocksize: usize,
    ) -> Result<()> {
        self.validate(data, parity, blocksize)?;
        decoding::reconstruct(self, data, parity, missing, destination, blocksize)
    }
}
