//! Reed-Solomon with a Cauchy generator, applied as a bit-matrix.
//!
//! Fragments are processed in chunks of `w * packet_size` bytes. Encoding
//! runs a precomputed copy/XOR [`Schedule`]; decoding inverts the surviving
//! rows of the bit-matrix over GF(2). No field multiplication happens after
//! construction.

use tracing::debug;

use super::{check_counts, check_fragments, BackendInfo, BackendKind, CoderConfig, ErasureBackend};
use crate::{
    bitmatrix::{self, BitMatrix},
    config::{CoderArgs, DEFAULT_PACKET_SIZE},
    decoding::{self, CodingKernel},
    galois::{FieldArithmetic, GaloisField, MAX_FIELD_WIDTH},
    matrix::{cauchy, Matrix},
    schedule::Schedule,
    ErasureCodeError, Result,
};

#[derive(Debug)]
pub struct RsCauchy {
    config: CoderConfig,
    packet_size: usize,
    matrix: Matrix,
    bitmatrix: BitMatrix,
    schedule: Schedule,
}

impl RsCauchy {
    /// Validate `args` and build the coder, defaulting `w` to 4 and the
    /// packet size to [`DEFAULT_PACKET_SIZE`].
    pub fn new(args: &CoderArgs) -> Result<Self> {
        let w = args.w.unwrap_or(BackendKind::RsCauchy.default_width());
        check_counts(args.k, args.m, w)?;
        if w == 0 || w > MAX_FIELD_WIDTH {
            return Err(ErasureCodeError::UnsupportedWidth { w });
        }
        Self::with_field(args, &GaloisField::new(w)?)
    }

    /// Build the coder using `field` for matrix construction only.
    pub fn with_field<F: FieldArithmetic + ?Sized>(args: &CoderArgs, field: &F) -> Result<Self> {
        let (k, m, w) = (args.k, args.m, field.width());
        check_counts(k, m, w)?;

        let packet_size = args.packet_size.unwrap_or(DEFAULT_PACKET_SIZE);
        if packet_size == 0 {
            return Err(ErasureCodeError::InvalidParameters {
                k,
                m,
                w,
                reason: "packet size must be positive".to_string(),
            });
        }

        let matrix = cauchy::original_coding_matrix(field, k, m)?;
        let bitmatrix = BitMatrix::from_matrix(field, &matrix);
        let schedule = Schedule::smart(&bitmatrix, k, m, w);
        debug!(
            k,
            m,
            w,
            packet_size,
            operations = schedule.len(),
            "built Cauchy bit-matrix schedule"
        );

        Ok(Self {
            config: CoderConfig { k, m, w },
            packet_size,
            matrix,
            bitmatrix,
            schedule,
        })
    }

    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn bitmatrix(&self) -> &BitMatrix {
        &self.bitmatrix
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
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

impl CodingKernel for RsCauchy {
    type Symbol = u8;

    fn data_fragments(&self) -> usize {
        self.config.k
    }

    fn parity_fragments(&self) -> usize {
        self.config.m
    }

    fn rows_per_fragment(&self) -> usize {
        self.config.w
    }

    fn generator(&self) -> &[u8] {
        self.bitmatrix.as_slice()
    }

    fn invert(&self, matrix: Vec<u8>, dim: usize) -> Result<Vec<u8>> {
        Ok(BitMatrix::from_vec(dim, dim, matrix).invert()?.into_vec())
    }

    fn dotprod(&self, rows: &[u8], sources: &[&[u8]], dest: &mut [u8]) -> Result<()> {
        bitmatrix::dotprod(
            rows,
            self.config.k,
            self.config.w,
            sources,
            dest,
            self.packet_size,
        );
        Ok(())
    }

    fn first_parity_row_is_ones(&self) -> bool {
        false
    }
}

impl ErasureBackend for RsCauchy {
    fn info(&self) -> BackendInfo {
        BackendInfo::for_kind(BackendKind::RsCauchy)
    }

    fn config(&self) -> CoderConfig {
        self.config
    }

    fn alignment(&self) -> usize {
        self.config.w * self.packet_size
    }

    fn element_size(&self) -> usize {
        self.config.w * self.packet_size * 8
    }

    fn encode(&self, data: &[&[u8]], parity: &mut [&mut [u8]], blocksize: usize) -> Result<()> {
        self.validate(data, parity, blocksize)?;
        self.schedule
            .apply(data, parity, self.packet_size, blocksize);
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
