//! Erasure-coding backends and their common interface.
//!
//! - [`vandermonde`]: Reed-Solomon over GF(2^w) with a systematic Vandermonde
//!   generator, `w` in {8, 16, 32}
//! - [`cauchy`]: Reed-Solomon with a Cauchy generator expanded to a
//!   bit-matrix and applied with XOR only, any `w` up to 32
//!
//! A backend is configured once for a fixed `(k, m, w)` and is immutable
//! afterwards, so one instance may serve concurrent encode and decode calls.

pub mod cauchy;
pub mod vandermonde;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{CoderArgs, BACKEND_VERSION, DEFAULT_CAUCHY_WIDTH, DEFAULT_VANDERMONDE_WIDTH},
    selection, ErasureCodeError, Result,
};

pub use cauchy::RsCauchy;
pub use vandermonde::RsVandermonde;

/// The available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[serde(rename = "rs_vand")]
    RsVandermonde,
    RsCauchy,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::RsVandermonde, BackendKind::RsCauchy];

    /// Short registry name.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::RsVandermonde => "rs_vand",
            BackendKind::RsCauchy => "rs_cauchy",
        }
    }

    /// Name of the arithmetic the backend is built on.
    pub fn library(&self) -> &'static str {
        match self {
            BackendKind::RsVandermonde => "galois_region_multiply",
            BackendKind::RsCauchy => "galois_bitmatrix_xor",
        }
    }

    pub fn default_width(&self) -> usize {
        match self {
            BackendKind::RsVandermonde => DEFAULT_VANDERMONDE_WIDTH,
            BackendKind::RsCauchy => DEFAULT_CAUCHY_WIDTH,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub kind: BackendKind,
    pub name: &'static str,
    pub library: &'static str,
    pub version: u32,
}

impl BackendInfo {
    pub fn for_kind(kind: BackendKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            library: kind.library(),
            version: BACKEND_VERSION,
        }
    }
}

/// The resolved parameters of a configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoderConfig {
    pub k: usize,
    pub m: usize,
    pub w: usize,
}

impl CoderConfig {
    pub fn total_fragments(&self) -> usize {
        self.k + self.m
    }
}

/// Operations every backend provides.
///
/// Fragment buffers are caller-owned: data fragments `0..k`, parity
/// fragments `k..k+m`. Only the first `blocksize` bytes of each buffer are
/// read or written, and `blocksize` must be a non-zero multiple of
/// [`alignment`](ErasureBackend::alignment).
pub trait ErasureBackend: Send + Sync {
    fn info(&self) -> BackendInfo;

    fn config(&self) -> CoderConfig;

    /// Fragment size granularity in bytes.
    fn alignment(&self) -> usize;

    /// Bits per codeword stored in each fragment.
    fn element_size(&self) -> usize;

    /// Compute all `m` parity fragments from the `k` data fragments.
    fn encode(&self, data: &[&[u8]], parity: &mut [&mut [u8]], blocksize: usize) -> Result<()>;

    /// Rebuild every fragment listed in `missing` in place.
    fn decode(
        &self,
        data: &mut [&mut [u8]],
        parity: &mut [&mut [u8]],
        missing: &[usize],
        blocksize: usize,
    ) -> Result<()>;

    /// Rebuild the single fragment `destination`.
    ///
    /// Rebuilding a parity fragment decodes everything in `missing` as a
    /// side effect.
    fn reconstruct(
        &self,
        data: &mut [&mut [u8]],
        parity: &mut [&mut [u8]],
        missing: &[usize],
        destination: usize,
        blocksize: usize,
    ) -> Result<()>;

    /// The `k` fragments to fetch given the missing and excluded ones.
    fn min_fragments_needed(&self, missing: &[usize], excluded: &[usize]) -> Result<Vec<usize>> {
        let config = self.config();
        selection::min_fragments_needed(config.k, config.m, missing, excluded)
    }

    /// Exact version match only.
    fn is_compatible_with(&self, version: u32) -> bool {
        version == self.info().version
    }

    /// Per-fragment metadata bytes the backend needs. Always zero.
    fn metadata_size(&self) -> usize {
        0
    }

    /// Byte offset of the payload within a fragment. Always zero.
    fn encode_offset(&self) -> usize {
        0
    }

    /// Release the backend and everything it owns.
    fn exit(self: Box<Self>) -> Result<()> {
        let config = self.config();
        debug!(backend = %self.info().kind, k = config.k, m = config.m, w = config.w, "releasing backend");
        drop(self);
        Ok(())
    }
}

/// Build a backend of the given kind.
pub fn create_backend(kind: BackendKind, args: &CoderArgs) -> Result<Box<dyn ErasureBackend>> {
    Ok(match kind {
        BackendKind::RsVandermonde => Box::new(RsVandermonde::new(args)?),
        BackendKind::RsCauchy => Box::new(RsCauchy::new(args)?),
    })
}

/// Reject `k` or `m` of zero before any field work is done.
pub(crate) fn check_counts(k: usize, m: usize, w: usize) -> Result<()> {
    if k == 0 || m == 0 {
        return Err(ErasureCodeError::InvalidParameters {
            k,
            m,
            w,
            reason: "k and m must both be positive".to_string(),
        });
    }
    Ok(())
}

/// Validate fragment counts, block size and buffer lengths for one call.
pub(crate) fn check_fragments<D: AsRef<[u8]>, P: AsRef<[u8]>>(
    config: &CoderConfig,
    alignment: usize,
    data: &[D],
    parity: &[P],
    blocksize: usize,
) -> Result<()> {
    if data.len() != config.k {
        return Err(ErasureCodeError::FragmentCountMismatch {
            kind: "data",
            expected: config.k,
            got: data.len(),
        });
    }
    if parity.len() != config.m {
        return Err(ErasureCodeError::FragmentCountMismatch {
            kind: "parity",
            expected: config.m,
            got: parity.len(),
        });
    }
    if blocksize == 0 || blocksize % alignment != 0 {
        return Err(ErasureCodeError::MisalignedBlockSize {
            blocksize,
            alignment,
        });
    }

    let lengths = data
        .iter()
        .map(|d| d.as_ref().len())
        .chain(parity.iter().map(|p| p.as_ref().len()));
    for (index, len) in lengths.enumerate() {
        if len < blocksize {
            return Err(ErasureCodeError::FragmentTooShort {
                index,
                len,
                blocksize,
            });
        }
    }
    Ok(())
}
