//! Error types for the galois-ec library

/// Error types for the galois-ec library
#[derive(Debug, thiserror::Error)]
pub enum ErasureCodeError {
    /// The `(k, m, w)` combination cannot form a code
    #[error("Invalid parameters: k={k}, m={m}, w={w}: {reason}")]
    InvalidParameters {
        k: usize,
        m: usize,
        w: usize,
        reason: String,
    },

    /// The backend does not support this symbol width
    #[error("Unsupported field width: w={w}")]
    UnsupportedWidth { w: usize },

    /// Fewer than `k` usable fragments remain
    #[error("Insufficient fragments: need {needed}, only {available} usable")]
    InsufficientFragments { needed: usize, available: usize },

    /// A fragment index outside `0..k+m`
    #[error("Invalid fragment index: {index} (fragment count is {total})")]
    InvalidFragmentIndex { index: usize, total: usize },

    /// Wrong number of data or parity buffers passed in
    #[error("Fragment count mismatch: expected {expected} {kind} fragments, got {got}")]
    FragmentCountMismatch {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    /// `blocksize` is zero or not a multiple of the coder alignment
    #[error("Misaligned block size: {blocksize} bytes is not a non-zero multiple of {alignment}")]
    MisalignedBlockSize { blocksize: usize, alignment: usize },

    /// A fragment buffer is shorter than `blocksize`
    #[error("Fragment {index} too short: {len} bytes, block size is {blocksize}")]
    FragmentTooShort {
        index: usize,
        len: usize,
        blocksize: usize,
    },

    /// Gaussian elimination found no pivot
    #[error("Singular matrix: {dimension}x{dimension} decoding matrix is not invertible")]
    SingularMatrix { dimension: usize },

    /// Division by the zero element of the field
    #[error("Division by zero in GF(2^w)")]
    DivisionByZero,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience Result type for erasure coding operations
pub type Result<T> = std::result::Result<T, ErasureCodeError>;
