//! galois-ec: Reed-Solomon erasure coding over GF(2^w)
//!
//! This library splits nothing and stores nothing: it turns `k` equal-length
//! data fragments into `m` parity fragments such that any `k` of the `k + m`
//! fragments are enough to get the data back. Two backends share one decoder.
//!
//! ## Main Components
//!
//! - [`backend`]: the [`ErasureBackend`] trait and its two implementations,
//!   [`RsVandermonde`] and [`RsCauchy`]
//! - [`galois`]: GF(2^w) arithmetic behind the [`FieldArithmetic`] trait
//! - [`matrix`]: generator matrices and inversion over the field
//! - [`bitmatrix`]: GF(2) expansion of field matrices
//! - [`schedule`]: copy/XOR schedules for bit-matrix encoding
//! - [`decoding`]: erasure maps and the shared decoder
//! - [`selection`]: choosing which `k` fragments to fetch
//! - [`config`]: constants and [`CoderArgs`]
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<T, ErasureCodeError>`. Bad
//! `(k, m, w)` combinations fail at construction; insufficient or malformed
//! fragment sets fail per call and leave the caller's buffers as they were.
//!
//! ## Quick Start
//!
//! ```rust
//! use galois_ec::{create_backend, BackendKind, CoderArgs, ErasureCodeError};
//!
//! let backend = create_backend(BackendKind::RsVandermonde, &CoderArgs::new(4, 2).with_width(8))?;
//!
//! let blocksize = 64;
//! let data: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; blocksize]).collect();
//! let mut parity = vec![vec![0u8; blocksize]; 2];
//! {
//!     let data_refs: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();
//!     let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
//!     backend.encode(&data_refs, &mut parity_refs, blocksize)?;
//! }
//!
//! // Lose data fragment 1 and parity fragment 0 (global index 4).
//! let mut damaged = data.clone();
//! damaged[1].fill(0);
//! parity[0].fill(0);
//! {
//!     let mut data_refs: Vec<&mut [u8]> = damaged.iter_mut().map(|d| d.as_mut_slice()).collect();
//!     let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
//!     backend.decode(&mut data_refs, &mut parity_refs, &[1, 4], blocksize)?;
//! }
//! assert_eq!(damaged, data);
//! # Ok::<(), ErasureCodeError>(())
//! ```

pub mod backend;
pub mod bitmatrix;
pub mod config;
pub mod decoding;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod metrics;
pub mod schedule;
pub mod selection;

// Re-export commonly used types and functions for convenience
pub use backend::{
    create_backend, BackendInfo, BackendKind, CoderConfig, ErasureBackend, RsCauchy,
    RsVandermonde,
};
pub use bitmatrix::BitMatrix;
pub use config::CoderArgs;
pub use decoding::ErasureMap;
pub use error::{ErasureCodeError, Result};
pub use galois::{FieldArithmetic, GaloisField};
pub use matrix::Matrix;
pub use schedule::Schedule;
pub use selection::min_fragments_needed;
