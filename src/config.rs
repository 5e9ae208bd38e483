//! Centralized configuration for the galois-ec coders.
//!
//! This module contains constants and default parameters used throughout the
//! library and binaries, plus [`CoderArgs`], the user-facing set of coder
//! parameters that can be loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::{ErasureCodeError, Result};

// --- Field Widths ---

/// Default symbol width for the Vandermonde coder.
pub const DEFAULT_VANDERMONDE_WIDTH: usize = 16;

/// Default symbol width for the Cauchy coder.
pub const DEFAULT_CAUCHY_WIDTH: usize = 4;

/// Symbol widths the Vandermonde coder can apply with region multiplies.
pub const VANDERMONDE_WIDTHS: [usize; 3] = [8, 16, 32];

// --- Bit-Matrix Parameters ---

/// Default packet size in bytes for bit-matrix coding.
/// One machine word times 128, i.e. 1024 bytes on 64-bit targets.
pub const DEFAULT_PACKET_SIZE: usize = std::mem::size_of::<usize>() * 128;

// --- Backend Versioning ---

/// Backend version, packed as `(major << 16) | (minor << 8) | rev`.
pub const BACKEND_VERSION_MAJOR: u32 = 2;
pub const BACKEND_VERSION_MINOR: u32 = 0;
pub const BACKEND_VERSION_REV: u32 = 0;

/// Pack a `major.minor.rev` triple into a single version word.
#[inline]
pub const fn encode_version(major: u32, minor: u32, rev: u32) -> u32 {
    (major << 16) | (minor << 8) | rev
}

/// The packed version both backends report.
pub const BACKEND_VERSION: u32 =
    encode_version(BACKEND_VERSION_MAJOR, BACKEND_VERSION_MINOR, BACKEND_VERSION_REV);

// --- Simulator Defaults ---

/// Default number of data fragments in the simulator.
pub const DEFAULT_DATA_FRAGMENTS: usize = 10;

/// Default number of parity fragments in the simulator.
pub const DEFAULT_PARITY_FRAGMENTS: usize = 4;

/// Default number of fragments the simulator erases.
pub const DEFAULT_ERASURES: usize = 2;

/// Target fragment size for the simulator; rounded up to the coder alignment.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

// --- Test-related Constants ---

/// A fixed random seed used in tests to ensure deterministic behavior.
pub const TEST_RANDOM_SEED: u64 = 42;

/// Parameters a coder is built from.
///
/// `w` and `packet_size` are optional; each backend fills in its own default.
/// `packet_size` is ignored by the Vandermonde coder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderArgs {
    pub k: usize,
    pub m: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_size: Option<usize>,
}

impl CoderArgs {
    pub fn new(k: usize, m: usize) -> Self {
        Self {
            k,
            m,
            w: None,
            packet_size: None,
        }
    }

    pub fn with_width(mut self, w: usize) -> Self {
        self.w = Some(w);
        self
    }

    pub fn with_packet_size(mut self, packet_size: usize) -> Self {
        self.packet_size = Some(packet_size);
        self
    }

    /// Parse arguments from a JSON document such as `{"k": 10, "m": 4, "w": 8}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ErasureCodeError::Serialization(format!("Failed to parse coder arguments: {}", e))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ErasureCodeError::Serialization(format!("Failed to serialize coder arguments: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_packing() {
        assert_eq!(BACKEND_VERSION, 0x0002_0000);
        assert_eq!(encode_version(1, 2, 3), 0x0001_0203);
    }

    #[test]
    fn args_json_round_trip_keeps_optional_fields() {
        let args = CoderArgs::new(6, 3).with_width(8);
        let json = args.to_json().unwrap();
        assert!(!json.contains("packet_size"));
        assert_eq!(CoderArgs::from_json(&json).unwrap(), args);
    }

    #[test]
    fn args_json_defaults_missing_fields() {
        let args = CoderArgs::from_json(r#"{"k": 4, "m": 2}"#).unwrap();
        assert_eq!(args, CoderArgs::new(4, 2));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            CoderArgs::from_json("{\"k\": 4"),
            Err(ErasureCodeError::Serialization(_))
        ));
    }
}
