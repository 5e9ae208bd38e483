//! Test fixtures: backends, fragment sets and erasure patterns.
//!
//! `FragmentSet` owns one encoded object and hands out the slice views the
//! backend API expects, so individual tests never juggle borrow vectors.

#![allow(dead_code)]

use galois_ec::{config, create_backend, BackendKind, CoderArgs, ErasureBackend, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Packet size used for Cauchy coders in tests; keeps fragments small.
pub const TEST_PACKET_SIZE: usize = 8;

/// One backend configuration.
#[derive(Debug, Clone, Copy)]
pub struct CoderSpec {
    pub kind: BackendKind,
    pub k: usize,
    pub m: usize,
    pub w: usize,
}

impl CoderSpec {
    pub const fn new(kind: BackendKind, k: usize, m: usize, w: usize) -> Self {
        Self { kind, k, m, w }
    }

    pub fn args(&self) -> CoderArgs {
        CoderArgs::new(self.k, self.m)
            .with_width(self.w)
            .with_packet_size(TEST_PACKET_SIZE)
    }

    pub fn build(&self) -> Box<dyn ErasureBackend> {
        create_backend(self.kind, &self.args())
            .unwrap_or_else(|e| panic!("failed to build {:?}: {}", self, e))
    }
}

/// A spread of small configurations for both backends.
pub fn small_coders() -> Vec<CoderSpec> {
    use BackendKind::{RsCauchy, RsVandermonde};
    vec![
        CoderSpec::new(RsVandermonde, 4, 2, 8),
        CoderSpec::new(RsVandermonde, 3, 3, 16),
        CoderSpec::new(RsVandermonde, 5, 3, 32),
        CoderSpec::new(RsVandermonde, 1, 2, 8),
        CoderSpec::new(RsCauchy, 4, 2, 4),
        CoderSpec::new(RsCauchy, 3, 3, 3),
        CoderSpec::new(RsCauchy, 5, 3, 8),
        CoderSpec::new(RsCauchy, 2, 1, 2),
    ]
}

/// Smallest multiple of the backend alignment that is at least `min_bytes`.
pub fn aligned_blocksize(backend: &dyn ErasureBackend, min_bytes: usize) -> usize {
    let alignment = backend.alignment();
    min_bytes.max(1).div_ceil(alignment) * alignment
}

/// Deterministic pseudo-random fragments.
pub fn random_fragments(count: usize, blocksize: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut fragment = vec![0u8; blocksize];
            rng.fill_bytes(&mut fragment);
            fragment
        })
        .collect()
}

/// Every subset of `0..n` with between 1 and `max` elements, ascending.
pub fn erasure_patterns(n: usize, max: usize) -> Vec<Vec<usize>> {
    (1u32..(1 << n))
        .filter(|mask| (mask.count_ones() as usize) <= max)
        .map(|mask| (0..n).filter(|i| mask & (1 << i) != 0).collect())
        .collect()
}

/// Every subset of `0..n` with exactly `size` elements.
pub fn subsets_of_size(n: usize, size: usize) -> Vec<Vec<usize>> {
    erasure_patterns(n, size)
        .into_iter()
        .filter(|s| s.len() == size)
        .collect()
}

/// The `k + m` fragments of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSet {
    pub data: Vec<Vec<u8>>,
    pub parity: Vec<Vec<u8>>,
    pub blocksize: usize,
}

impl FragmentSet {
    /// Random data fragments, zeroed parity.
    pub fn random(k: usize, m: usize, blocksize: usize, seed: u64) -> Self {
        Self {
            data: random_fragments(k, blocksize, seed),
            parity: vec![vec![0u8; blocksize]; m],
            blocksize,
        }
    }

    /// Random data encoded with `backend`, at least `min_bytes` per fragment.
    pub fn encoded(backend: &dyn ErasureBackend, min_bytes: usize) -> Self {
        Self::encoded_with_seed(backend, min_bytes, config::TEST_RANDOM_SEED)
    }

    pub fn encoded_with_seed(backend: &dyn ErasureBackend, min_bytes: usize, seed: u64) -> Self {
        let coder = backend.config();
        let blocksize = aligned_blocksize(backend, min_bytes);
        let mut set = Self::random(coder.k, coder.m, blocksize, seed);
        set.encode(backend).expect("encode should succeed");
        set
    }

    pub fn k(&self) -> usize {
        self.data.len()
    }

    pub fn fragment(&self, index: usize) -> &[u8] {
        let k = self.k();
        if index < k {
            &self.data[index]
        } else {
            &self.parity[index - k]
        }
    }

    pub fn fragment_mut(&mut self, index: usize) -> &mut [u8] {
        let k = self.k();
        if index < k {
            &mut self.data[index]
        } else {
            &mut self.parity[index - k]
        }
    }

    /// Overwrite the listed fragments with a recognisable garbage pattern.
    pub fn erase(&mut self, missing: &[usize]) {
        for &index in missing {
            self.fragment_mut(index).fill(0xee);
        }
    }

    pub fn encode(&mut self, backend: &dyn ErasureBackend) -> Result<()> {
        let data: Vec<&[u8]> = self.data.iter().map(|d| d.as_slice()).collect();
        let mut parity: Vec<&mut [u8]> = self.parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        backend.encode(&data, &mut parity, self.blocksize)
    }

    pub fn decode(&mut self, backend: &dyn ErasureBackend, missing: &[usize]) -> Result<()> {
        let mut data: Vec<&mut [u8]> = self.data.iter_mut().map(|d| d.as_mut_slice()).collect();
        let mut parity: Vec<&mut [u8]> = self.parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        backend.decode(&mut data, &mut parity, missing, self.blocksize)
    }

    pub fn reconstruct(
        &mut self,
        backend: &dyn ErasureBackend,
        missing: &[usize],
        destination: usize,
    ) -> Result<()> {
        let mut data: Vec<&mut [u8]> = self.data.iter_mut().map(|d| d.as_mut_slice()).collect();
        let mut parity: Vec<&mut [u8]> = self.parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        backend.reconstruct(&mut data, &mut parity, missing, destination, self.blocksize)
    }
}
