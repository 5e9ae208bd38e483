//! Arithmetic over GF(2^w).
//!
//! The coders only ever talk to the field through [`FieldArithmetic`], so the
//! table-driven [`GaloisField`] can be replaced by another implementation (or a
//! test double) without touching matrix construction or decoding.
//!
//! Field elements are carried as `u32`. GF(2^8) is served by
//! `reed_solomon_erasure::galois_8`, which uses the same 0x11d polynomial.
//! Other widths up to 16 bits use log/antilog tables; wider fields fall back
//! to carry-less shift-and-reduce multiplication, which is only on the hot
//! path for `w = 32` region multiplies and there it is amortised through
//! per-call split tables.

use reed_solomon_erasure::galois_8;

use crate::{ErasureCodeError, Result};

/// Largest supported symbol width in bits.
pub const MAX_FIELD_WIDTH: usize = 32;

/// Widest field for which full log/antilog tables are built.
const MAX_TABLE_WIDTH: usize = 16;

/// Primitive polynomials for GF(2^w), indexed by `w`, written in octal with
/// the `x^w` term included.
const PRIMITIVE_POLYNOMIALS: [u64; MAX_FIELD_WIDTH + 1] = [
    0,
    0o3,
    0o7,
    0o13,
    0o23,
    0o45,
    0o103,
    0o211,
    0o435,
    0o1021,
    0o2011,
    0o4005,
    0o10123,
    0o20033,
    0o42103,
    0o100003,
    0o210013,
    0o400011,
    0o1000201,
    0o2000047,
    0o4000011,
    0o10000005,
    0o20000003,
    0o40000041,
    0o100000207,
    0o200000011,
    0o400000107,
    0o1000000047,
    0o2000000011,
    0o4000000005,
    0o10040000007,
    0o20000000011,
    0o40020000007,
];

/// Capability interface for GF(2^w) arithmetic used by the coders.
pub trait FieldArithmetic: Send + Sync {
    /// Symbol width in bits.
    fn width(&self) -> usize;

    /// Product of two field elements.
    fn mul(&self, a: u32, b: u32) -> u32;

    /// Quotient `a / b`.
    fn div(&self, a: u32, b: u32) -> Result<u32>;

    /// Multiplicative inverse of `a`.
    fn inverse(&self, a: u32) -> Result<u32> {
        self.div(1, a)
    }

    /// Multiply every symbol of `src` by `factor` and write (or, with
    /// `accumulate`, XOR) the result into `dst`.
    ///
    /// Symbols are little-endian words of `width() / 8` bytes, so only the
    /// byte-aligned widths 8, 16 and 32 are accepted.
    fn region_multiply(&self, src: &[u8], factor: u32, dst: &mut [u8], accumulate: bool)
        -> Result<()>;

    /// XOR `src` into `dst`.
    fn region_xor(&self, src: &[u8], dst: &mut [u8]) {
        region_xor(src, dst);
    }
}

/// XOR `src` into `dst`, element by element over the shorter of the two.
pub fn region_xor(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[derive(Debug, Clone)]
struct LogTables {
    log: Vec<u32>,
    exp: Vec<u32>,
}

/// GF(2^w) for `1 <= w <= 32`.
///
/// Each coder instance owns its own field context; nothing is cached
/// globally.
#[derive(Debug, Clone)]
pub struct GaloisField {
    w: usize,
    polynomial: u64,
    tables: Option<LogTables>,
    gf256: bool,
}

impl GaloisField {
    /// Build the field context for width `w`.
    pub fn new(w: usize) -> Result<Self> {
        Self::build(w, w == 8)
    }

    /// Build the field from its own log tables, even for `w = 8` where
    /// `galois_8` would otherwise be used.
    pub fn table_driven(w: usize) -> Result<Self> {
        Self::build(w, false)
    }

    fn build(w: usize, gf256: bool) -> Result<Self> {
        if w == 0 || w > MAX_FIELD_WIDTH {
            return Err(ErasureCodeError::UnsupportedWidth { w });
        }

        let mut field = Self {
            w,
            polynomial: PRIMITIVE_POLYNOMIALS[w],
            tables: None,
            gf256,
        };
        if !gf256 && w <= MAX_TABLE_WIDTH {
            field.tables = Some(field.build_log_tables()?);
        }
        Ok(field)
    }

    /// Whether arithmetic is delegated to `galois_8`.
    pub fn uses_gf256_kernel(&self) -> bool {
        self.gf256
    }

    /// Number of elements in the field, `2^w`.
    pub fn order(&self) -> u64 {
        1u64 << self.w
    }

    fn build_log_tables(&self) -> Result<LogTables> {
        let nonzero = (self.order() - 1) as usize;
        let mut log = vec![0u32; nonzero + 1];
        let mut exp = vec![0u32; 2 * nonzero];

        let mut element = 1u32;
        for power in 0..nonzero {
            if power > 0 && element == 1 {
                // x does not generate the multiplicative group
                return Err(ErasureCodeError::UnsupportedWidth { w: self.w });
            }
            log[element as usize] = power as u32;
            exp[power] = element;
            exp[power + nonzero] = element;
            element = self.shift_multiply(element, if self.w == 1 { 1 } else { 2 });
        }
        Ok(LogTables { log, exp })
    }

    fn shift_multiply(&self, a: u32, b: u32) -> u32 {
        let high = 1u64 << self.w;
        let mut a = a as u64;
        let mut b = b as u64;
        let mut product = 0u64;
        while b != 0 {
            if b & 1 == 1 {
                product ^= a;
            }
            b >>= 1;
            a <<= 1;
            if a & high != 0 {
                a ^= self.polynomial;
            }
        }
        product as u32
    }

    fn pow(&self, mut base: u32, mut exponent: u64) -> u32 {
        let mut acc = 1u32;
        while exponent > 0 {
            if exponent & 1 == 1 {
                acc = self.mul(acc, base);
            }
            base = self.mul(base, base);
            exponent >>= 1;
        }
        acc
    }

    /// One 256-entry table per symbol byte: `tables[i][b] = factor * (b << 8i)`.
    fn split_tables(&self, factor: u32) -> Vec<[u32; 256]> {
        (0..self.w / 8)
            .map(|byte| {
                let mut table = [0u32; 256];
                for (value, slot) in table.iter_mut().enumerate() {
                    *slot = self.mul(factor, (value as u32) << (8 * byte));
                }
                table
            })
            .collect()
    }
}

impl FieldArithmetic for GaloisField {
    fn width(&self) -> usize {
        self.w
    }

    fn mul(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        if self.gf256 {
            return galois_8::mul(a as u8, b as u8) as u32;
        }
        match &self.tables {
            Some(tables) => {
                let sum = tables.log[a as usize] + tables.log[b as usize];
                tables.exp[sum as usize]
            }
            None => self.shift_multiply(a, b),
        }
    }

    fn div(&self, a: u32, b: u32) -> Result<u32> {
        if b == 0 {
            return Err(ErasureCodeError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }
        if self.gf256 {
            return Ok(galois_8::div(a as u8, b as u8) as u32);
        }
        match &self.tables {
            Some(tables) => {
                let nonzero = (self.order() - 1) as u32;
                let index = tables.log[a as usize] + nonzero - tables.log[b as usize];
                Ok(tables.exp[index as usize])
            }
            None => Ok(self.mul(a, self.pow(b, self.order() - 2))),
        }
    }

    fn region_multiply(
        &self,
        src: &[u8],
        factor: u32,
        dst: &mut [u8],
        accumulate: bool,
    ) -> Result<()> {
        if self.w % 8 != 0 {
            return Err(ErasureCodeError::UnsupportedWidth { w: self.w });
        }

        match factor {
            0 => {
                if !accumulate {
                    dst.fill(0);
                }
            }
            1 => {
                if accumulate {
                    region_xor(src, dst);
                } else {
                    let len = dst.len().min(src.len());
                    dst[..len].copy_from_slice(&src[..len]);
                }
            }
            _ if self.gf256 => {
                let len = dst.len().min(src.len());
                let (src, dst) = (&src[..len], &mut dst[..len]);
                if accumulate {
                    galois_8::mul_slice_xor(factor as u8, src, dst);
                } else {
                    galois_8::mul_slice(factor as u8, src, dst);
                }
            }
            _ => {
                let symbol_bytes = self.w / 8;
                let tables = self.split_tables(factor);
                for (s, d) in src
                    .chunks_exact(symbol_bytes)
                    .zip(dst.chunks_exact_mut(symbol_bytes))
                {
                    let product = s
                        .iter()
                        .zip(&tables)
                        .fold(0u32, |acc, (&byte, table)| acc ^ table[byte as usize]);
                    for (i, out) in d.iter_mut().enumerate() {
                        let byte = (product >> (8 * i)) as u8;
                        if accumulate {
                            *out ^= byte;
                        } else {
                            *out = byte;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
