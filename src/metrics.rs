//! Timing and throughput records for the simulator and benchmark binaries.
//!
//! Shared metric types with CLI-friendly display formatters. Every record
//! also serializes to JSON for machine consumption.

use serde::Serialize;
use std::time::Duration;

use crate::backend::{BackendKind, CoderConfig};

/// Throughput in MB/s for `bytes` processed in `duration`.
pub fn throughput_mb_s(bytes: usize, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / (1024.0 * 1024.0) / secs
    } else {
        0.0
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Metrics collected over one encode / erase / recover cycle
#[derive(Debug, Clone, Serialize)]
pub struct CodingMetrics {
    pub backend: BackendKind,
    pub config: CoderConfig,
    pub blocksize: usize,
    pub erased: Vec<usize>,
    pub selected: Vec<usize>,
    pub setup_ms: f64,
    pub encode_ms: f64,
    pub decode_ms: f64,
    pub reconstruct_ms: f64,
    pub encode_mb_s: f64,
    pub decode_mb_s: f64,
    pub verified: bool,
}

impl CodingMetrics {
    pub fn new(backend: BackendKind, config: CoderConfig, blocksize: usize) -> Self {
        Self {
            backend,
            config,
            blocksize,
            erased: Vec::new(),
            selected: Vec::new(),
            setup_ms: 0.0,
            encode_ms: 0.0,
            decode_ms: 0.0,
            reconstruct_ms: 0.0,
            encode_mb_s: 0.0,
            decode_mb_s: 0.0,
            verified: false,
        }
    }

    /// Bytes of original data covered by one cycle.
    pub fn object_bytes(&self) -> usize {
        self.config.k * self.blocksize
    }

    pub fn record_setup(&mut self, duration: Duration) {
        self.setup_ms = millis(duration);
    }

    pub fn record_encode(&mut self, duration: Duration) {
        self.encode_ms = millis(duration);
        self.encode_mb_s = throughput_mb_s(self.object_bytes(), duration);
    }

    pub fn record_decode(&mut self, duration: Duration) {
        self.decode_ms = millis(duration);
        self.decode_mb_s = throughput_mb_s(self.object_bytes(), duration);
    }

    pub fn record_reconstruct(&mut self, duration: Duration) {
        self.reconstruct_ms = millis(duration);
    }

    /// Format metrics as a table for CLI output
    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str("  ┌─────────────────────────────────────────────────────┐\n");
        output.push_str("  │ Phase                  │ Duration  │ Throughput     │\n");
        output.push_str("  ├────────────────────────┼───────────┼────────────────┤\n");
        output.push_str(&format!(
            "  │ Backend Setup          │ {:>7.2}ms │ {:>14} │\n",
            self.setup_ms, ""
        ));
        output.push_str(&format!(
            "  │ Encode                 │ {:>7.2}ms │ {:>9.1} MB/s │\n",
            self.encode_ms, self.encode_mb_s
        ));
        output.push_str(&format!(
            "  │ {:<22} │ {:>7.2}ms │ {:>9.1} MB/s │\n",
            format!("Decode ({} erased)", self.erased.len()),
            self.decode_ms,
            self.decode_mb_s
        ));
        output.push_str(&format!(
            "  │ Reconstruct (single)   │ {:>7.2}ms │ {:>14} │\n",
            self.reconstruct_ms, ""
        ));
        output.push_str("  └─────────────────────────────────────────────────────┘\n");
        output
    }

    /// One-line summary
    pub fn format_summary(&self) -> String {
        format!(
            "{} k={} m={} w={}: {} KB object, erased {:?}, {}",
            self.backend,
            self.config.k,
            self.config.m,
            self.config.w,
            self.object_bytes() / 1024,
            self.erased,
            if self.verified { "recovered" } else { "MISMATCH" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_handles_zero_duration() {
        assert_eq!(throughput_mb_s(1024, Duration::ZERO), 0.0);
        let mb_s = throughput_mb_s(2 * 1024 * 1024, Duration::from_secs(1));
        assert!((mb_s - 2.0).abs() < 1e-9);
    }

    #[test]
    fn table_and_json() {
        let mut metrics = CodingMetrics::new(
            BackendKind::RsVandermonde,
            CoderConfig { k: 4, m: 2, w: 8 },
            4096,
        );
        metrics.record_encode(Duration::from_millis(2));
        metrics.erased = vec![1, 4];
        metrics.verified = true;

        assert!(metrics.format_table().contains("Encode"));
        assert!(metrics.format_summary().contains("recovered"));
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"backend\":\"rs_vand\""));
    }

    #[test]
    fn table_shows_large_erasure_counts() {
        let mut metrics = CodingMetrics::new(
            BackendKind::RsCauchy,
            CoderConfig { k: 20, m: 12, w: 8 },
            4096,
        );
        metrics.erased = (0..12).collect();

        let table = metrics.format_table();
        assert!(table.contains("Decode (12 erased)"));
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "{:?}", widths);
    }
}
