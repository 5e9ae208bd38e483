//! galois-ec erasure simulator
//!
//! This binary runs one full erasure-coding cycle against a chosen backend:
//! - Encode a random object into `k` data and `m` parity fragments
//! - Erase fragments and pick the `k` survivors to fetch
//! - Decode everything, then reconstruct a single fragment on its own
//! - Verify the recovered object against its SHA-256 digest
//!
//! Run with: cargo run --release
//! Cauchy at w=8 with three erasures: cargo run --release -- --backend rs-cauchy -w 8 --erasures 3

use clap::{ArgAction, Parser, ValueEnum};
use galois_ec::{
    config::{self, CoderArgs},
    create_backend,
    metrics::CodingMetrics,
    BackendKind, ErasureCodeError, Result,
};
use rand::{rngs::StdRng, seq::index, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use std::{path::PathBuf, time::Instant};
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    RsVand,
    RsCauchy,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::RsVand => BackendKind::RsVandermonde,
            BackendArg::RsCauchy => BackendKind::RsCauchy,
        }
    }
}

/// Command-line arguments for the erasure simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Coding backend
    #[arg(long, value_enum, default_value = "rs-vand")]
    backend: BackendArg,

    /// Number of data fragments
    #[arg(short, default_value_t = config::DEFAULT_DATA_FRAGMENTS)]
    k: usize,

    /// Number of parity fragments
    #[arg(short, default_value_t = config::DEFAULT_PARITY_FRAGMENTS)]
    m: usize,

    /// Symbol width in bits (backend default when omitted)
    #[arg(short)]
    w: Option<usize>,

    /// Packet size in bytes for the Cauchy backend
    #[arg(long)]
    packet_size: Option<usize>,

    /// Fragment size in bytes, rounded up to the backend alignment
    #[arg(long, default_value_t = config::DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Number of fragments to erase
    #[arg(long, default_value_t = config::DEFAULT_ERASURES)]
    erasures: usize,

    /// Fragments to leave out of the fetch plan (comma separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<usize>,

    /// Seed for the object contents and the erasure pattern
    #[arg(long, default_value_t = config::TEST_RANDOM_SEED)]
    seed: u64,

    /// JSON file holding coder arguments; -w and --packet-size override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the metrics record as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(metrics) => {
            if cli.json {
                match serde_json::to_string_pretty(&metrics) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize metrics: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                info!("");
                info!("{}", metrics.format_table());
                info!("  {}", metrics.format_summary());
            }
            if !metrics.verified {
                std::process::exit(2);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn coder_args(cli: &Cli) -> Result<CoderArgs> {
    let mut args = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                ErasureCodeError::IO(format!("Failed to read {}: {}", path.display(), e))
            })?;
            CoderArgs::from_json(&json)?
        }
        None => CoderArgs::new(cli.k, cli.m),
    };
    if let Some(w) = cli.w {
        args.w = Some(w);
    }
    if let Some(packet_size) = cli.packet_size {
        args.packet_size = Some(packet_size);
    }
    Ok(args)
}

fn run(cli: &Cli) -> Result<CodingMetrics> {
    let kind = BackendKind::from(cli.backend);
    let args = coder_args(cli)?;

    // Phase 1: Backend Setup
    info!("[1/4] Backend Setup");
    let start = Instant::now();
    let backend = create_backend(kind, &args)?;
    let setup = start.elapsed();

    let coder = backend.config();
    let alignment = backend.alignment();
    let blocksize = cli.block_size.max(1).div_ceil(alignment) * alignment;
    info!(
        "  ✓ {} (k={}, m={}, w={}), element size {} bits, fragments {} bytes",
        kind, coder.k, coder.m, coder.w, backend.element_size(), blocksize
    );

    let mut metrics = CodingMetrics::new(kind, coder, blocksize);
    metrics.record_setup(setup);

    // Phase 2: Encode
    info!("[2/4] Encode");
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut data = vec![vec![0u8; blocksize]; coder.k];
    for fragment in data.iter_mut() {
        rng.fill_bytes(fragment);
    }
    let mut parity = vec![vec![0u8; blocksize]; coder.m];
    let digest = object_digest(&data);

    {
        let _span = info_span!("encode", bytes = coder.k * blocksize).entered();
        let data_refs: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();
        let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        let start = Instant::now();
        backend.encode(&data_refs, &mut parity_refs, blocksize)?;
        metrics.record_encode(start.elapsed());
    }
    let original_parity = parity.clone();
    info!("  ✓ Object digest {}", digest);

    // Phase 3: Erase and select
    info!("[3/4] Erasure");
    if cli.erasures > coder.m {
        warn!(
            "  Erasing {} fragments exceeds m={}; decoding is expected to fail",
            cli.erasures, coder.m
        );
    }
    let total = coder.total_fragments();
    let mut erased = index::sample(&mut rng, total, cli.erasures.min(total)).into_vec();
    erased.sort_unstable();
    for &i in &erased {
        fragment_mut(&mut data, &mut parity, i).fill(0);
    }
    info!("  ✓ Erased fragments {:?}", erased);

    match backend.min_fragments_needed(&erased, &cli.exclude) {
        Ok(selected) => {
            info!("  ✓ Fetch plan {:?}", selected);
            metrics.selected = selected;
        }
        Err(e) => warn!("  Fetch plan unavailable with exclusions {:?}: {}", cli.exclude, e),
    }
    metrics.erased = erased.clone();

    // Phase 4: Recover
    info!("[4/4] Recovery");
    {
        let _span = info_span!("decode", erased = erased.len()).entered();
        let mut data_refs: Vec<&mut [u8]> = data.iter_mut().map(|d| d.as_mut_slice()).collect();
        let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        let start = Instant::now();
        backend.decode(&mut data_refs, &mut parity_refs, &erased, blocksize)?;
        metrics.record_decode(start.elapsed());
    }
    let decoded_ok = object_digest(&data) == digest && parity == original_parity;
    info!(
        "  {} Decode restored object and parity",
        if decoded_ok { "✓" } else { "✗" }
    );

    let mut reconstructed_ok = true;
    if let Some(&target) = erased.first() {
        let _span = info_span!("reconstruct", fragment = target).entered();
        let expected = fragment_mut(&mut data, &mut parity, target).to_vec();
        fragment_mut(&mut data, &mut parity, target).fill(0);

        let mut data_refs: Vec<&mut [u8]> = data.iter_mut().map(|d| d.as_mut_slice()).collect();
        let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        let start = Instant::now();
        backend.reconstruct(&mut data_refs, &mut parity_refs, &[target], target, blocksize)?;
        metrics.record_reconstruct(start.elapsed());

        reconstructed_ok = fragment_mut(&mut data, &mut parity, target) == expected.as_slice();
        info!(
            "  {} Reconstructed fragment {} alone",
            if reconstructed_ok { "✓" } else { "✗" },
            target
        );
    }

    metrics.verified = decoded_ok && reconstructed_ok;
    debug!(version = backend.info().version, "releasing backend");
    backend.exit()?;
    Ok(metrics)
}

fn fragment_mut<'a>(data: &'a mut [Vec<u8>], parity: &'a mut [Vec<u8>], index: usize) -> &'a mut [u8] {
    let k = data.len();
    if index < k {
        &mut data[index]
    } else {
        &mut parity[index - k]
    }
}

fn object_digest(data: &[Vec<u8>]) -> String {
    let mut hasher = Sha256::new();
    for fragment in data {
        hasher.update(fragment);
    }
    format!("{:x}", hasher.finalize())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info,galois_ec=info",
        1 => "debug,galois_ec=debug",
        _ => "galois_ec=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(false)
                .with_bracketed_fields(true),
        )
        .init();
}
