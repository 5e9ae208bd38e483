//! Simple performance benchmarks for galois-ec
//!
//! Run with: cargo run --release --bin bench

use galois_ec::{config, create_backend, metrics::throughput_mb_s, BackendKind, CoderArgs};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::time::{Duration, Instant};

/// Approximate fragment size used for every case.
const FRAGMENT_BYTES: usize = 256 * 1024;

/// Repetitions for averaged timings.
const ITERATIONS: usize = 5;

fn main() {
    println!("\ngalois-ec Performance Benchmarks");
    println!("================================\n");

    bench_setup();
    bench_coding(BackendKind::RsVandermonde, &[(10, 4, 8), (10, 4, 16), (10, 4, 32), (6, 3, 16)]);
    bench_coding(BackendKind::RsCauchy, &[(10, 4, 4), (10, 4, 8), (6, 3, 4), (12, 4, 5)]);

    println!("\n✅ All benchmarks completed\n");
}

/// Time a single operation and print the result
fn time_operation<F, R>(name: &str, mut f: F) -> (Duration, R)
where
    F: FnMut() -> R,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    println!(
        "  {:<44} {:>12.3} ms",
        format!("{}:", name),
        duration.as_secs_f64() * 1000.0
    );
    (duration, result)
}

/// Time an operation multiple times and report average and throughput
fn time_operation_avg<F>(name: &str, iterations: usize, bytes: usize, mut f: F) -> Duration
where
    F: FnMut(),
{
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let total = start.elapsed();
    let avg = total / iterations as u32;
    println!(
        "  {:<44} {:>12.3} ms {:>9.1} MB/s",
        format!("{}:", name),
        avg.as_secs_f64() * 1000.0,
        throughput_mb_s(bytes, avg)
    );
    avg
}

fn bench_setup() {
    println!("Backend Setup");
    println!("-------------");

    for (kind, k, m, w) in [
        (BackendKind::RsVandermonde, 10, 4, 16),
        (BackendKind::RsVandermonde, 200, 50, 8),
        (BackendKind::RsCauchy, 10, 4, 4),
        (BackendKind::RsCauchy, 20, 8, 8),
    ] {
        let args = CoderArgs::new(k, m).with_width(w);
        time_operation(&format!("{} init k={} m={} w={}", kind, k, m, w), || {
            create_backend(kind, &args).expect("valid parameters")
        });
    }

    println!();
}

fn bench_coding(kind: BackendKind, cases: &[(usize, usize, usize)]) {
    println!("{} encode / decode", kind);
    println!("------------------------");

    for &(k, m, w) in cases {
        let args = CoderArgs::new(k, m).with_width(w);
        let backend = create_backend(kind, &args).expect("valid parameters");
        let alignment = backend.alignment();
        let blocksize = FRAGMENT_BYTES.div_ceil(alignment) * alignment;
        let object_bytes = k * blocksize;

        let data = generate_fragments(k, blocksize);
        let mut parity = vec![vec![0u8; blocksize]; m];
        let data_refs: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();

        time_operation_avg(
            &format!("encode k={} m={} w={}", k, m, w),
            ITERATIONS,
            object_bytes,
            || {
                let mut parity_refs: Vec<&mut [u8]> =
                    parity.iter_mut().map(|p| p.as_mut_slice()).collect();
                backend
                    .encode(&data_refs, &mut parity_refs, blocksize)
                    .expect("encode");
            },
        );

        // Worst case: m data fragments lost
        let missing: Vec<usize> = (0..m.min(k)).collect();
        let mut scratch = data.clone();
        time_operation_avg(
            &format!("decode {} data erasures", missing.len()),
            ITERATIONS,
            object_bytes,
            || {
                let mut data_refs: Vec<&mut [u8]> =
                    scratch.iter_mut().map(|d| d.as_mut_slice()).collect();
                let mut parity_refs: Vec<&mut [u8]> =
                    parity.iter_mut().map(|p| p.as_mut_slice()).collect();
                backend
                    .decode(&mut data_refs, &mut parity_refs, &missing, blocksize)
                    .expect("decode");
            },
        );
        assert_eq!(scratch, data, "decode must restore the data fragments");

        time_operation_avg(
            "reconstruct one data fragment",
            ITERATIONS,
            blocksize,
            || {
                let mut data_refs: Vec<&mut [u8]> =
                    scratch.iter_mut().map(|d| d.as_mut_slice()).collect();
                let mut parity_refs: Vec<&mut [u8]> =
                    parity.iter_mut().map(|p| p.as_mut_slice()).collect();
                backend
                    .reconstruct(&mut data_refs, &mut parity_refs, &[0], 0, blocksize)
                    .expect("reconstruct");
            },
        );

        if let Err(e) = backend.exit() {
            println!("  exit failed: {}", e);
        }
    }

    println!();
}

fn generate_fragments(count: usize, blocksize: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(config::TEST_RANDOM_SEED);
    (0..count)
        .map(|_| {
            let mut fragment = vec![0u8; blocksize];
            rng.fill_bytes(&mut fragment);
            fragment
        })
        .collect()
}
