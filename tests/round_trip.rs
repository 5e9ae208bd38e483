//! Encode, erase and decode across both backends.
//!
//! Every erasure pattern of up to `m` fragments must restore the original
//! data and parity exactly.

use galois_ec::{BackendKind, CoderArgs, ErasureBackend, RsVandermonde};

mod common;
use common::{
    assertions::{assert_decode_restores, assert_sets_equal},
    fixtures::{erasure_patterns, CoderSpec, FragmentSet},
    small_coders,
};

#[test]
fn test_all_erasure_patterns_round_trip() {
    for spec in small_coders() {
        println!("Testing every erasure pattern for {:?}", spec);
        let backend = spec.build();
        let original = FragmentSet::encoded(backend.as_ref(), 96);

        let patterns = erasure_patterns(spec.k + spec.m, spec.m);
        for missing in &patterns {
            assert_decode_restores(backend.as_ref(), &original, missing);
        }
        println!("✓ {} patterns restored", patterns.len());
    }
}

#[test]
fn test_data_and_first_parity_lost() {
    // k=4, m=2, w=8: lose data fragment 1 and parity fragment 0
    println!("Testing loss of fragments 1 and 4 with RS-Vandermonde k=4 m=2 w=8");

    let backend = CoderSpec::new(BackendKind::RsVandermonde, 4, 2, 8).build();
    let original = FragmentSet::encoded(backend.as_ref(), 1024);
    assert_decode_restores(backend.as_ref(), &original, &[1, 4]);

    println!("✓ Fragments 1 and 4 restored");
}

#[test]
fn test_fixed_pattern_fragments_recover_exactly() {
    println!("Testing constant-byte fragments 0x00..0x03, losing fragments 1 and 4");

    for kind in BackendKind::ALL {
        let backend = CoderSpec::new(kind, 4, 2, 8).build();
        let blocksize = 128;
        let mut original = FragmentSet {
            data: (0..4u8).map(|byte| vec![byte; blocksize]).collect(),
            parity: vec![vec![0u8; blocksize]; 2],
            blocksize,
        };
        original.encode(backend.as_ref()).unwrap();
        if kind == BackendKind::RsVandermonde {
            // parity 0 is the XOR of the data: 0 ^ 1 ^ 2 ^ 3
            assert!(original.parity[0].iter().all(|&b| b == 0x00));
        }

        let mut damaged = original.clone();
        damaged.erase(&[1, 4]);
        damaged.decode(backend.as_ref(), &[1, 4]).unwrap();

        assert!(damaged.data[1].iter().all(|&b| b == 0x01), "{}", kind);
        assert!(damaged.data[0].iter().all(|&b| b == 0x00), "{}", kind);
        assert_sets_equal(&original, &damaged, "fixed pattern");
    }

    println!("✓ Data fragment 1 restored as 0x01 bytes on both backends");
}

#[test]
fn test_missing_list_order_and_duplicates() {
    println!("Testing unsorted missing list with duplicates");

    for kind in BackendKind::ALL {
        let backend = CoderSpec::new(kind, 6, 3, 8).build();
        let original = FragmentSet::encoded(backend.as_ref(), 256);

        let mut damaged = original.clone();
        damaged.erase(&[7, 2, 0]);
        damaged.decode(backend.as_ref(), &[7, 2, 7, 0, 2]).unwrap();
        assert_sets_equal(&original, &damaged, "unsorted duplicate erasures");
    }

    println!("✓ Order and duplicates do not matter");
}

#[test]
fn test_no_erasures_is_a_no_op() {
    println!("Testing decode with nothing missing");

    for spec in small_coders() {
        let backend = spec.build();
        let original = FragmentSet::encoded(backend.as_ref(), 64);
        let mut copy = original.clone();
        copy.decode(backend.as_ref(), &[]).unwrap();
        assert_eq!(copy, original, "{:?}", spec);
    }

    println!("✓ Empty erasure list leaves fragments untouched");
}

#[test]
fn test_encoding_is_deterministic() {
    println!("Testing repeated encodes produce identical parity");

    for spec in small_coders() {
        let first = FragmentSet::encoded(spec.build().as_ref(), 128);
        let second = FragmentSet::encoded(spec.build().as_ref(), 128);
        assert_eq!(first, second, "{:?}", spec);
    }

    println!("✓ Encoding is deterministic across instances");
}

#[test]
fn test_only_blocksize_prefix_is_touched() {
    println!("Testing fragments longer than the block size");

    let backend = RsVandermonde::new(&CoderArgs::new(3, 2).with_width(16)).unwrap();
    let blocksize = 32;
    let data: Vec<Vec<u8>> = (0..3u8).map(|i| vec![i + 1; blocksize + 7]).collect();
    let mut parity = vec![vec![0xabu8; blocksize + 5]; 2];
    {
        let data_refs: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();
        let mut parity_refs: Vec<&mut [u8]> = parity.iter_mut().map(|p| p.as_mut_slice()).collect();
        backend.encode(&data_refs, &mut parity_refs, blocksize).unwrap();
    }
    for p in &parity {
        assert!(p[blocksize..].iter().all(|&b| b == 0xab));
    }

    println!("✓ Bytes past the block size are left alone");
}

#[test]
fn test_large_cauchy_default_packet_size() {
    println!("Testing Cauchy coder with its default packet size");

    let backend = galois_ec::create_backend(BackendKind::RsCauchy, &CoderArgs::new(10, 4)).unwrap();
    let original = FragmentSet::encoded(backend.as_ref(), backend.alignment() * 2);
    for missing in [vec![0, 1, 2, 3], vec![9, 10, 11, 12], vec![5, 13]] {
        assert_decode_restores(backend.as_ref(), &original, &missing);
    }

    println!("✓ Default packet size round-trips");
}
