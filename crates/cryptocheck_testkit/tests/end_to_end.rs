//! End-to-end runs over corpus files on disk.

use cryptocheck_codec::CodecError;
use cryptocheck_core::{Coordinator, Ed25519Adapter, RunState};
use cryptocheck_testkit::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn single_signed_record_verifies() {
    let corpus = CorpusBuilder::new(GlobalSeed::new(0))
        .signed(17, 95)
        .write_temp();
    let summary = check_corpus(&corpus, quick_config()).unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.verified, 1);
}

#[test]
fn every_single_bit_flip_is_one_failure() {
    let builder = CorpusBuilder::new(GlobalSeed::new(0));
    let good = builder.sign(17, 95);

    for bit in [0, 1, 7, 63, 255, 256, 300, 511] {
        let corpus = CorpusBuilder::new(GlobalSeed::new(0))
            .raw(Record::new(17, 95, good.signature().with_flipped_bit(bit)))
            .write_temp();
        let err = check_corpus(&corpus, quick_config()).unwrap_err();
        let failure = err.failure().unwrap_or_else(|| panic!("bit {bit}: {err}"));
        assert_eq!(failure.record.index(), 17);
        assert_eq!(failure.record.length(), 95);
    }
}

#[test]
fn large_mixed_corpus_verifies() {
    let corpus = CorpusBuilder::new(GlobalSeed::new(0x1234_5678_90ab_cdef))
        .signed_range(150)
        .random_signed(50, 7)
        .signed(0, 153_599)
        .signed(1, 153_600)
        .write_temp();
    let summary = check_corpus(&corpus, CheckConfig::new().with_progress_interval(25)).unwrap();
    assert_eq!(summary.verified, 202);
}

#[test]
fn tampered_record_halts_run() {
    let corpus = CorpusBuilder::new(GlobalSeed::new(99))
        .signed_range(30)
        .tampered(1_000_000, 4096, 42)
        .signed_range(30)
        .write_temp();

    let coordinator = Coordinator::new(quick_config(), Arc::new(Ed25519Adapter::new()));
    let err = coordinator
        .run_file(corpus.path(), &CancellationToken::new())
        .unwrap_err();

    assert!(err.to_string().starts_with("CHECK FAILED: invalid signature"));
    assert_eq!(err.failure().unwrap().record.index(), 1_000_000);
    assert_eq!(coordinator.state(), RunState::Fatal);
}

#[test]
fn undersized_file_is_rejected() {
    for size in [0usize, 8, 79] {
        let corpus = TempCorpus::with_bytes(&vec![0u8; size]);
        let err = check_corpus(&corpus, quick_config()).unwrap_err();
        assert!(
            matches!(err, CoreError::UndersizedInput { .. }),
            "size {size}: {err}"
        );
    }
}

#[test]
fn misaligned_file_is_rejected() {
    let corpus = CorpusBuilder::new(GlobalSeed::new(0))
        .signed_range(2)
        .trailing_bytes(&[0xff; 71])
        .write_temp();
    let err = check_corpus(&corpus, quick_config()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::MisalignedInput { remainder: 71, .. }
    ));
}

#[test]
fn truncated_header_is_rejected() {
    // Size checks run first, so a short file never reaches header decoding.
    let corpus = TempCorpus::with_bytes(&[1, 2, 3]);
    let err = check_corpus(&corpus, quick_config()).unwrap_err();
    assert!(!matches!(
        err,
        CoreError::Codec(CodecError::TruncatedHeader { .. })
    ));
    assert!(matches!(err, CoreError::UndersizedInput { size: 3, .. }));
}

#[test]
fn cancellation_stops_within_bounded_time() {
    let corpus = CorpusBuilder::new(GlobalSeed::new(3))
        .signed_range(400)
        .write_temp();
    let cancel = CancellationToken::new();
    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let started = Instant::now();
    let err = check_corpus_with(
        &corpus,
        quick_config(),
        SlowAdapter::new(Duration::from_millis(10)),
        &cancel,
    )
    .unwrap_err();
    canceller.join().unwrap();

    assert!(err.is_cancellation());
    assert_eq!(err.to_string(), "user termination");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn golden_vectors_hold_through_public_api() {
    for vector in account_seed_vectors() {
        let (seed, n) = vector.seed_and_index().unwrap();
        assert_eq!(
            cryptocheck_core::account_seed(GlobalSeed::new(seed), n).to_hex(),
            vector.expected_hex,
            "{}",
            vector.id
        );
    }
}
