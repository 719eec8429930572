//! Property-based test generators using proptest.

use cryptocheck_codec::{GlobalSeed, Record, Signature, SIGNATURE_SIZE};
use cryptocheck_core::MAX_MESSAGE_LENGTH;
use proptest::prelude::*;

/// Strategy for arbitrary global seeds.
pub fn global_seed_strategy() -> impl Strategy<Value = GlobalSeed> {
    any::<u64>().prop_map(GlobalSeed::new)
}

/// Strategy for arbitrary (not necessarily valid) signatures.
pub fn signature_strategy() -> impl Strategy<Value = Signature> {
    prop::collection::vec(any::<u8>(), SIGNATURE_SIZE).prop_map(|bytes| {
        let mut out = [0u8; SIGNATURE_SIZE];
        out.copy_from_slice(&bytes);
        Signature::from_bytes(out)
    })
}

/// Strategy for arbitrary records.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (any::<u32>(), any::<u32>(), signature_strategy())
        .prop_map(|(index, length, signature)| Record::new(index, length, signature))
}

/// Strategy for length selectors that land near a page boundary, where the
/// page prefix and short-message cases live.
pub fn boundary_length_strategy() -> impl Strategy<Value = u32> {
    let m = MAX_MESSAGE_LENGTH as u32;
    (0u32..4, -5i64..5).prop_map(move |(page, offset)| {
        (i64::from(page) * i64::from(m) + offset).clamp(0, i64::from(u32::MAX)) as u32
    })
}

/// Strategy for a corpus body with `count` arbitrary records.
pub fn records_strategy(count: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record_strategy(), count)
}
