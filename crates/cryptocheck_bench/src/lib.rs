//! Benchmark utilities.

use cryptocheck_codec::{GlobalSeed, Record, Signature, RECORD_SIZE};
use rand::Rng;

/// Random global seed.
pub fn random_seed() -> GlobalSeed {
    GlobalSeed::new(rand::thread_rng().gen())
}

/// Encoded body of `count` records with random fields.
pub fn random_record_bytes(count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(count * RECORD_SIZE);
    for _ in 0..count {
        let mut signature = [0u8; 64];
        rng.fill(&mut signature[..]);
        let record = Record::new(rng.gen(), rng.gen(), Signature::from_bytes(signature));
        out.extend_from_slice(&record.encode());
    }
    out
}
