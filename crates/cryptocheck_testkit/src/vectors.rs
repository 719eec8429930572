//! Golden test vectors for corpus derivation.
//!
//! Corpus producers in other languages must reproduce these byte for byte.
//! Inputs are `seed (u64 BE) || n (u64 BE)`, hex-encoded.

use serde::{Deserialize, Serialize};

/// A test vector that can be shared with other implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Input data (hex-encoded).
    pub input_hex: String,
    /// Expected output data (hex-encoded).
    pub expected_hex: String,
}

impl TestVector {
    fn derivation(id: &str, description: &str, seed: u64, n: u64, expected_hex: &str) -> Self {
        let mut input = seed.to_be_bytes().to_vec();
        input.extend_from_slice(&n.to_be_bytes());
        Self {
            id: id.into(),
            description: description.into(),
            input_hex: hex::encode(input),
            expected_hex: expected_hex.into(),
        }
    }

    /// Splits a derivation input into `(seed, n)`.
    ///
    /// Returns `None` if the input is not 16 hex-encoded bytes.
    pub fn seed_and_index(&self) -> Option<(u64, u64)> {
        let bytes = hex::decode(&self.input_hex).ok()?;
        if bytes.len() != 16 {
            return None;
        }
        let mut seed = [0u8; 8];
        let mut n = [0u8; 8];
        seed.copy_from_slice(&bytes[..8]);
        n.copy_from_slice(&bytes[8..]);
        Some((u64::from_be_bytes(seed), u64::from_be_bytes(n)))
    }
}

/// Account seed vectors: input `(seed, index)`, output the 32-byte seed.
pub fn account_seed_vectors() -> Vec<TestVector> {
    vec![
        TestVector::derivation(
            "account_seed_0_0",
            "zero seed, zero index",
            0,
            0,
            "0000000b0000000b0000000b0000000b0000000b0000000b0000000b0000000b",
        ),
        TestVector::derivation(
            "account_seed_0_1",
            "zero seed, index 1",
            0,
            1,
            "deece67ddeece678deece67ddeece678deece67ddeece678deece67ddeece678",
        ),
        TestVector::derivation(
            "account_seed_1_0",
            "seed 1 only touches the lowest nibble mask",
            1,
            0,
            "0000000b0000000b0000000b0000000b0000000b0000000b0000000b0000000a",
        ),
        TestVector::derivation(
            "account_seed_1_1",
            "seed 1, index 1",
            1,
            1,
            "deece67ddeece678deece67ddeece678deece67ddeece678deece67ddeece679",
        ),
        TestVector::derivation(
            "account_seed_12345_67890",
            "mixed seed and index",
            12345,
            67890,
            "c4cbd6fdc4cbe655c4cbd6fdc4cbd655c4cbd6fdc4cbd665c4cbd6fdc4cbd65c",
        ),
        TestVector::derivation(
            "account_seed_67890_12345",
            "mixed seed and index, swapped",
            67890,
            12345,
            "0df3bf5b0df3be500df3bf5b0df3b7500df3bf5b0df3be600df3bf5b0df2be52",
        ),
    ]
}

/// Message vectors: input `(seed, length selector)`, output the message.
pub fn message_vectors() -> Vec<TestVector> {
    const SEED: u64 = 0x1234_5678_90ab_cdef;
    const M: u64 = 150 * 1024;
    vec![
        TestVector::derivation("message_0", "single zero byte", SEED, 0, "00"),
        TestVector::derivation("message_1", "two-byte page prefix", SEED, 1, "0000"),
        TestVector::derivation("message_3", "full page prefix only", SEED, 3, "00000000"),
        TestVector::derivation(
            "message_4",
            "first template byte after the prefix",
            SEED,
            4,
            "0000000012",
        ),
        TestVector::derivation(
            "message_10",
            "prefix then template head",
            SEED,
            10,
            "000000001234567890abcd",
        ),
        TestVector::derivation("message_m", "second page, one byte", SEED, M, "01"),
        TestVector::derivation("message_m_plus_1", "second page, two bytes", SEED, M + 1, "0100"),
        TestVector::derivation(
            "message_m_plus_4",
            "second page, first template byte",
            SEED,
            M + 4,
            "0100000012",
        ),
        TestVector::derivation("message_2m", "third page, one byte", SEED, 2 * M, "02"),
        TestVector::derivation(
            "message_3m_plus_2",
            "fourth page, three bytes",
            SEED,
            3 * M + 2,
            "030000",
        ),
        TestVector::derivation(
            "message_alt_seed_m_plus_4",
            "second page with another seed",
            0x0df3_bf5b_0df3_be50,
            M + 4,
            "010000000d",
        ),
    ]
}

/// Generate all test vectors as JSON for cross-language use.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        account_seed: account_seed_vectors(),
        message: message_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    account_seed: Vec<TestVector>,
    message: Vec<TestVector>,
}
