//! Deterministic reconstruction of per-record keys and messages.
//!
//! Every record in a corpus names an account index and a length selector.
//! From those two numbers and the corpus-wide [`GlobalSeed`] this module
//! rebuilds, bit for bit, the 32-byte account seed that was used to derive
//! the signing key and the exact message that was signed. Independent
//! implementations produce test corpora with the same algorithm, so any
//! deviation here invalidates the whole corpus.
//!
//! ## Account seed
//!
//! A 48-bit linear-congruential step (multiplier `0x5deece66d`, increment
//! `0xb`) scrambles the index. The 48-bit value is replicated as
//! `(nv << 32) | nv` in 64-bit arithmetic, so its low 16 bits overlap its
//! high part. Four big-endian words are then formed by XOR-ing that value
//! with the global seed restricted to four interleaved nibble masks.
//!
//! ## Message
//!
//! `l = (n mod MAX_MESSAGE_LENGTH) + 1` bytes. Bytes `[4, l)` come from the
//! start of the [`Template`]; the first `min(4, l)` bytes are the
//! little-endian page number `n / MAX_MESSAGE_LENGTH`.

use cryptocheck_codec::{GlobalSeed, HEADER_SIZE};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Upper bound on message size; record lengths are taken modulo this.
pub const MAX_MESSAGE_LENGTH: u64 = 150 * 1024;

/// Size of the precomputed template.
///
/// One seed-width longer than the longest message so the `l - 4` byte tail
/// of any message is always covered.
pub const TEMPLATE_LEN: usize = MAX_MESSAGE_LENGTH as usize + HEADER_SIZE;

/// Size of an account seed in bytes.
pub const ACCOUNT_SEED_SIZE: usize = 32;

const LCG_MULTIPLIER: u64 = 0x5_deec_e66d;
const LCG_ADDEND: u64 = 0xb;
const LCG_MASK: u64 = (1 << 48) - 1;

const NIBBLE_MASKS: [u64; 4] = [
    0xf000_f000_f000_f000,
    0x0f00_0f00_0f00_0f00,
    0x00f0_00f0_00f0_00f0,
    0x000f_000f_000f_000f,
];

/// Width of the little-endian page prefix at the start of every message.
const PAGE_PREFIX_LEN: usize = 4;

/// A 32-byte per-account seed, fed to the crypto adapter to obtain a key pair.
///
/// Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccountSeed([u8; ACCOUNT_SEED_SIZE]);

impl AccountSeed {
    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_SEED_SIZE] {
        &self.0
    }

    /// Hex encoding of the seed.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AccountSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountSeed({})", self.to_hex())
    }
}

/// Derives the account seed for index `n`.
pub fn account_seed(seed: GlobalSeed, n: u64) -> AccountSeed {
    let nv = n.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_ADDEND) & LCG_MASK;
    let value = (nv << 32) | nv;

    let mut out = [0u8; ACCOUNT_SEED_SIZE];
    for (chunk, mask) in out.chunks_exact_mut(8).zip(NIBBLE_MASKS) {
        chunk.copy_from_slice(&(value ^ (seed.value() & mask)).to_be_bytes());
    }
    AccountSeed(out)
}

/// The global seed repeated back-to-back to [`TEMPLATE_LEN`] bytes.
///
/// Built once per run and shared read-only by every worker.
#[derive(Clone, PartialEq, Eq)]
pub struct Template(Box<[u8]>);

impl Template {
    /// Builds the template for `seed`.
    pub fn new(seed: GlobalSeed) -> Self {
        let bytes: Vec<u8> = seed
            .to_be_bytes()
            .iter()
            .copied()
            .cycle()
            .take(TEMPLATE_LEN)
            .collect();
        Self(bytes.into_boxed_slice())
    }

    /// Template bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Template length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a template is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("len", &self.0.len())
            .field("head", &hex::encode(&self.0[..HEADER_SIZE.min(self.0.len())]))
            .finish()
    }
}

/// Length of the message selected by `n`, in `[1, MAX_MESSAGE_LENGTH]`.
pub fn message_len(n: u64) -> usize {
    (n % MAX_MESSAGE_LENGTH) as usize + 1
}

/// Reconstructs the message selected by `n`.
///
/// Allocates a fresh buffer; the template is never modified.
pub fn message(template: &Template, n: u64) -> Vec<u8> {
    let len = message_len(n);
    let mut out = vec![0u8; len];

    if len > PAGE_PREFIX_LEN {
        out[PAGE_PREFIX_LEN..].copy_from_slice(&template.as_bytes()[..len - PAGE_PREFIX_LEN]);
    }

    // n is a widened u32, so the page always fits.
    let page = ((n / MAX_MESSAGE_LENGTH) as u32).to_le_bytes();
    let head = len.min(PAGE_PREFIX_LEN);
    out[..head].copy_from_slice(&page[..head]);
    out
}

/// Per-run derivation context: the global seed and its precomputed template.
///
/// Constructed once and shared by reference with every worker.
#[derive(Debug, Clone)]
pub struct SeedDeriver {
    seed: GlobalSeed,
    template: Template,
}

impl SeedDeriver {
    /// Builds the context, precomputing the template.
    pub fn new(seed: GlobalSeed) -> Self {
        Self {
            seed,
            template: Template::new(seed),
        }
    }

    /// The global seed.
    pub fn seed(&self) -> GlobalSeed {
        self.seed
    }

    /// The shared template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Account seed for record index `n`.
    pub fn account_seed(&self, n: u64) -> AccountSeed {
        account_seed(self.seed, n)
    }

    /// Message for record length selector `n`.
    pub fn message(&self, n: u64) -> Vec<u8> {
        message(&self.template, n)
    }
}
