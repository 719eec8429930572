//! Fixed-size verification records.

use crate::error::{CodecError, CodecResult};
use bytes::{Buf, BufMut};
use std::fmt;

/// Size of a raw signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Size of one encoded record: index (4) + length (4) + signature (64).
pub const RECORD_SIZE: usize = 4 + 4 + SIGNATURE_SIZE;

/// A raw 64-byte signature as stored in the corpus.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    /// Wraps raw signature bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw signature bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Returns the signature with a single bit inverted.
    ///
    /// `bit` is taken modulo the signature width.
    #[must_use]
    pub fn with_flipped_bit(mut self, bit: usize) -> Self {
        let bit = bit % (SIGNATURE_SIZE * 8);
        self.0[bit / 8] ^= 1 << (bit % 8);
        self
    }

    /// Hex encoding of the signature.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One verification task as it appears on disk.
///
/// The on-disk fields are 32-bit big-endian; accessors widen them to `u64`
/// because every derivation step works in 64-bit arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    index: u32,
    length: u32,
    signature: Signature,
}

impl Record {
    /// Creates a record.
    pub const fn new(index: u32, length: u32, signature: Signature) -> Self {
        Self {
            index,
            length,
            signature,
        }
    }

    /// Account index used to derive the signing key.
    pub const fn index(&self) -> u64 {
        self.index as u64
    }

    /// Length selector used to derive the signed message.
    pub const fn length(&self) -> u64 {
        self.length as u64
    }

    /// The signature to check.
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Decodes a record from exactly [`RECORD_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLength`] if `bytes` is not exactly one
    /// record long.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(CodecError::InvalidLength {
                expected: RECORD_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = bytes;
        let index = buf.get_u32();
        let length = buf.get_u32();
        let mut signature = [0u8; SIGNATURE_SIZE];
        buf.copy_to_slice(&mut signature);

        Ok(Self::new(index, length, Signature::from_bytes(signature)))
    }

    /// Appends the encoded record to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.index);
        buf.put_u32(self.length);
        buf.put_slice(self.signature.as_bytes());
    }

    /// Encodes the record into a fixed-size array.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        self.encode_into(&mut &mut out[..]);
        out
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.index, self.length, self.signature)
    }
}
