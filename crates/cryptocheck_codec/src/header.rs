//! Corpus header: the 8-byte global seed.

use crate::error::{CodecError, CodecResult};
use std::fmt;
use std::io::{ErrorKind, Read, Write};

/// Size of the corpus header in bytes.
pub const HEADER_SIZE: usize = 8;

/// The 64-bit value seeding every derivation in a corpus.
///
/// Stored big-endian at offset 0 of the corpus file. Immutable for a run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlobalSeed(u64);

impl GlobalSeed {
    /// Creates a seed from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Creates a seed from its big-endian byte representation.
    pub const fn from_be_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Numeric value of the seed.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Big-endian bytes, as stored in the header.
    pub const fn to_be_bytes(&self) -> [u8; HEADER_SIZE] {
        self.0.to_be_bytes()
    }

    /// Hex encoding of the header bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }
}

impl fmt::Debug for GlobalSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalSeed({})", self.to_hex())
    }
}

impl fmt::Display for GlobalSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.to_hex(), self.0)
    }
}

/// Reads the global seed from the start of a corpus stream.
///
/// # Errors
///
/// Returns [`CodecError::TruncatedHeader`] if fewer than [`HEADER_SIZE`]
/// bytes are available, or an I/O error from the reader.
pub fn read_header<R: Read>(reader: &mut R) -> CodecResult<GlobalSeed> {
    let mut buf = [0u8; HEADER_SIZE];
    let filled = read_full(reader, &mut buf)?;
    if filled != HEADER_SIZE {
        return Err(CodecError::TruncatedHeader {
            available: filled,
            expected: HEADER_SIZE,
        });
    }
    Ok(GlobalSeed::from_be_bytes(buf))
}

/// Writes the global seed header.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_header<W: Write>(writer: &mut W, seed: GlobalSeed) -> CodecResult<()> {
    writer.write_all(&seed.to_be_bytes())?;
    Ok(())
}

/// Fills `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read. Unlike `read_exact`, a short read is not
/// an error here, so callers can tell a clean end of stream (0) from a
/// partial item.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> CodecResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
