//! # cryptocheck codec
//!
//! Binary layout of a signature corpus.
//!
//! ## Format
//!
//! ```text
//! offset 0      : 8 bytes   GlobalSeed (u64, big-endian)
//! offset 8..N   : 72-byte records
//!                   [0:4)  index     (u32, big-endian)
//!                   [4:8)  length    (u32, big-endian)
//!                   [8:72) signature (64 raw bytes)
//! ```
//!
//! A well-formed corpus is exactly `8 + count * 72` bytes long. Decoding is
//! single-pass and never buffers more than one record.
//!
//! ## Usage
//!
//! ```
//! use cryptocheck_codec::{read_header, CorpusWriter, GlobalSeed, Record, RecordReader, Signature};
//! use std::io::Cursor;
//!
//! let mut writer = CorpusWriter::new(Vec::new(), GlobalSeed::new(7)).unwrap();
//! writer.write_record(&Record::new(1, 2, Signature::from_bytes([0; 64]))).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut cursor = Cursor::new(bytes);
//! let seed = read_header(&mut cursor).unwrap();
//! assert_eq!(seed.value(), 7);
//! let records: Vec<_> = RecordReader::new(cursor, 8).collect::<Result<_, _>>().unwrap();
//! assert_eq!(records[0].index(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod header;
mod record;
mod stream;

pub use error::{CodecError, CodecResult};
pub use header::{read_header, write_header, GlobalSeed, HEADER_SIZE};
pub use record::{Record, Signature, RECORD_SIZE, SIGNATURE_SIZE};
pub use stream::{CorpusWriter, RecordReader};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signature_strategy() -> impl Strategy<Value = Signature> {
        prop::collection::vec(any::<u8>(), SIGNATURE_SIZE).prop_map(|bytes| {
            let mut sig = [0u8; SIGNATURE_SIZE];
            sig.copy_from_slice(&bytes);
            Signature::from_bytes(sig)
        })
    }

    proptest! {
        #[test]
        fn record_roundtrip(index in any::<u32>(), length in any::<u32>(), sig in signature_strategy()) {
            let record = Record::new(index, length, sig);
            let decoded = Record::decode(&record.encode()).unwrap();
            prop_assert_eq!(decoded, record);
            prop_assert_eq!(decoded.index(), u64::from(index));
            prop_assert_eq!(decoded.length(), u64::from(length));
        }

        #[test]
        fn trailing_partial_record_always_rejected(count in 0usize..4, remainder in 1usize..RECORD_SIZE) {
            let mut bytes = Vec::new();
            for i in 0..count {
                bytes.extend_from_slice(&Record::new(i as u32, 0, Signature::from_bytes([0; 64])).encode());
            }
            bytes.extend(std::iter::repeat(0u8).take(remainder));

            let results: Vec<_> = RecordReader::new(std::io::Cursor::new(bytes), 8).collect();
            prop_assert_eq!(results.len(), count + 1);
            let is_malformed = matches!(
                results.last(),
                Some(Err(CodecError::MalformedRecord { .. }))
            );
            prop_assert!(is_malformed);
        }
    }
}
