//! Single-pass record streaming.

use crate::error::{CodecError, CodecResult};
use crate::header::{read_full, write_header, GlobalSeed, HEADER_SIZE};
use crate::record::{Record, RECORD_SIZE};
use std::io::{Read, Write};

/// A streaming reader over the records that follow the corpus header.
///
/// Holds exactly one record's worth of buffer. Wrap the source in a
/// `BufReader` to batch syscalls.
///
/// # Error Handling
///
/// - Zero bytes at a record boundary is a clean end of stream
/// - A partial record is a [`CodecError::MalformedRecord`]
/// - After the first error or the end of stream the iterator yields `None`
pub struct RecordReader<R> {
    inner: R,
    buf: [u8; RECORD_SIZE],
    /// Stream offset of the next record.
    offset: u64,
    records_read: u64,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    /// Creates a reader positioned at the first record.
    ///
    /// `start_offset` is the stream offset of that record and is only used in
    /// error reports; pass [`HEADER_SIZE`] when the header was consumed from
    /// the same stream.
    pub fn new(inner: R, start_offset: u64) -> Self {
        Self {
            inner,
            buf: [0u8; RECORD_SIZE],
            offset: start_offset,
            records_read: 0,
            finished: false,
        }
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedRecord`] on a partial record, or an
    /// I/O error from the underlying reader.
    pub fn decode_next(&mut self) -> CodecResult<Option<Record>> {
        if self.finished {
            return Ok(None);
        }

        let filled = match read_full(&mut self.inner, &mut self.buf) {
            Ok(n) => n,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if filled == 0 {
            self.finished = true;
            return Ok(None);
        }
        if filled < RECORD_SIZE {
            self.finished = true;
            return Err(CodecError::malformed_record(self.offset, filled));
        }

        let record = Record::decode(&self.buf)?;
        self.offset += RECORD_SIZE as u64;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Number of records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Stream offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = CodecResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next().transpose()
    }
}

/// Writes a corpus: the header followed by records.
pub struct CorpusWriter<W: Write> {
    inner: W,
    records_written: u64,
}

impl<W: Write> CorpusWriter<W> {
    /// Writes the header and returns a writer ready for records.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(mut inner: W, seed: GlobalSeed) -> CodecResult<Self> {
        write_header(&mut inner, seed)?;
        Ok(Self {
            inner,
            records_written: 0,
        })
    }

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_record(&mut self, record: &Record) -> CodecResult<()> {
        self.inner.write_all(&record.encode())?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Total bytes written, header included.
    pub fn bytes_written(&self) -> u64 {
        HEADER_SIZE as u64 + self.records_written * RECORD_SIZE as u64
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> CodecResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::read_header;
    use crate::record::Signature;
    use std::io::Cursor;

    fn corpus(records: &[Record]) -> Vec<u8> {
        let mut writer = CorpusWriter::new(Vec::new(), GlobalSeed::new(42)).unwrap();
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap()
    }

    fn record(i: u32) -> Record {
        Record::new(i, i * 3, Signature::from_bytes([i as u8; 64]))
    }

    #[test]
    fn reads_records_in_stream_order() {
        let records: Vec<_> = (0..5).map(record).collect();
        let bytes = corpus(&records);
        assert_eq!(bytes.len(), HEADER_SIZE + 5 * RECORD_SIZE);

        let mut cursor = Cursor::new(bytes);
        assert_eq!(read_header(&mut cursor).unwrap(), GlobalSeed::new(42));

        let reader = RecordReader::new(cursor, HEADER_SIZE as u64);
        let decoded: Vec<_> = reader.collect::<CodecResult<_>>().unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn empty_body_is_clean_end() {
        let mut reader = RecordReader::new(Cursor::new(Vec::<u8>::new()), 8);
        assert!(reader.decode_next().unwrap().is_none());
        assert_eq!(reader.records_read(), 0);
        assert_eq!(reader.offset(), 8);
    }

    #[test]
    fn into_inner_hands_back_source_at_next_record() {
        let mut cursor = Cursor::new(corpus(&[record(1), record(2)]));
        read_header(&mut cursor).unwrap();
        let mut reader = RecordReader::new(cursor, HEADER_SIZE as u64);
        assert_eq!(reader.decode_next().unwrap(), Some(record(1)));
        assert_eq!(reader.offset(), (HEADER_SIZE + RECORD_SIZE) as u64);

        let cursor = reader.into_inner();
        assert_eq!(cursor.position(), (HEADER_SIZE + RECORD_SIZE) as u64);
    }

    #[test]
    fn partial_record_is_malformed() {
        let mut bytes = record(1).encode().to_vec();
        bytes.extend_from_slice(&record(2).encode()[..30]);

        let mut reader = RecordReader::new(Cursor::new(bytes), 8);
        assert_eq!(reader.decode_next().unwrap(), Some(record(1)));
        match reader.decode_next() {
            Err(CodecError::MalformedRecord {
                offset,
                available,
                expected,
            }) => {
                assert_eq!(offset, 8 + 72);
                assert_eq!(available, 30);
                assert_eq!(expected, 72);
            }
            other => panic!("expected malformed record, got {:?}", other),
        }
        // The reader stays finished after an error.
        assert!(reader.next().is_none());
    }

    #[test]
    fn writer_tracks_sizes() {
        let mut writer = CorpusWriter::new(Vec::new(), GlobalSeed::new(1)).unwrap();
        assert_eq!(writer.bytes_written(), 8);
        writer.write_record(&record(3)).unwrap();
        assert_eq!(writer.records_written(), 1);
        assert_eq!(writer.bytes_written(), 80);
    }
}
