//! Opening and validating corpus files.

use crate::error::{CoreError, CoreResult};
use cryptocheck_codec::{read_header, GlobalSeed, RecordReader, HEADER_SIZE, RECORD_SIZE};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Read buffer size for corpus streaming.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Size-derived shape of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusLayout {
    /// Total file size in bytes.
    pub size: u64,
    /// Number of records the file holds.
    pub record_count: u64,
}

impl CorpusLayout {
    /// Smallest valid corpus: a header and one record.
    pub const MIN_SIZE: u64 = (HEADER_SIZE + RECORD_SIZE) as u64;

    /// Validates a file size and derives the record count.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UndersizedInput`] if `size` is below [`Self::MIN_SIZE`]
    /// - [`CoreError::MisalignedInput`] if the body is not a whole number of records
    pub fn from_size(size: u64) -> CoreResult<Self> {
        if size < Self::MIN_SIZE {
            return Err(CoreError::UndersizedInput {
                size,
                minimum: Self::MIN_SIZE,
            });
        }

        let body = size - HEADER_SIZE as u64;
        let remainder = body % RECORD_SIZE as u64;
        if remainder != 0 {
            return Err(CoreError::MisalignedInput { size, remainder });
        }

        Ok(Self {
            size,
            record_count: body / RECORD_SIZE as u64,
        })
    }
}

/// A validated corpus file positioned at its first record.
pub struct CorpusFile {
    path: PathBuf,
    seed: GlobalSeed,
    layout: CorpusLayout,
    records: RecordReader<BufReader<File>>,
}

impl CorpusFile {
    /// Opens `path`, checks its size and reads the global seed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, stat'ed or read,
    /// and a size error if the layout is invalid.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let file = File::open(path)?;
        let layout = CorpusLayout::from_size(file.metadata()?.len())?;

        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let seed = read_header(&mut reader)?;

        Ok(Self {
            path: path.to_path_buf(),
            seed,
            layout,
            records: RecordReader::new(reader, HEADER_SIZE as u64),
        })
    }

    /// Path the corpus was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The corpus global seed.
    pub fn seed(&self) -> GlobalSeed {
        self.seed
    }

    /// Number of records promised by the file size.
    pub fn record_count(&self) -> u64 {
        self.layout.record_count
    }

    /// Size-derived layout.
    pub fn layout(&self) -> CorpusLayout {
        self.layout
    }

    /// Consumes the corpus, returning the record stream.
    pub fn into_records(self) -> RecordReader<BufReader<File>> {
        self.records
    }
}

impl std::fmt::Debug for CorpusFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusFile")
            .field("path", &self.path)
            .field("seed", &self.seed)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptocheck_codec::{CorpusWriter, Record, Signature};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn layout_accepts_whole_records() {
        let layout = CorpusLayout::from_size(8 + 72 * 3).unwrap();
        assert_eq!(layout.record_count, 3);
    }

    #[test]
    fn layout_rejects_undersized() {
        for size in [0, 7, 8, 79] {
            assert!(matches!(
                CorpusLayout::from_size(size),
                Err(CoreError::UndersizedInput { minimum: 80, .. })
            ));
        }
    }

    #[test]
    fn layout_rejects_trailing_bytes() {
        for r in [1, 35, 71] {
            match CorpusLayout::from_size(8 + 72 * 2 + r) {
                Err(CoreError::MisalignedInput { remainder, .. }) => assert_eq!(remainder, r),
                other => panic!("expected misaligned input, got {:?}", other),
            }
        }
    }

    #[test]
    fn open_reads_seed_and_records() {
        let mut file = NamedTempFile::new().unwrap();
        let mut writer = CorpusWriter::new(Vec::new(), GlobalSeed::new(0xfeed)).unwrap();
        writer
            .write_record(&Record::new(4, 5, Signature::from_bytes([1; 64])))
            .unwrap();
        file.write_all(&writer.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let corpus = CorpusFile::open(file.path()).unwrap();
        assert_eq!(corpus.seed(), GlobalSeed::new(0xfeed));
        assert_eq!(corpus.record_count(), 1);

        let records: Vec<_> = corpus.into_records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index(), 4);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CorpusFile::open(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
