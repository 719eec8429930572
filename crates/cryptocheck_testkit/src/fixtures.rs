//! Corpus fixtures.
//!
//! Builds corpora whose records are really signed with the key and message
//! the verifier will reconstruct, so a fixture verifies unless it is
//! deliberately tampered with.

use cryptocheck_codec::{CorpusWriter, GlobalSeed, Record};
use cryptocheck_core::{CryptoAdapter, Ed25519Adapter, SeedDeriver};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for in-memory or on-disk corpora.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    deriver: SeedDeriver,
    adapter: Ed25519Adapter,
    records: Vec<Record>,
    trailing: Vec<u8>,
}

impl CorpusBuilder {
    /// Starts an empty corpus for `seed`.
    pub fn new(seed: GlobalSeed) -> Self {
        Self {
            deriver: SeedDeriver::new(seed),
            adapter: Ed25519Adapter::new(),
            records: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// The corpus global seed.
    pub fn seed(&self) -> GlobalSeed {
        self.deriver.seed()
    }

    /// Produces a correctly signed record without adding it.
    pub fn sign(&self, index: u32, length: u32) -> Record {
        let key_pair = self
            .adapter
            .derive_key_pair(&self.deriver.account_seed(u64::from(index)))
            .expect("Ed25519 key derivation is infallible");
        let message = self.deriver.message(u64::from(length));
        Record::new(index, length, self.adapter.sign(&key_pair, &message))
    }

    /// Appends a correctly signed record.
    pub fn signed(mut self, index: u32, length: u32) -> Self {
        let record = self.sign(index, length);
        self.records.push(record);
        self
    }

    /// Appends `count` signed records with spread-out indices and lengths.
    pub fn signed_range(mut self, count: u32) -> Self {
        let start = self.records.len() as u32;
        for i in start..start + count {
            let record = self.sign(i.wrapping_mul(7919), i.wrapping_mul(1031));
            self.records.push(record);
        }
        self
    }

    /// Appends `count` signed records with random indices and lengths drawn
    /// from a generator seeded with `rng_seed`.
    pub fn random_signed(mut self, count: usize, rng_seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        for _ in 0..count {
            let record = self.sign(rng.gen(), rng.gen());
            self.records.push(record);
        }
        self
    }

    /// Appends a signed record with one signature bit flipped.
    pub fn tampered(mut self, index: u32, length: u32, bit: usize) -> Self {
        let good = self.sign(index, length);
        self.records.push(Record::new(
            index,
            length,
            good.signature().with_flipped_bit(bit),
        ));
        self
    }

    /// Appends a record as-is.
    pub fn raw(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Appends bytes after the last record, producing a misaligned corpus.
    pub fn trailing_bytes(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    /// Records added so far, in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Encodes the corpus.
    pub fn build(&self) -> Vec<u8> {
        let mut writer =
            CorpusWriter::new(Vec::new(), self.seed()).expect("writing to a Vec cannot fail");
        for record in &self.records {
            writer
                .write_record(record)
                .expect("writing to a Vec cannot fail");
        }
        let mut bytes = writer.finish().expect("writing to a Vec cannot fail");
        bytes.extend_from_slice(&self.trailing);
        bytes
    }

    /// Writes the corpus to a fresh temporary file.
    pub fn write_temp(&self) -> TempCorpus {
        TempCorpus::with_bytes(&self.build())
    }
}

/// A corpus file removed when dropped.
#[derive(Debug)]
pub struct TempCorpus {
    path: PathBuf,
    /// Kept alive to prevent cleanup.
    _temp_dir: TempDir,
}

impl TempCorpus {
    /// Writes arbitrary bytes to a temporary corpus file.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("corpus.bin");
        let mut file = std::fs::File::create(&path).expect("Failed to create corpus file");
        file.write_all(bytes).expect("Failed to write corpus file");
        file.sync_all().expect("Failed to sync corpus file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the corpus file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the corpus file in bytes.
    pub fn size(&self) -> u64 {
        std::fs::metadata(&self.path)
            .expect("corpus file exists")
            .len()
    }
}
