//! Inspect command implementation.

use cryptocheck_core::{format_count, CorpusFile};
use serde::Serialize;
use std::path::Path;

/// Corpus inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Corpus path.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Global seed, hex.
    pub seed_hex: String,
    /// Global seed, decimal.
    pub seed: u64,
    /// Number of records.
    pub record_count: u64,
    /// Leading records.
    pub records: Vec<RecordView>,
}

/// One record as displayed.
#[derive(Debug, Serialize)]
pub struct RecordView {
    /// Account index.
    pub index: u64,
    /// Length selector.
    pub length: u64,
    /// Signature, hex.
    pub signature: String,
}

/// Collects the header and the first `limit` records of a corpus.
pub fn inspect(path: &Path, limit: usize) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let corpus = CorpusFile::open(path)?;

    let mut result = InspectResult {
        path: path.display().to_string(),
        size: corpus.layout().size,
        seed_hex: corpus.seed().to_hex(),
        seed: corpus.seed().value(),
        record_count: corpus.record_count(),
        records: Vec::new(),
    };

    for record in corpus.into_records().take(limit) {
        let record = record?;
        result.records.push(RecordView {
            index: record.index(),
            length: record.length(),
            signature: record.signature().to_hex(),
        });
    }

    Ok(result)
}

/// Runs the inspect command.
pub fn run(path: &Path, limit: usize, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path, limit)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_text_output(&result),
        other => return Err(format!("unknown output format: {}", other).into()),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("cryptocheck corpus");
    println!("==================");
    println!();
    println!("Path:    {}", result.path);
    println!("Size:    {} bytes", format_count(result.size));
    println!("Seed:    {}({})", result.seed_hex, result.seed);
    println!("Records: {}", format_count(result.record_count));

    if !result.records.is_empty() {
        println!();
        for record in &result.records {
            println!("[{}, {}, {}]", record.index, record.length, record.signature);
        }
        let shown = result.records.len() as u64;
        if shown < result.record_count {
            println!("... {} more", format_count(result.record_count - shown));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptocheck_codec::{CorpusWriter, GlobalSeed, Record, Signature};

    fn write_corpus(dir: &Path, count: u32) -> std::path::PathBuf {
        let mut writer = CorpusWriter::new(Vec::new(), GlobalSeed::new(0xabcdef)).unwrap();
        for i in 0..count {
            writer
                .write_record(&Record::new(i, i + 1, Signature::from_bytes([i as u8; 64])))
                .unwrap();
        }
        let path = dir.join("corpus.bin");
        std::fs::write(&path, writer.finish().unwrap()).unwrap();
        path
    }

    #[test]
    fn inspect_limits_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_corpus(dir.path(), 5);

        let result = inspect(&path, 2).unwrap();
        assert_eq!(result.seed, 0xabcdef);
        assert_eq!(result.seed_hex, "0000000000abcdef");
        assert_eq!(result.record_count, 5);
        assert_eq!(result.size, 8 + 5 * 72);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].index, 1);
        assert_eq!(result.records[1].length, 2);
        assert_eq!(result.records[1].signature, "01".repeat(64));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["record_count"], 5);
    }
}
