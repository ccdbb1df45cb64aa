use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

pub mod state;

pub const BATCH_COMPOUND_COLUMN: &str = "compound";
pub const BATCH_SMILES_COLUMN: &str = "smiles";

lazy_static! {
    static ref BATCH_FILE_PATTERN: Regex =
        Regex::new(r"^smiles_input_batch_(\d+)\.csv$").expect("valid batch file pattern");
    static ref STATE_FILE_PATTERN: Regex =
        Regex::new(r"^batch_(\d+)_results\.csv$").expect("valid state file pattern");
}

/// A compound name with its resolved SMILES, if the lookup found one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundRecord {
    pub compound: String,
    pub smiles: Option<String>,
}

impl CompoundRecord {
    pub fn new(compound: impl Into<String>, smiles: Option<String>) -> Self {
        Self {
            compound: compound.into(),
            smiles,
        }
    }
}

/// A numbered file on disk, either a batch input or its result checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    pub index: usize,
    pub path: PathBuf,
}

/// Indices are zero-padded so a plain directory listing sorts the same way we do.
pub fn batch_file_name(index: usize) -> String {
    format!("smiles_input_batch_{index:03}.csv")
}

pub fn state_file_name(index: usize) -> String {
    format!("batch_{index:03}_results.csv")
}

pub fn discover_batches(dir: impl AsRef<Path>) -> eyre::Result<Vec<BatchFile>> {
    discover(dir.as_ref(), &BATCH_FILE_PATTERN)
}

pub fn discover_states(dir: impl AsRef<Path>) -> eyre::Result<Vec<BatchFile>> {
    discover(dir.as_ref(), &STATE_FILE_PATTERN)
}

/// Sorted by the parsed index, not the file name, so `..._batch_10.csv` from older
/// unpadded runs still comes after `..._batch_2.csv`.
fn discover(dir: &Path, pattern: &Regex) -> eyre::Result<Vec<BatchFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(eyre::eyre!("{:?} exists but it is not a directory", dir));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(captures) = pattern.captures(file_name) else {
            continue;
        };
        let Ok(index) = captures[1].parse::<usize>() else {
            log::warn!("ignoring {}: index out of range", file_name);
            continue;
        };
        if entry.file_type()?.is_file() {
            files.push(BatchFile {
                index,
                path: entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

pub fn write_batch(
    dir: impl AsRef<Path>,
    index: usize,
    records: &[CompoundRecord],
) -> eyre::Result<PathBuf> {
    let path = dir.as_ref().join(batch_file_name(index));

    state::write_csv_atomic(&path, |writer| {
        writer.write_record([BATCH_COMPOUND_COLUMN, BATCH_SMILES_COLUMN])?;
        for record in records {
            writer.write_record([
                record.compound.as_str(),
                record.smiles.as_deref().unwrap_or(""),
            ])?;
        }
        Ok(())
    })?;

    Ok(path)
}

/// Reads a batch input. A file lacking either required column is malformed.
pub fn read_batch(path: impl AsRef<Path>) -> eyre::Result<Vec<CompoundRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| eyre::eyre!(
                "{} is missing required column {:?}",
                path.display(),
                name
            ))
    };
    let compound_idx = column(BATCH_COMPOUND_COLUMN)?;
    let smiles_idx = column(BATCH_SMILES_COLUMN)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let compound = row.get(compound_idx).unwrap_or("").trim();
        if compound.is_empty() {
            continue;
        }
        let smiles = row
            .get(smiles_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        records.push(CompoundRecord::new(compound, smiles));
    }

    Ok(records)
}
