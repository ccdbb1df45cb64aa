//! Result checkpoints and the atomic CSV writes shared by every stage.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::swissadme::{ExtractionResult, Property, COMPOUND_COLUMN, REPORT_COLUMNS, SMILES_COLUMN};

/// Writes through a sibling temp file and renames it into place, so a crash leaves
/// either the old file or the new one, never half of each.
pub fn write_csv_atomic<F>(path: &Path, fill: F) -> eyre::Result<()>
where
    F: FnOnce(&mut csv::Writer<File>) -> eyre::Result<()>,
{
    let tmp_path = temp_path_for(path)?;

    let written = (|| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)?;
        fill(&mut writer)?;
        writer.flush()?;
        eyre::Ok(())
    })();

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        eyre::eyre!("failed to move results into {}: {e}", path.display())
    })
}

fn temp_path_for(path: &Path) -> eyre::Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre::eyre!("{} has no usable file name", path.display()))?;
    Ok(path.with_file_name(format!(".{file_name}.tmp")))
}

/// Writes rows under the fixed report header, missing values as empty cells.
pub fn write_results(path: &Path, rows: &[ExtractionResult]) -> eyre::Result<()> {
    write_csv_atomic(path, |writer| {
        writer.write_record(REPORT_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        Ok(())
    })
}

/// Reads a result file by header name, so files whose columns are reordered, extra or
/// partly missing still map onto the report schema. Only `Compound` is mandatory.
pub fn read_results(path: &Path) -> eyre::Result<Vec<ExtractionResult>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let compound_idx = position(COMPOUND_COLUMN).ok_or_else(|| eyre::eyre!(
        "{} is missing required column {:?}",
        path.display(),
        COMPOUND_COLUMN
    ))?;
    let smiles_idx = position(SMILES_COLUMN);
    let property_idx = Property::ALL
        .iter()
        .map(|p| (*p, position(p.column())))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let Some(compound) = cell(Some(compound_idx)) else {
            continue;
        };
        let mut row = ExtractionResult::new(compound, cell(smiles_idx).unwrap_or_default());
        for (property, idx) in &property_idx {
            row.set(*property, cell(*idx));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// What an earlier run already finished for one batch.
#[derive(Debug, Default)]
pub struct ResumeBaseline {
    pub rows: Vec<ExtractionResult>,
    pub processed: HashSet<String>,
}

impl ResumeBaseline {
    /// A missing checkpoint is a fresh start, not an error.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let rows = read_results(path)?;
        let processed = rows.iter().map(|r| r.compound.clone()).collect();
        Ok(Self { rows, processed })
    }

    pub fn contains(&self, compound: &str) -> bool {
        self.processed.contains(compound)
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ExtractionResult>) {
        for row in rows {
            if self.processed.insert(row.compound.clone()) {
                self.rows.push(row);
            }
        }
    }
}
