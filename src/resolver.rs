use std::path::{Path, PathBuf};

use crate::batching::{discover_batches, write_batch, CompoundRecord};
use crate::config::ResolverConfig;
use crate::pubchem::StructureLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveSummary {
    pub requested: usize,
    pub resolved: usize,
    pub batch_files: Vec<PathBuf>,
}

/// One name per non-blank line. Missing or empty input is fatal for the stage.
pub fn read_compound_names(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(eyre::eyre!(
            "input file {} not found; create it with one compound name per line",
            path.display()
        ));
    }

    let names = std::fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if names.is_empty() {
        return Err(eyre::eyre!("input file {} is empty", path.display()));
    }

    Ok(names)
}

/// Looks every name up once, in order. Failures become records without SMILES so the
/// caller can still account for them.
pub async fn resolve_names<L: StructureLookup>(lookup: &L, names: &[String]) -> Vec<CompoundRecord> {
    let mut records = Vec::with_capacity(names.len());

    for name in names {
        let smiles = match lookup.lookup(name).await {
            Ok(matches) if matches.is_empty() => {
                log::warn!("compound {:?} not found in PubChem, skipping", name);
                None
            }
            Ok(mut matches) => {
                if matches.len() > 1 {
                    log::warn!(
                        "{:?} is ambiguous ({} PubChem matches), using the first",
                        name,
                        matches.len()
                    );
                }
                let smiles = matches.swap_remove(0);
                log::info!("found {:?}: {}", name, smiles);
                Some(smiles)
            }
            Err(e) => {
                log::error!("lookup of {:?} failed: {}, skipping", name, e);
                None
            }
        };

        records.push(CompoundRecord::new(name.clone(), smiles));
    }

    records
}

/// Keeps resolved records in input order and splits them into chunks of at most
/// `batch_size`.
pub fn partition(records: Vec<CompoundRecord>, batch_size: usize) -> Vec<Vec<CompoundRecord>> {
    let successful = records
        .into_iter()
        .filter(|r| r.smiles.is_some())
        .collect::<Vec<_>>();

    successful
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

pub async fn run<L: StructureLookup>(config: &ResolverConfig, lookup: &L) -> eyre::Result<ResolveSummary> {
    config.validate()?;

    let names = read_compound_names(&config.input_path)?;
    log::info!("read {} compound names from {}", names.len(), config.input_path.display());

    let records = resolve_names(lookup, &names).await;
    let batches = partition(records, config.batch_size);
    let resolved = batches.iter().map(Vec::len).sum::<usize>();
    log::info!(
        "resolved {} / {} compounds into {} batch file(s)",
        resolved,
        names.len(),
        batches.len()
    );

    std::fs::create_dir_all(&config.batch_dir)?;
    // Files this run won't overwrite would leak an earlier input into extraction.
    for stale in discover_batches(&config.batch_dir)? {
        if stale.index > batches.len() {
            log::warn!("removing stale batch file {}", stale.path.display());
            std::fs::remove_file(&stale.path)?;
        }
    }

    let mut batch_files = Vec::with_capacity(batches.len());
    for (i, batch) in batches.iter().enumerate() {
        let path = write_batch(&config.batch_dir, i + 1, batch)?;
        log::info!("created batch file {} ({} compounds)", path.display(), batch.len());
        batch_files.push(path);
    }

    Ok(ResolveSummary {
        requested: names.len(),
        resolved,
        batch_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, smiles: Option<&str>) -> CompoundRecord {
        CompoundRecord::new(name, smiles.map(str::to_string))
    }

    #[test]
    fn partition_drops_failures_and_keeps_order() {
        let records = vec![
            record("Aspirin", Some("CC(=O)OC1=CC=CC=C1C(=O)O")),
            record("Xyzzy123", None),
            record("Caffeine", Some("CN1C=NC2=C1C(=O)N(C(=O)N2C)C")),
            record("Ethanol", Some("CCO")),
        ];

        let batches = partition(records, 2);
        let names = batches
            .iter()
            .map(|b| b.iter().map(|r| r.compound.as_str()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![vec!["Aspirin", "Caffeine"], vec!["Ethanol"]]);
    }

    #[test]
    fn partition_of_nothing_is_no_batches() {
        assert!(partition(vec![record("Xyzzy123", None)], 15).is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() -> eyre::Result<()> {
        let dir = tempdir::TempDir::new("adme-resolver")?;
        let path = dir.path().join("compounds.txt");
        std::fs::write(&path, "Aspirin\n\n  \n  Caffeine  \n")?;

        assert_eq!(read_compound_names(&path)?, vec!["Aspirin", "Caffeine"]);
        Ok(())
    }

    #[test]
    fn empty_or_missing_input_is_fatal() -> eyre::Result<()> {
        let dir = tempdir::TempDir::new("adme-resolver")?;
        let path = dir.path().join("compounds.txt");
        assert!(read_compound_names(&path).is_err());

        std::fs::write(&path, "\n\n")?;
        assert!(read_compound_names(&path).is_err());
        Ok(())
    }
}
