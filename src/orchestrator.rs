use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::batching::state::{write_results, ResumeBaseline};
use crate::batching::{discover_batches, read_batch, state_file_name, BatchFile, CompoundRecord};
use crate::config::ExtractionConfig;
use crate::swissadme::session::SessionLauncher;
use crate::swissadme::worker::SessionWorker;
use crate::swissadme::ExtractionResult;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub batches_found: usize,
    pub batches_processed: usize,
    pub batches_skipped: usize,
    pub tasks_launched: usize,
    pub complete_rows: usize,
    pub partial_rows: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub already_done: usize,
    pub tasks_launched: usize,
    pub complete_rows: usize,
    pub partial_rows: usize,
    pub state_rows: usize,
}

/// Walks the batch files in order, resuming each from its checkpoint.
pub struct Orchestrator<L: SessionLauncher> {
    config: Arc<ExtractionConfig>,
    worker: SessionWorker<L>,
}

impl<L: SessionLauncher> Orchestrator<L> {
    pub fn new(config: ExtractionConfig, launcher: L) -> eyre::Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let worker = SessionWorker::new(Arc::new(launcher), config.clone());
        Ok(Self { config, worker })
    }

    pub async fn run(&self) -> eyre::Result<RunSummary> {
        std::fs::create_dir_all(&self.config.results_dir)?;

        let batches = discover_batches(&self.config.batch_dir)?;
        if batches.is_empty() {
            return Err(eyre::eyre!(
                "no smiles_input_batch_*.csv files found in {}; run resolve-smiles first",
                self.config.batch_dir.display()
            ));
        }
        log::info!("found {} batch file(s) to process", batches.len());

        let mut summary = RunSummary {
            batches_found: batches.len(),
            ..Default::default()
        };

        for (i, batch) in batches.iter().enumerate() {
            log::info!(
                "processing batch {} / {}: {}",
                i + 1,
                batches.len(),
                batch.path.display()
            );

            match self.process_batch(batch).await {
                Ok(outcome) => {
                    summary.batches_processed += 1;
                    summary.tasks_launched += outcome.tasks_launched;
                    summary.complete_rows += outcome.complete_rows;
                    summary.partial_rows += outcome.partial_rows;
                    log::info!(
                        "finished batch {} / {}: {} new, {} resumed, {} rows saved",
                        i + 1,
                        batches.len(),
                        outcome.tasks_launched,
                        outcome.already_done,
                        outcome.state_rows
                    );
                }
                Err(e) => {
                    summary.batches_skipped += 1;
                    log::error!("skipping batch {}: {:?}", batch.path.display(), e);
                }
            }

            if i + 1 < batches.len() && !self.config.batch_cooldown.is_zero() {
                log::info!(
                    "cooling down for {} seconds",
                    self.config.batch_cooldown.as_secs_f64()
                );
                tokio::time::sleep(self.config.batch_cooldown).await;
            }
        }

        log::info!("all batches processed: {:?}", summary);
        Ok(summary)
    }

    pub async fn process_batch(&self, batch: &BatchFile) -> eyre::Result<BatchOutcome> {
        let state_path = self.config.results_dir.join(state_file_name(batch.index));
        let mut baseline = ResumeBaseline::load(&state_path)?;
        let records = read_batch(&batch.path)?;

        let pending = pending_records(records, &baseline);
        let mut outcome = BatchOutcome {
            already_done: baseline.processed.len(),
            tasks_launched: pending.len(),
            ..Default::default()
        };
        if !baseline.rows.is_empty() {
            log::info!(
                "resuming with {} compound(s) already in {}",
                baseline.rows.len(),
                state_path.display()
            );
        }

        let results = self.extract_all(pending).await;
        for row in &results {
            if row.is_complete() {
                outcome.complete_rows += 1;
            } else {
                outcome.partial_rows += 1;
            }
        }

        baseline.extend(results);
        write_results(&state_path, &baseline.rows)?;
        outcome.state_rows = baseline.rows.len();

        Ok(outcome)
    }

    /// Launches every task at once and waits for all of them; the semaphore inside
    /// the worker decides how many actually hold a browser.
    async fn extract_all(&self, pending: Vec<(String, String)>) -> Vec<ExtractionResult> {
        let mut tasks = JoinSet::new();
        for (position, (compound, smiles)) in pending.iter().cloned().enumerate() {
            let worker = self.worker.clone();
            tasks.spawn(async move { (position, worker.extract(compound, smiles).await) });
        }

        let mut slots: Vec<Option<ExtractionResult>> = vec![None; pending.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => slots[position] = Some(result),
                Err(e) => log::error!("extraction task aborted: {}", e),
            }
        }

        // A task that panicked still owes its batch a name + SMILES row.
        slots
            .into_iter()
            .zip(pending)
            .map(|(slot, (compound, smiles))| {
                slot.unwrap_or_else(|| ExtractionResult::new(compound, smiles))
            })
            .collect()
    }
}

/// Rows still to run: not checkpointed, with a SMILES, first occurrence only.
pub fn pending_records(
    records: Vec<CompoundRecord>,
    baseline: &ResumeBaseline,
) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|r| Some((r.compound, r.smiles?)))
        .filter(|(compound, _)| !baseline.contains(compound))
        .filter(|(compound, _)| seen.insert(compound.clone()))
        .collect()
}
