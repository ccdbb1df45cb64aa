use std::path::PathBuf;

use crate::batching::discover_states;
use crate::batching::state::{read_results, write_results};
use crate::config::AggregateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateOutcome {
    Written {
        path: PathBuf,
        rows: usize,
        sources: usize,
    },
    /// Every checkpoint was missing or empty; nothing was written.
    NoData,
}

/// Concatenates every batch checkpoint into the final report, then removes the
/// checkpoints it consumed.
pub fn aggregate(config: &AggregateConfig) -> eyre::Result<AggregateOutcome> {
    let states = discover_states(&config.results_dir)?;

    let mut rows = Vec::new();
    let mut consumed = Vec::new();
    let mut sources = 0;
    for state in states {
        match read_results(&state.path) {
            Ok(batch_rows) if batch_rows.is_empty() => {
                log::warn!("{} has no rows, skipping", state.path.display());
                consumed.push(state.path);
            }
            Ok(batch_rows) => {
                log::info!("{}: {} row(s)", state.path.display(), batch_rows.len());
                rows.extend(batch_rows);
                sources += 1;
                consumed.push(state.path);
            }
            Err(e) => {
                log::warn!("could not read {}, leaving it in place: {:?}", state.path.display(), e);
            }
        }
    }

    if rows.is_empty() {
        log::error!(
            "no result data found in {}; final report not written",
            config.results_dir.display()
        );
        return Ok(AggregateOutcome::NoData);
    }

    if let Some(parent) = config.final_output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_results(&config.final_output, &rows)?;
    log::info!(
        "final report with {} row(s) saved to {}",
        rows.len(),
        config.final_output.display()
    );

    for path in consumed {
        if path == config.final_output {
            continue;
        }
        if let Err(e) = std::fs::remove_file(&path) {
            log::warn!("could not delete {}: {}", path.display(), e);
        }
    }

    Ok(AggregateOutcome::Written {
        path: config.final_output.clone(),
        rows: rows.len(),
        sources,
    })
}
