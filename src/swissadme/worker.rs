use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;

use super::extractor::{extract_all, RESULTS_MARKER_XPATH};
use super::session::{BrowserSession, SessionLauncher};
use super::ExtractionResult;
use crate::config::ExtractionConfig;

pub const CONSENT_BUTTON_XPATH: &str =
    "//button[contains(normalize-space(.), 'Accept') or contains(normalize-space(.), 'Agree')]";
pub const SMILES_INPUT_SELECTOR: &str = "textarea[name='smiles']";
pub const SUBMIT_BUTTON_SELECTOR: &str = "#submitButton:enabled";

/// Runs one compound through SwissADME in its own browser session.
///
/// Sessions are never reused between compounds. The shared semaphore caps how many
/// sessions exist at once.
pub struct SessionWorker<L: SessionLauncher> {
    launcher: Arc<L>,
    limiter: Arc<Semaphore>,
    config: Arc<ExtractionConfig>,
}

impl<L: SessionLauncher> Clone for SessionWorker<L> {
    fn clone(&self) -> Self {
        Self {
            launcher: self.launcher.clone(),
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }
    }
}

impl<L: SessionLauncher> SessionWorker<L> {
    pub fn new(launcher: Arc<L>, config: Arc<ExtractionConfig>) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_sessions));
        Self {
            launcher,
            limiter,
            config,
        }
    }

    pub fn available_sessions(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Never fails: anything that goes wrong degrades to a row holding only what was
    /// collected before the failure.
    pub async fn extract(&self, compound: String, smiles: String) -> ExtractionResult {
        let _permit = match self.limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                log::error!("session limiter closed before {} could run: {}", compound, e);
                return ExtractionResult::new(compound, smiles);
            }
        };

        log::info!("processing compound: {}", compound);
        tokio::time::sleep(self.config.request_pacing).await;

        let launcher = self.launcher.clone();
        let config = self.config.clone();
        let (name, smi) = (compound.clone(), smiles.clone());
        let outcome = tokio::task::spawn_blocking(move || {
            run_session(launcher.as_ref(), config.as_ref(), &name, &smi)
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                log::error!("session task for {} did not complete: {}", compound, e);
                ExtractionResult::new(compound, smiles)
            }
        }
    }
}

/// The blocking half of a worker task: launch, drive, release.
pub fn run_session<L: SessionLauncher + ?Sized>(
    launcher: &L,
    config: &ExtractionConfig,
    compound: &str,
    smiles: &str,
) -> ExtractionResult {
    let mut result = ExtractionResult::new(compound, smiles);

    let mut session = match launcher.launch(&config.user_agent) {
        Ok(session) => session,
        Err(e) => {
            log::error!("failed processing {}: {:?}", compound, e);
            return result;
        }
    };

    match drive_session(&mut session, config, &mut result) {
        Ok(()) => log::info!(
            "finished processing {} ({}/8 fields)",
            compound,
            result.extracted_count()
        ),
        Err(e) => log::error!("failed processing {}: {:?}", compound, e),
    }

    release_session(&mut session, compound);

    result
}

fn drive_session<S: BrowserSession + ?Sized>(
    session: &mut S,
    config: &ExtractionConfig,
    result: &mut ExtractionResult,
) -> eyre::Result<()> {
    session.navigate(&config.target_url, config.page_timeout)?;

    if let Err(e) = session.click_xpath(CONSENT_BUTTON_XPATH, config.consent_timeout) {
        log::debug!("no consent prompt dismissed: {}", e);
    }

    session.click(SMILES_INPUT_SELECTOR, config.page_timeout)?;
    let query = format!("{} {}", result.smiles, result.compound);
    session.type_text(&query, config.typing_delay)?;

    session.click(SUBMIT_BUTTON_SELECTOR, config.page_timeout)?;

    session
        .wait_for_xpath(RESULTS_MARKER_XPATH, config.page_timeout)
        .map_err(|e| eyre::eyre!("results never rendered: {e}"))?;

    let pdf = session.print_pdf()?;
    let pdf_path = pdf_path(config, &result.compound);
    std::fs::write(&pdf_path, pdf)
        .map_err(|e| eyre::eyre!("failed to write {}: {e}", pdf_path.display()))?;

    extract_all(session, result, config.field_timeout);

    Ok(())
}

fn release_session<S: BrowserSession + ?Sized>(session: &mut S, compound: &str) {
    if let Err(e) = session.close_page() {
        log::warn!("{}: {:?}", compound, e);
    }
    if let Err(e) = session.close_context() {
        log::warn!("{}: {:?}", compound, e);
    }
    if let Err(e) = session.close_browser() {
        log::warn!("{}: {:?}", compound, e);
    }
}

pub fn pdf_path(config: &ExtractionConfig, compound: &str) -> PathBuf {
    config
        .results_dir
        .join(format!("{}.pdf", sanitize_file_stem(compound)))
}

/// Compound names are free text; keep them recognisable but filesystem-safe.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "compound".to_string()
    } else {
        stem
    }
}
