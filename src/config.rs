use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT_FILE: &str = "compounds.txt";
pub const DEFAULT_BATCH_DIR: &str = ".";
pub const DEFAULT_RESULTS_DIR: &str = "results";
pub const DEFAULT_FINAL_OUTPUT_FILE: &str = "swissadme_final_output.csv";
pub const DEFAULT_BATCH_SIZE: usize = 15;

pub const DEFAULT_PUBCHEM_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
pub const DEFAULT_TARGET_URL: &str = "http://www.swissadme.ch";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

pub const DEFAULT_MAX_CONCURRENT_SESSIONS: usize = 1;
pub const DEFAULT_BATCH_COOLDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_PACING: Duration = Duration::from_secs(3);
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_FIELD_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONSENT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(50);

/// Settings for the name → SMILES stage.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub input_path: PathBuf,
    pub batch_dir: PathBuf,
    pub batch_size: usize,
    pub pubchem_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            batch_dir: PathBuf::from(DEFAULT_BATCH_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            pubchem_url: DEFAULT_PUBCHEM_URL.to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.batch_size == 0 {
            return Err(eyre::eyre!("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Settings for the browser-driven extraction stage.
///
/// Every timing knob is explicit so tests can run the whole orchestrator with zero delays.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub batch_dir: PathBuf,
    pub results_dir: PathBuf,
    pub max_concurrent_sessions: usize,
    pub batch_cooldown: Duration,
    pub request_pacing: Duration,
    pub page_timeout: Duration,
    pub field_timeout: Duration,
    pub consent_timeout: Duration,
    pub typing_delay: Duration,
    pub target_url: String,
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            batch_dir: PathBuf::from(DEFAULT_BATCH_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            max_concurrent_sessions: DEFAULT_MAX_CONCURRENT_SESSIONS,
            batch_cooldown: DEFAULT_BATCH_COOLDOWN,
            request_pacing: DEFAULT_REQUEST_PACING,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            field_timeout: DEFAULT_FIELD_TIMEOUT,
            consent_timeout: DEFAULT_CONSENT_TIMEOUT,
            typing_delay: DEFAULT_TYPING_DELAY,
            target_url: DEFAULT_TARGET_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.max_concurrent_sessions == 0 {
            return Err(eyre::eyre!("at least one concurrent browser session is required"));
        }
        if self.target_url.trim().is_empty() {
            return Err(eyre::eyre!("target url must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub results_dir: PathBuf,
    pub final_output: PathBuf,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            final_output: PathBuf::from(DEFAULT_RESULTS_DIR).join(DEFAULT_FINAL_OUTPUT_FILE),
        }
    }
}

impl AggregateConfig {
    /// Final report lands next to the checkpoints unless told otherwise.
    pub fn for_results_dir(results_dir: impl Into<PathBuf>) -> Self {
        let results_dir = results_dir.into();
        let final_output = results_dir.join(DEFAULT_FINAL_OUTPUT_FILE);
        Self {
            results_dir,
            final_output,
        }
    }
}
