#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adme_harvest::config::ExtractionConfig;
use adme_harvest::swissadme::extractor::{label_xpath, RESULTS_MARKER_XPATH};
use adme_harvest::swissadme::session::{BrowserSession, SessionLauncher};
use adme_harvest::swissadme::Property;

pub const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";
pub const CAFFEINE: &str = "CN1C=NC2=C1C(=O)N(C(=O)N2C)C";
pub const ETHANOL: &str = "CCO";

pub fn fast_config(batch_dir: &Path, results_dir: &Path) -> ExtractionConfig {
    ExtractionConfig {
        batch_dir: batch_dir.to_path_buf(),
        results_dir: results_dir.to_path_buf(),
        batch_cooldown: Duration::ZERO,
        request_pacing: Duration::ZERO,
        page_timeout: Duration::from_millis(10),
        field_timeout: Duration::from_millis(10),
        consent_timeout: Duration::from_millis(10),
        typing_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// The value cells of a typical SwissADME results table, keyed by label.
pub fn swissadme_table() -> HashMap<String, String> {
    [
        (Property::MolecularFormula, "C9H8O4"),
        (Property::MolecularWeight, "180.16 g/mol"),
        (Property::MLogP, "1.51"),
        (Property::Tpsa, "63.60 Å²"),
        (Property::HBondAcceptors, "4"),
        (Property::HBondDonors, "1"),
        (Property::LipinskiFilter, "Yes; 0 violation"),
        (Property::BioavailabilityScore, "0.85"),
    ]
    .into_iter()
    .map(|(p, v)| (p.label().to_string(), v.to_string()))
    .collect()
}

#[derive(Default)]
pub struct Script {
    pub table: HashMap<String, String>,
    pub never_render: HashSet<String>,
    pub fail_launch: bool,
    pub fail_close_page: bool,
    pub launches: usize,
    pub typed: Vec<String>,
    pub events: Vec<String>,
    pub active: usize,
    pub max_active: usize,
}

/// Stands in for Chrome: answers label lookups from a table and records what the
/// worker did.
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedLauncher {
    pub fn with_table(table: HashMap<String, String>) -> Self {
        let launcher = Self::default();
        launcher.script.lock().unwrap().table = table;
        launcher
    }

    pub fn never_render(self, compound: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .never_render
            .insert(compound.to_string());
        self
    }

    pub fn launches(&self) -> usize {
        self.script.lock().unwrap().launches
    }

    pub fn typed(&self) -> Vec<String> {
        self.script.lock().unwrap().typed.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.script.lock().unwrap().events.clone()
    }

    pub fn max_active(&self) -> usize {
        self.script.lock().unwrap().max_active
    }
}

impl SessionLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    fn launch(&self, user_agent: &str) -> eyre::Result<ScriptedSession> {
        let mut script = self.script.lock().unwrap();
        script.launches += 1;
        if script.fail_launch {
            return Err(eyre::eyre!("chrome binary not found"));
        }
        script.active += 1;
        script.max_active = script.max_active.max(script.active);
        script.events.push(format!("launch {user_agent}"));

        Ok(ScriptedSession {
            script: self.script.clone(),
            typed: String::new(),
        })
    }
}

pub struct ScriptedSession {
    script: Arc<Mutex<Script>>,
    typed: String,
}

impl ScriptedSession {
    fn record(&self, event: String) {
        self.script.lock().unwrap().events.push(event);
    }
}

impl BrowserSession for ScriptedSession {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> eyre::Result<()> {
        self.record(format!("navigate {url}"));
        Ok(())
    }

    fn click(&mut self, selector: &str, _timeout: Duration) -> eyre::Result<()> {
        self.record(format!("click {selector}"));
        Ok(())
    }

    fn click_xpath(&mut self, _xpath: &str, _timeout: Duration) -> eyre::Result<()> {
        Err(eyre::eyre!("no consent prompt on this page"))
    }

    fn type_text(&mut self, text: &str, _per_char_delay: Duration) -> eyre::Result<()> {
        self.typed.push_str(text);
        self.script.lock().unwrap().typed.push(text.to_string());
        Ok(())
    }

    fn wait_for_xpath(&mut self, xpath: &str, _timeout: Duration) -> eyre::Result<()> {
        let script = self.script.lock().unwrap();
        let hung = script
            .never_render
            .iter()
            .any(|compound| self.typed.ends_with(&format!(" {compound}")));
        if xpath == RESULTS_MARKER_XPATH && !hung {
            Ok(())
        } else {
            Err(eyre::eyre!("timed out waiting for {xpath}"))
        }
    }

    fn inner_text(&mut self, xpath: &str, _timeout: Duration) -> eyre::Result<String> {
        let script = self.script.lock().unwrap();
        script
            .table
            .iter()
            .find(|(label, _)| label_xpath(label) == xpath)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| eyre::eyre!("timed out waiting for {xpath}"))
    }

    fn print_pdf(&mut self) -> eyre::Result<Vec<u8>> {
        Ok(b"%PDF-1.4 scripted".to_vec())
    }

    fn close_page(&mut self) -> eyre::Result<()> {
        let mut script = self.script.lock().unwrap();
        script.events.push("close page".to_string());
        if script.fail_close_page {
            return Err(eyre::eyre!("page already crashed"));
        }
        Ok(())
    }

    fn close_context(&mut self) -> eyre::Result<()> {
        self.record("close context".to_string());
        Ok(())
    }

    fn close_browser(&mut self) -> eyre::Result<()> {
        let mut script = self.script.lock().unwrap();
        script.events.push("close browser".to_string());
        script.active -= 1;
        Ok(())
    }
}
