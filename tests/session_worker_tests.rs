mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use adme_harvest::config::ExtractionConfig;
use adme_harvest::swissadme::worker::{
    run_session, SessionWorker, SMILES_INPUT_SELECTOR, SUBMIT_BUTTON_SELECTOR,
};
use adme_harvest::swissadme::{ExtractionResult, Property};
use common::*;

#[test]
fn full_page_yields_every_field() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());
    let launcher = ScriptedLauncher::with_table(swissadme_table());

    let result = run_session(&launcher, &config, "Aspirin", ASPIRIN);

    assert!(result.is_complete());
    assert_eq!(result.compound, "Aspirin");
    assert_eq!(result.smiles, ASPIRIN);
    assert_eq!(result.molecular_weight.as_deref(), Some("180.16 g/mol"));
    assert_eq!(result.tpsa.as_deref(), Some("63.60"));
    assert_eq!(result.lipinski_filter.as_deref(), Some("Yes; 0 violation"));

    assert_eq!(launcher.typed(), vec![format!("{ASPIRIN} Aspirin")]);
    assert!(results_dir.path().join("Aspirin.pdf").exists());

    Ok(())
}

#[test]
fn protocol_runs_in_order_and_releases_everything() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());
    let launcher = ScriptedLauncher::with_table(swissadme_table());

    run_session(&launcher, &config, "Aspirin", ASPIRIN);

    assert_eq!(
        launcher.events(),
        vec![
            format!("launch {}", config.user_agent),
            format!("navigate {}", config.target_url),
            format!("click {SMILES_INPUT_SELECTOR}"),
            format!("click {SUBMIT_BUTTON_SELECTOR}"),
            "close page".to_string(),
            "close context".to_string(),
            "close browser".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn absent_label_only_blanks_that_field() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());

    let mut table = swissadme_table();
    table.remove(Property::LipinskiFilter.label());
    let launcher = ScriptedLauncher::with_table(table);

    let result = run_session(&launcher, &config, "Aspirin", ASPIRIN);

    assert_eq!(result.lipinski_filter, None);
    assert_eq!(result.extracted_count(), 7);
    assert_eq!(result.bioavailability_score.as_deref(), Some("0.85"));

    Ok(())
}

#[test]
fn results_that_never_render_keep_name_and_smiles() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());
    let launcher = ScriptedLauncher::with_table(swissadme_table()).never_render("Caffeine");

    let result = run_session(&launcher, &config, "Caffeine", CAFFEINE);

    assert_eq!(result, ExtractionResult::new("Caffeine", CAFFEINE));
    assert!(!results_dir.path().join("Caffeine.pdf").exists());
    assert!(launcher.events().ends_with(&[
        "close page".to_string(),
        "close context".to_string(),
        "close browser".to_string(),
    ]));

    Ok(())
}

#[test]
fn failed_page_close_still_releases_browser() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());
    let launcher = ScriptedLauncher::with_table(swissadme_table());
    launcher.script.lock().unwrap().fail_close_page = true;

    let result = run_session(&launcher, &config, "Aspirin", ASPIRIN);

    assert!(result.is_complete());
    let events = launcher.events();
    assert!(events.contains(&"close context".to_string()));
    assert!(events.contains(&"close browser".to_string()));

    Ok(())
}

#[test]
fn launch_failure_degrades_to_bare_row() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = fast_config(results_dir.path(), results_dir.path());
    let launcher = ScriptedLauncher::with_table(swissadme_table());
    launcher.script.lock().unwrap().fail_launch = true;

    let result = run_session(&launcher, &config, "Aspirin", ASPIRIN);

    assert_eq!(result, ExtractionResult::new("Aspirin", ASPIRIN));
    Ok(())
}

#[tokio::test]
async fn concurrent_tasks_respect_session_limit() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = Arc::new(fast_config(results_dir.path(), results_dir.path()));
    let launcher = ScriptedLauncher::with_table(swissadme_table());
    let worker = SessionWorker::new(Arc::new(launcher.clone()), config);
    assert_eq!(worker.available_sessions(), 1);

    let mut handles = Vec::new();
    for (name, smiles) in [("Aspirin", ASPIRIN), ("Caffeine", CAFFEINE), ("Ethanol", ETHANOL)] {
        let worker = worker.clone();
        handles.push(tokio::spawn(async move {
            worker.extract(name.to_string(), smiles.to_string()).await
        }));
    }
    for handle in handles {
        assert!(handle.await?.is_complete());
    }

    assert_eq!(launcher.launches(), 3);
    assert_eq!(launcher.max_active(), 1);
    assert_eq!(worker.available_sessions(), 1);

    Ok(())
}

#[tokio::test]
async fn pacing_pause_comes_before_launch() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = ExtractionConfig {
        request_pacing: Duration::from_millis(300),
        ..fast_config(results_dir.path(), results_dir.path())
    };
    let launcher = ScriptedLauncher::with_table(swissadme_table());
    let worker = SessionWorker::new(Arc::new(launcher.clone()), Arc::new(config));

    let started = Instant::now();
    let task = tokio::spawn(async move {
        worker
            .extract("Aspirin".to_string(), ASPIRIN.to_string())
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(launcher.launches(), 0);

    assert!(task.await?.is_complete());
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(launcher.launches(), 1);

    Ok(())
}

#[tokio::test]
async fn pacing_is_paid_while_holding_a_session_slot() -> eyre::Result<()> {
    let results_dir = tempdir::TempDir::new("adme-worker")?;
    let config = ExtractionConfig {
        request_pacing: Duration::from_millis(150),
        ..fast_config(results_dir.path(), results_dir.path())
    };
    let worker = SessionWorker::new(
        Arc::new(ScriptedLauncher::with_table(swissadme_table())),
        Arc::new(config),
    );

    let started = Instant::now();
    let (first, second) = tokio::join!(
        worker.extract("Aspirin".to_string(), ASPIRIN.to_string()),
        worker.extract("Caffeine".to_string(), CAFFEINE.to_string()),
    );

    assert!(first.is_complete() && second.is_complete());
    assert!(started.elapsed() >= Duration::from_millis(300));

    Ok(())
}
