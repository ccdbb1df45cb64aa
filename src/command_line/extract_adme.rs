use std::time::Duration;

use crate::aggregate::aggregate;
use crate::command_line::aggregate::report;
use crate::command_line::prelude::*;
use crate::config::{AggregateConfig, ExtractionConfig};
use crate::orchestrator::Orchestrator;
use crate::swissadme::session::ChromeLauncher;

pub const NAME: &str = "extract-adme";

fn value(id: &'static str) -> Arg {
    Arg::new(id).required(false).long(id).num_args(1)
}

pub fn command() -> Command {
    Command::new(NAME)
        .about("Run every batch through SwissADME, then build the final report")
        .arg(value("batch-dir").short('d'))
        .arg(value("results-dir").short('r'))
        .arg(value("output").short('o'))
        .arg(value("max-sessions").short('c'))
        .arg(value("cooldown-secs"))
        .arg(value("pacing-secs"))
        .arg(value("page-timeout-secs"))
        .arg(value("field-timeout-secs"))
        .arg(value("typing-delay-ms"))
        .arg(value("target-url"))
        .arg(value("user-agent"))
        .arg(value("chrome-path"))
        .arg(
            Arg::new("headful")
                .long("headful")
                .action(ArgAction::SetTrue)
                .help("Show the browser window"),
        )
        .arg(
            Arg::new("skip-aggregate")
                .long("skip-aggregate")
                .action(ArgAction::SetTrue)
                .help("Leave the per-batch checkpoints in place"),
        )
}

pub fn config(matches: &ArgMatches) -> eyre::Result<ExtractionConfig> {
    let mut config = ExtractionConfig::default();

    if let Some(batch_dir) = matches.get_one::<String>("batch-dir") {
        config.batch_dir = batch_dir.into();
    }
    if let Some(results_dir) = matches.get_one::<String>("results-dir") {
        config.results_dir = results_dir.into();
    }
    if let Some(sessions) = parse_arg::<usize>(matches, "max-sessions")? {
        config.max_concurrent_sessions = sessions;
    }
    if let Some(secs) = parse_arg::<u64>(matches, "cooldown-secs")? {
        config.batch_cooldown = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_arg::<u64>(matches, "pacing-secs")? {
        config.request_pacing = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_arg::<u64>(matches, "page-timeout-secs")? {
        config.page_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_arg::<u64>(matches, "field-timeout-secs")? {
        config.field_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = parse_arg::<u64>(matches, "typing-delay-ms")? {
        config.typing_delay = Duration::from_millis(ms);
    }
    if let Some(url) = matches.get_one::<String>("target-url") {
        config.target_url = url.clone();
    }
    if let Some(user_agent) = matches.get_one::<String>("user-agent") {
        config.user_agent = user_agent.clone();
    }
    config.validate()?;

    Ok(config)
}

pub async fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let config = config(matches)?;
    let launcher = ChromeLauncher::new(
        matches.get_one::<String>("chrome-path").map(Into::into),
        matches.get_flag("headful"),
    );

    let mut aggregate_config = AggregateConfig::for_results_dir(&config.results_dir);
    if let Some(output) = matches.get_one::<String>("output") {
        aggregate_config.final_output = output.into();
    }

    log::info!(
        "concurrency limit: {} browser session(s)",
        config.max_concurrent_sessions
    );
    let orchestrator = Orchestrator::new(config, launcher)?;
    orchestrator.run().await?;

    if matches.get_flag("skip-aggregate") {
        log::info!("skipping aggregation; batch checkpoints left in place");
        return Ok(());
    }

    report(aggregate(&aggregate_config)?)
}
