use crate::aggregate::{aggregate, AggregateOutcome};
use crate::command_line::prelude::*;
use crate::config::AggregateConfig;

pub const NAME: &str = "aggregate";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Merge batch result checkpoints into the final report")
        .arg(
            Arg::new("results-dir")
                .required(false)
                .long("results-dir")
                .short('r')
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .required(false)
                .long("output")
                .short('o')
                .num_args(1),
        )
}

pub fn config(matches: &ArgMatches) -> AggregateConfig {
    let mut config = match matches.get_one::<String>("results-dir") {
        Some(results_dir) => AggregateConfig::for_results_dir(results_dir),
        None => AggregateConfig::default(),
    };
    if let Some(output) = matches.get_one::<String>("output") {
        config.final_output = output.into();
    }
    config
}

/// `NoData` is a failed run from the operator's point of view.
pub fn report(outcome: AggregateOutcome) -> eyre::Result<()> {
    match outcome {
        AggregateOutcome::Written {
            path,
            rows,
            sources,
        } => {
            log::info!(
                "final report saved to {} ({} rows from {} batch file(s))",
                path.display(),
                rows,
                sources
            );
            Ok(())
        }
        AggregateOutcome::NoData => Err(eyre::eyre!(
            "no data to aggregate; every batch result file was missing or empty"
        )),
    }
}

pub fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let config = config(matches);
    report(aggregate(&config)?)
}
