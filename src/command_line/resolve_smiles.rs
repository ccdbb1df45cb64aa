use crate::command_line::prelude::*;
use crate::config::ResolverConfig;
use crate::pubchem::PubChemClient;
use crate::resolver;

pub const NAME: &str = "resolve-smiles";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Look up SMILES for compound names on PubChem and write batch files")
        .arg(
            Arg::new("input")
                .required(false)
                .long("input")
                .short('i')
                .num_args(1)
                .help("Text file with one compound name per line [default: compounds.txt]"),
        )
        .arg(
            Arg::new("batch-dir")
                .required(false)
                .long("batch-dir")
                .short('d')
                .num_args(1),
        )
        .arg(
            Arg::new("batch-size")
                .required(false)
                .long("batch-size")
                .short('b')
                .num_args(1),
        )
        .arg(
            Arg::new("pubchem-url")
                .required(false)
                .long("pubchem-url")
                .num_args(1),
        )
}

pub fn config(matches: &ArgMatches) -> eyre::Result<ResolverConfig> {
    let mut config = ResolverConfig::default();
    if let Some(input) = matches.get_one::<String>("input") {
        config.input_path = input.into();
    }
    if let Some(batch_dir) = matches.get_one::<String>("batch-dir") {
        config.batch_dir = batch_dir.into();
    }
    if let Some(batch_size) = parse_arg::<usize>(matches, "batch-size")? {
        config.batch_size = batch_size;
    }
    if let Some(url) = matches.get_one::<String>("pubchem-url") {
        config.pubchem_url = url.clone();
    }
    config.validate()?;

    Ok(config)
}

pub async fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let config = config(matches)?;
    let client = PubChemClient::new(&config.pubchem_url)?;

    let summary = resolver::run(&config, &client).await?;
    log::info!(
        "stage 1 complete: {} / {} compounds resolved, {} batch file(s) written",
        summary.resolved,
        summary.requested,
        summary.batch_files.len()
    );

    Ok(())
}
