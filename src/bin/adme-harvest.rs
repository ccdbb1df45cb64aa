use adme_harvest::command_line::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = clap::Command::new("adme-harvest")
        .about("PubChem → SwissADME property harvesting")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(resolve_smiles::command())
        .subcommand(extract_adme::command())
        .subcommand(aggregate::command());

    let matches = app.get_matches();

    match matches.subcommand() {
        Some((resolve_smiles::NAME, m)) => resolve_smiles::action(m).await?,
        Some((extract_adme::NAME, m)) => extract_adme::action(m).await?,
        Some((aggregate::NAME, m)) => aggregate::action(m)?,
        Some((other, _)) => Err(eyre::eyre!("can't handle {}", other))?,
        None => Err(eyre::eyre!("no subcommand given"))?,
    }

    Ok(())
}
