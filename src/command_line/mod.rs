use std::str::FromStr;

pub mod aggregate;
pub mod extract_adme;
pub mod resolve_smiles;

pub mod prelude {
    pub use clap::{Arg, ArgAction, ArgMatches, Command};

    pub use super::parse_arg;
}

/// Reads an optional string argument and parses it, naming the flag on failure.
pub fn parse_arg<T>(matches: &clap::ArgMatches, id: &str) -> eyre::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .get_one::<String>(id)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| eyre::eyre!("invalid value {:?} for --{}: {}", raw, id, e))
        })
        .transpose()
}
