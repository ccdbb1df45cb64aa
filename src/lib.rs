#![deny(clippy::print_stdout)]

pub mod aggregate;
pub mod batching;
pub mod command_line;
pub mod config;
pub mod orchestrator;
pub mod pubchem;
pub mod resolver;
pub mod swissadme;
