//! storygen CLI — render a story template with project context.
//!
//! Composes project context, concept documents matched from the prompt and
//! template includes into one document on stdout.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
