//! Rill command-line tool
//!
//! Runs a program file or an inline snippet by driving a plugin handle end
//! to end: start, wait for completion, report the terminal error.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rill_runtime::Plugin;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rill")]
#[command(about = "Rill scripting runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Rill file
    Run {
        /// Input file
        file: String,
    },

    /// Evaluate an inline program
    Eval {
        /// Program text
        code: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let body = match cli.command {
        Commands::Run { file } => {
            std::fs::read_to_string(&file).with_context(|| format!("reading {}", file))?
        }
        Commands::Eval { code } => code,
    };

    let plugin = Plugin::new(body);
    plugin.start().context("starting execution")?;
    while !plugin.wait_completion(Duration::from_millis(200)) {}

    if let Some(message) = plugin.error() {
        bail!(message);
    }
    Ok(())
}
