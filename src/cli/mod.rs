//! CLI module for PMP LLM Chain
//!
//! Provides subcommands:
//! - `run`: load a chain definition, run it and print the report

pub mod run;

use clap::{Parser, Subcommand};

/// PMP LLM Chain - run linked model and function steps
#[derive(Parser)]
#[command(name = "pmp-llm-chain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a chain definition and print the report as JSON
    Run(run::RunArgs),
}
