//! CLI command definitions and handlers.

pub mod check;
pub mod models;

use clap::{Parser, Subcommand};

/// Deepcheck - Deepfake video detection from facial landmark dynamics
#[derive(Parser)]
#[command(name = "deepcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, block size, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify videos as real or fake
    Check(check::CheckArgs),
    /// Manage the landmark classifier weights
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every video was classified and none is fake.
    Success = 0,
    /// At least one video was classified as fake.
    FakeFound = 1,
    /// The run failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
