//! CLI for fetchstep.

mod commands;
mod console;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fetchstep_core::config::FetchConfig;
use fetchstep_core::AcquireError;
use std::path::PathBuf;

use commands::{run_checksum, run_fetch};

/// Conventional exit status for a run interrupted by SIGINT.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit status for a failed run, and whether the error still needs printing.
/// Exhaustion was already reported through the console sink.
pub fn failure_exit(err: &anyhow::Error) -> (i32, bool) {
    match err.downcast_ref::<AcquireError>() {
        Some(e) if e.is_cancelled() => (EXIT_INTERRUPTED, false),
        Some(AcquireError::DownloadFailed { .. }) => (1, false),
        _ => (1, true),
    }
}

/// Top-level CLI for fetchstep.
#[derive(Debug, Parser)]
#[command(name = "fetchstep")]
#[command(about = "fetchstep: fetch an artifact from the first working source, verified and cancellable", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Acquire a file from the first candidate source that works.
    Fetch(FetchArgs),

    /// Compute the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Digest algorithm: md5, sha1, sha256 or sha512.
        #[arg(long = "type", default_value = "sha256", value_name = "T")]
        kind: String,
    },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Candidate sources (URLs or local paths), tried in order.
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Expected digest, hex encoded.
    #[arg(long, value_name = "HEX")]
    pub checksum: Option<String>,

    /// Digest algorithm for --checksum. Inferred from the digest length when omitted.
    #[arg(long, value_name = "T")]
    pub checksum_type: Option<String>,

    /// Write to this path instead of the cache.
    #[arg(long, value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// Force this extension on the cached file (e.g. "iso").
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Name used in progress and error messages.
    #[arg(long, default_value = "file", value_name = "TEXT")]
    pub description: String,

    /// Copy local sources into the cache instead of using them in place.
    #[arg(long)]
    pub copy_local: bool,
}

impl CliCommand {
    pub async fn run_from_args(cfg: &FetchConfig) -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch(args) => {
                let path = run_fetch(cfg, args).await?;
                println!("{}", path.display());
            }
            CliCommand::Checksum { path, kind } => run_checksum(&path, &kind)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
