use fetchstep_core::config::{self, FetchConfig};
use fetchstep_core::logging;

mod cli;

use crate::cli::{failure_exit, CliCommand};

#[tokio::main]
async fn main() {
    let (cfg, cfg_err) = match config::load_or_init() {
        Ok(cfg) => (cfg, None),
        Err(err) => (FetchConfig::default(), Some(err)),
    };

    // Initialize logging as early as possible; fall back to stderr if the log file is unusable.
    if let Err(err) = logging::init_logging(&cfg.logging) {
        logging::init_logging_stderr(&cfg.logging);
        tracing::warn!("file logging unavailable: {:#}", err);
    }
    if let Some(err) = cfg_err {
        tracing::warn!("config unreadable, using defaults: {:#}", err);
    }
    tracing::debug!("loaded config: {:?}", cfg);

    if let Err(err) = CliCommand::run_from_args(&cfg).await {
        let (code, print) = failure_exit(&err);
        if print {
            eprintln!("fetchstep error: {:#}", err);
        }
        std::process::exit(code);
    }
}
