//! `fetchstep fetch <SOURCE>...` – acquire one file with source fallback.

use anyhow::Result;
use fetchstep_core::cache::{Cache, FileCache};
use fetchstep_core::config::FetchConfig;
use fetchstep_core::transport::{DefaultTransport, Transport};
use fetchstep_core::ui::Ui;
use fetchstep_core::{Acquirer, AcquisitionRequest, CancelToken};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::console::ConsoleUi;
use crate::cli::FetchArgs;

const RESULT_KEY: &str = "path";

pub fn build_request(cfg: &FetchConfig, args: FetchArgs) -> AcquisitionRequest {
    let mut request = AcquisitionRequest::new(&args.description, RESULT_KEY, args.sources)
        .with_copy_local(args.copy_local || cfg.copy_local_files);
    if let Some(checksum) = args.checksum {
        request = request.with_checksum(args.checksum_type.as_deref().unwrap_or(""), &checksum);
    }
    if let Some(target) = args.target {
        request = request.with_target_path(target);
    }
    if let Some(ext) = args.extension {
        request = request.with_extension(&ext);
    }
    request
}

pub async fn run_fetch(cfg: &FetchConfig, args: FetchArgs) -> Result<PathBuf> {
    let cache_dir = cfg.resolved_cache_dir()?;
    tracing::debug!(dir = %cache_dir.display(), "using cache");

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            on_interrupt.cancel();
        }
    });

    let acquirer = Acquirer::new(
        build_request(cfg, args),
        Arc::new(FileCache::new(cache_dir)) as Arc<dyn Cache>,
        Arc::new(DefaultTransport::from_config(cfg)) as Arc<dyn Transport>,
        Arc::new(ConsoleUi) as Arc<dyn Ui>,
        cfg.acquire_settings(),
    );
    Ok(acquirer.acquire(&cancel).await?)
}
