use fs_err as fs;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::Config;
use crate::wire::{CompletionRequest, CompletionResponse};

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

/// Stderr fmt subscriber; `RUST_LOG` wins over the `--debug` default.
pub fn init_tracing(debug: bool) {
    let default = if debug { "vibe_trip=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".vibe_trip").join("tx").join(tx.to_string())
}

pub fn save_stage(
    stage: &str,
    req: &CompletionRequest,
    resp: &CompletionResponse,
    tx: Uuid,
    cfg: &Config,
) -> anyhow::Result<Option<SavedPaths>> {
    if !cfg.save_request && !cfg.save_response {
        return Ok(None);
    }
    let dir = tx_dir(Path::new(&cfg.out_dir), tx);
    fs::create_dir_all(&dir)?;

    let mut request_path = None;
    let mut response_path = None;

    if cfg.save_request {
        let p = dir.join(format!("{stage}.request.json"));
        fs::write(&p, to_string_pretty(req)?)?;
        request_path = Some(p);
    }

    if cfg.save_response {
        let p = dir.join(format!("{stage}.response.json"));
        fs::write(&p, to_string_pretty(resp)?)?;
        response_path = Some(p);
    }

    Ok(Some(SavedPaths { dir, request: request_path, response: response_path }))
}

pub fn trace_saved_paths(stage: &str, saved: &SavedPaths) {
    tracing::debug!(stage, dir = %saved.dir.display(), "artifacts directory");
    match &saved.request {
        Some(p) => tracing::debug!(stage, path = %p.display(), "request saved"),
        None => tracing::debug!(stage, "request not saved (flag off)"),
    }
    match &saved.response {
        Some(p) => tracing::debug!(stage, path = %p.display(), "response saved"),
        None => tracing::debug!(stage, "response not saved (flag off)"),
    }
}
