//! Diagnostic log setup for the `layerprobe` binary.
//!
//! stdout carries only the rendered command result, so
//! `layerprobe inspect <dir> --output json | jq` works at any log level.
//! Every log line goes to stderr.
//!
//! The level filter comes from `RUST_LOG` when set, otherwise from
//! `[general] log_level` (which `--log-level` has already overwritten in `main`).

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use layerprobe_core::config::GeneralConfig;

/// Install the stderr subscriber for this process.
///
/// `log_format` selects `"json"` (one object per line, for collectors) or
/// `"pretty"` (multi-line, for a terminal). Any other value is rejected
/// before a subscriber is installed, so the caller can warn and go on
/// without logs.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format.as_str() {
        "json" => registry.with(stderr_layer.json()).try_init(),
        "pretty" => registry.with(stderr_layer.pretty()).try_init(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };
    installed.with_context(|| format!("failed to install {} log output", config.log_format))
}
