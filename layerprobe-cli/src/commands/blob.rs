//! `layerprobe blob` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use layerprobe_artifact::cache;
use layerprobe_core::config::LayerprobeConfig;
use layerprobe_core::types::BlobInfo;

use crate::cli::BlobArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `blob` command.
///
/// Reads a stored blob from the configured cache. With the memory backend
/// nothing survives between runs, so lookups only succeed against `fs`.
///
/// # Errors
///
/// Returns `CliError::Command` if the id is malformed or no blob is stored under it.
pub async fn execute(
    args: BlobArgs,
    config: &LayerprobeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let cache = cache::from_config(&config.cache)?;
    debug!(id = %args.id, backend = %config.cache.backend, "looking up blob");

    let id = args.id.clone();
    let blob = tokio::task::spawn_blocking(move || cache.get_blob(&id))
        .await
        .map_err(|e| CliError::Command(format!("blob lookup task failed: {e}")))??;

    match blob {
        Some(blob) => writer.render(&BlobOutput { id: args.id, blob }),
        None => Err(CliError::Command(format!("blob not found: {}", args.id))),
    }
}

/// Stored blob payload.
#[derive(Serialize)]
pub struct BlobOutput {
    pub id: String,
    #[serde(flatten)]
    pub blob: BlobInfo,
}

impl Render for BlobOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Blob".bold())?;
        writeln!(w, "  ID:        {}", self.id)?;
        writeln!(w, "  Diff ID:   {}", self.blob.diff_id)?;
        writeln!(w, "  Schema:    v{}", self.blob.schema_version)?;
        match &self.blob.os {
            Some(os) => writeln!(w, "  OS:        {os}")?,
            None => writeln!(w, "  OS:        {}", "unknown".dimmed())?,
        }

        for info in &self.blob.package_infos {
            writeln!(w)?;
            writeln!(
                w,
                "{} ({} packages)",
                info.file_path.bold(),
                info.packages.len()
            )?;
            for pkg in &info.packages {
                if pkg.src_name != pkg.name || pkg.src_version != pkg.version {
                    writeln!(
                        w,
                        "  {:<32} {:<20} (src {}@{})",
                        pkg.name, pkg.version, pkg.src_name, pkg.src_version
                    )?;
                } else {
                    writeln!(w, "  {:<32} {}", pkg.name, pkg.version)?;
                }
            }
        }

        for app in &self.blob.applications {
            writeln!(w)?;
            writeln!(
                w,
                "{} [{}] ({} libraries)",
                app.file_path.bold(),
                app.app_type,
                app.libraries.len()
            )?;
            for lib in &app.libraries {
                writeln!(w, "  {:<32} {}", lib.name, lib.version)?;
            }
        }

        if !self.blob.configs.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Config Files".bold())?;
            for cfg in &self.blob.configs {
                writeln!(w, "  {:<12} {}", cfg.config_type, cfg.file_path)?;
            }
        }

        if self.blob.has_no_findings() {
            writeln!(w, "  {}", "(no findings)".dimmed())?;
        }
        Ok(())
    }
}
