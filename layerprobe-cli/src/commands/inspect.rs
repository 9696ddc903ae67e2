//! `layerprobe inspect` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use layerprobe_artifact::{ArtifactBuilder, InspectionReport, ScannerOptions, cache};
use layerprobe_core::config::{LayerprobeConfig, ScanConfig};
use layerprobe_core::types::ArtifactReference;

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `inspect` command.
///
/// Command-line flags are layered on top of the `[scan]` section, then the
/// tree is inspected and the resulting blob is written to the configured cache.
/// Ctrl-C cancels the inspection before anything is stored.
///
/// # Errors
///
/// - `CliError::Config` for unknown analyzer tags or out-of-range options
/// - `CliError::Inspect` when the inspection fails
/// - `CliError::Cancelled` when interrupted
pub async fn execute(
    args: InspectArgs,
    mut config: LayerprobeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    apply_args(&mut config.scan, &args);
    let options = ScannerOptions::from_core(&config.scan)?;
    let cache = cache::from_config(&config.cache)
        .map_err(|e| CliError::Config(format!("cache: {e}")))?;

    let artifact = ArtifactBuilder::new(&args.path, cache)
        .options(options)
        .build()?;

    info!(
        root = %args.path.display(),
        backend = %config.cache.backend,
        analyzers = artifact.active_analyzers().len(),
        "starting inspection"
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling inspection");
                cancel.cancel();
            }
        })
    };

    let result = artifact.inspect_with_report(&cancel).await;
    interrupt.abort();
    let (reference, report) = result?;

    writer.render(&InspectOutput {
        reference,
        root: args.path.display().to_string(),
        report,
    })
}

/// Layer command-line flags over the `[scan]` config section.
///
/// List flags extend the configured lists; scalar flags replace them.
fn apply_args(scan: &mut ScanConfig, args: &InspectArgs) {
    scan.disabled_analyzers.extend(args.disable.iter().cloned());
    scan.skip_files.extend(args.skip_files.iter().cloned());
    scan.skip_dirs.extend(args.skip_dirs.iter().cloned());
    if args.follow_symlinks {
        scan.follow_symlinks = true;
    }
    if let Some(concurrency) = args.concurrency {
        scan.concurrency = concurrency;
    }
    if let Some(max) = args.max_file_size {
        scan.max_file_size = max;
    }
    if let Some(name) = &args.name {
        scan.artifact_name = name.clone();
    }
}

/// Inspection result payload.
#[derive(Serialize)]
pub struct InspectOutput {
    #[serde(flatten)]
    pub reference: ArtifactReference,
    pub root: String,
    pub report: InspectionReport,
}

impl Render for InspectOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Inspection Complete".bold())?;
        writeln!(w, "  Name:      {}", self.reference.name)?;
        writeln!(w, "  Root:      {}", self.root)?;
        writeln!(w, "  Blob ID:   {}", self.reference.id.green())?;
        writeln!(w, "  Diff ID:   {}", self.report.diff_id)?;
        writeln!(
            w,
            "  Files:     {} walked, {} analyzed",
            self.report.files_walked, self.report.files_analyzed
        )?;
        if self.report.files_vanished > 0 || self.report.walk_errors > 0 {
            writeln!(
                w,
                "  Skipped:   {} vanished, {} unreadable entries",
                self.report.files_vanished, self.report.walk_errors
            )?;
        }

        if !self.report.failures.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "{}",
                format!("Analyzer Failures ({})", self.report.failures.len())
                    .yellow()
                    .bold()
            )?;
            for failure in &self.report.failures {
                writeln!(
                    w,
                    "  {:<12} {}: {}",
                    failure.analyzer.as_str(),
                    failure.path,
                    failure.reason
                )?;
            }
        }
        Ok(())
    }
}
