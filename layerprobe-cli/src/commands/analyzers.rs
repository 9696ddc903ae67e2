//! `layerprobe analyzers` command handler

use std::collections::HashSet;
use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use layerprobe_analyzer::{AnalyzerGroup, AnalyzerRegistry, AnalyzerType};
use layerprobe_artifact::ScannerOptions;
use layerprobe_core::config::LayerprobeConfig;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyzers` command.
///
/// Lists every registered analyzer and whether the `[scan]` section disables it.
pub fn execute(config: &LayerprobeConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let options = ScannerOptions::from_core(&config.scan)?;
    let registry = AnalyzerRegistry::with_defaults();
    writer.render(&AnalyzerList::new(
        &registry,
        &options.disabled_analyzers.into_iter().collect(),
    ))
}

/// Registered analyzers payload.
#[derive(Serialize)]
pub struct AnalyzerList {
    pub analyzers: Vec<AnalyzerEntry>,
}

/// One registered analyzer.
#[derive(Serialize)]
pub struct AnalyzerEntry {
    #[serde(rename = "type")]
    pub analyzer_type: AnalyzerType,
    pub group: AnalyzerGroup,
    pub enabled: bool,
}

impl AnalyzerList {
    fn new(registry: &AnalyzerRegistry, disabled: &HashSet<AnalyzerType>) -> Self {
        let mut analyzers: Vec<AnalyzerEntry> = registry
            .types()
            .into_iter()
            .map(|t| AnalyzerEntry {
                analyzer_type: t,
                group: t.group(),
                enabled: !disabled.contains(&t),
            })
            .collect();
        analyzers.sort_by_key(|e| (e.group, e.analyzer_type.as_str()));
        Self { analyzers }
    }
}

impl Render for AnalyzerList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Analyzers".bold())?;
        writeln!(w, "  {:<12} {:<9} {}", "TYPE", "GROUP", "STATUS")?;
        for entry in &self.analyzers {
            let status = if entry.enabled {
                "enabled".green()
            } else {
                "disabled".red()
            };
            writeln!(
                w,
                "  {:<12} {:<9} {}",
                entry.analyzer_type.as_str(),
                entry.group.to_string(),
                status
            )?;
        }
        Ok(())
    }
}
