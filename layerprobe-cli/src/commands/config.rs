//! `layerprobe config` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use layerprobe_core::config::LayerprobeConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed, or holds invalid values.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match LayerprobeConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Shows the effective configuration (file + env overrides + defaults).
/// A missing file falls back to defaults, matching what `inspect` would use.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = LayerprobeConfig::load_or_default(config_path).await?;

    let (config_toml, config) = match section.as_deref() {
        None => render_section(&config)?,
        Some("general") => render_section(&config.general)?,
        Some("scan") => render_section(&config.scan)?,
        Some("cache") => render_section(&config.cache)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, scan, cache)"
            )));
        }
    };

    let report = ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml,
        config,
    };

    writer.render(&report)?;

    Ok(())
}

/// Render a config section as TOML text plus a JSON value.
fn render_section<T: Serialize>(section: &T) -> Result<(String, serde_json::Value), CliError> {
    let text = toml::to_string_pretty(section)
        .unwrap_or_else(|e| format!("(serialization error: {e})"));
    Ok((text, serde_json::to_value(section)?))
}

/// Config validation result.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{} {}", "✓".green(), format!("{} is valid", self.source).bold())?;
        } else {
            writeln!(w, "{} {}", "✗".red(), format!("{} is invalid", self.source).bold())?;
            for error in &self.errors {
                writeln!(w, "  - {}", error.red())?;
            }
        }
        Ok(())
    }
}

/// Effective configuration payload.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
    pub config: serde_json::Value,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.section {
            Some(section) => writeln!(w, "# {} [{}]", self.source, section)?,
            None => writeln!(w, "# {}", self.source)?,
        }
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
