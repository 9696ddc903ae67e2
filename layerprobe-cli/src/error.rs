//! CLI-specific error types and exit code mapping

use layerprobe_artifact::{ArtifactError, CacheError};
use layerprobe_core::error::LayerprobeError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The inspection itself failed.
    #[error("{0}")]
    Inspect(String),

    /// The inspection was cancelled (Ctrl-C).
    #[error("inspection cancelled")]
    Cancelled,

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from layerprobe-core.
    #[error("{0}")]
    Core(#[from] LayerprobeError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 3    | Inspection failed        |
    /// | 4    | Inspection cancelled     |
    /// | 10   | IO error                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LayerprobeError::Config(_)) => 2,
            Self::Inspect(_) => 3,
            Self::Cancelled => 4,
            Self::Io(_) | Self::Core(LayerprobeError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ArtifactError> for CliError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::Cancelled => Self::Cancelled,
            ArtifactError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            other => Self::Inspect(other.to_string()),
        }
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        Self::Command(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerprobe_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        assert_eq!(CliError::Config("bad".to_owned()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = LayerprobeError::Config(ConfigError::FileNotFound {
            path: "layerprobe.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_inspect_error() {
        let err: CliError = ArtifactError::RootInaccessible {
            path: "/nonexistent".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("no such file or directory"));
    }

    #[test]
    fn test_exit_code_cancelled() {
        let err: CliError = ArtifactError::Cancelled.into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_artifact_config_error() {
        let err: CliError = ArtifactError::config("concurrency", "must be 1-256").into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "configuration error: concurrency: must be 1-256"
        );
    }

    #[test]
    fn test_exit_code_io_error() {
        let err = CliError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        assert_eq!(CliError::Command("x".to_owned()).exit_code(), 1);
    }

    #[test]
    fn test_cache_write_message_survives() {
        let err: CliError = ArtifactError::CacheWrite {
            blob_id: "sha256:abc".to_owned(),
            source: CacheError::Backend("disk full".to_owned()),
        }
        .into();
        assert!(err.to_string().starts_with("failed to store blob"));
        assert_eq!(err.exit_code(), 3);
    }
}
