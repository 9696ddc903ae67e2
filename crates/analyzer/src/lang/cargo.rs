//! Cargo.lock 분석기
//!
//! ```toml
//! version = 3
//!
//! [[package]]
//! name = "serde"
//! version = "1.0.204"
//! source = "registry+https://github.com/rust-lang/crates.io-index"
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;

use layerprobe_core::types::Library;

use crate::analyzer::{AnalysisInput, Analyzer, base_name};
use crate::error::AnalyzerError;
use crate::types::{AnalyzerType, FileFinding};

/// 애플리케이션 타입 이름
pub const APP_TYPE_CARGO: &str = "cargo";

const LOCKFILE_NAME: &str = "Cargo.lock";

/// Cargo.lock 분석기
pub struct CargoLockAnalyzer;

#[derive(Deserialize)]
struct CargoLockFile {
    #[serde(default)]
    package: Vec<CargoPackageEntry>,
}

#[derive(Deserialize)]
struct CargoPackageEntry {
    name: String,
    version: String,
}

impl Analyzer for CargoLockAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Cargo
    }

    fn required(&self, file_path: &str) -> bool {
        base_name(file_path) == LOCKFILE_NAME
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let libraries = parse_lockfile(&content, input.file_path)?;
        if libraries.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileFinding::Application {
            app_type: APP_TYPE_CARGO.to_owned(),
            libraries,
        }))
    }
}

/// lockfile 내용을 의존성 목록으로 변환합니다.
pub fn parse_lockfile(content: &str, file_path: &str) -> Result<Vec<Library>, AnalyzerError> {
    let lock_file: CargoLockFile = toml::from_str(content)
        .map_err(|e| AnalyzerError::parse(AnalyzerType::Cargo, file_path, e.to_string()))?;

    let libraries: BTreeSet<Library> = lock_file
        .package
        .into_iter()
        .map(|p| Library {
            name: p.name,
            version: p.version,
        })
        .collect();

    Ok(libraries.into_iter().collect())
}
