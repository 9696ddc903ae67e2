//! apk 설치 DB 분석기
//!
//! ```text
//! P:musl
//! V:1.1.24-r2
//! o:musl
//! ```
//!
//! `P`는 패키지 이름, `V`는 버전, `o`는 소스(origin) 패키지 이름입니다.
//! 소스 버전은 바이너리 버전과 같습니다.

use tracing::debug;

use layerprobe_core::types::Package;

use crate::analyzer::{AnalysisInput, Analyzer};
use crate::error::AnalyzerError;
use crate::pkg::stanzas;
use crate::types::{AnalyzerType, FileFinding};

const REQUIRED_FILE: &str = "lib/apk/db/installed";

/// apk 설치 DB 분석기
pub struct ApkAnalyzer;

impl Analyzer for ApkAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Apk
    }

    fn required(&self, file_path: &str) -> bool {
        file_path == REQUIRED_FILE
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let packages = parse_installed(&content, input.file_path)?;
        if packages.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileFinding::Packages(packages)))
    }
}

/// 설치 DB 내용을 패키지 목록으로 변환합니다.
pub fn parse_installed(content: &str, file_path: &str) -> Result<Vec<Package>, AnalyzerError> {
    let mut packages = Vec::new();

    for stanza in stanzas(content) {
        let mut name = None;
        let mut version = None;
        let mut origin = None;

        for line in stanza {
            let Some((key, value)) = line.split_once(':') else {
                return Err(AnalyzerError::parse(
                    AnalyzerType::Apk,
                    file_path,
                    format!("malformed line: {line:?}"),
                ));
            };
            match key {
                "P" => name = Some(value.trim()),
                "V" => version = Some(value.trim()),
                "o" => origin = Some(value.trim()),
                _ => {}
            }
        }

        match (name, version) {
            (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
                let mut pkg = Package::new(name, version);
                if let Some(origin) = origin.filter(|o| !o.is_empty()) {
                    pkg.src_name = origin.to_owned();
                }
                packages.push(pkg);
            }
            _ => debug!(path = file_path, "apk stanza without name or version, skipping"),
        }
    }

    Ok(packages)
}
