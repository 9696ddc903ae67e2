//! freedesktop `os-release` 분석기
//!
//! `ID`를 OS 계열로, `VERSION_ID`를 버전으로 사용합니다.
//!
//! ```text
//! NAME="Ubuntu"
//! ID=ubuntu
//! VERSION_ID="22.04"
//! ```

use std::collections::HashMap;

use tracing::debug;

use layerprobe_core::types::Os;

use crate::analyzer::{AnalysisInput, Analyzer};
use crate::error::AnalyzerError;
use crate::types::{AnalyzerType, FileFinding};

const REQUIRED_FILES: [&str; 2] = ["etc/os-release", "usr/lib/os-release"];

/// `os-release` 분석기
pub struct OsReleaseAnalyzer;

impl Analyzer for OsReleaseAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::OsRelease
    }

    fn required(&self, file_path: &str) -> bool {
        REQUIRED_FILES.contains(&file_path)
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let fields = parse_fields(&content);

        let Some(id) = fields.get("ID") else {
            debug!(path = input.file_path, "os-release without ID");
            return Ok(None);
        };
        let Some(family) = family_for_id(id) else {
            debug!(path = input.file_path, id = id.as_str(), "unsupported os-release ID");
            return Ok(None);
        };
        let version = fields.get("VERSION_ID").map(String::as_str).unwrap_or("");
        if version.is_empty() {
            debug!(path = input.file_path, id = id.as_str(), "os-release without VERSION_ID");
            return Ok(None);
        }

        Ok(Some(FileFinding::Os(Os::new(family, version))))
    }
}

/// `KEY=VALUE` 줄을 파싱합니다. 값의 따옴표는 제거합니다.
fn parse_fields(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_owned(), value.to_owned())
        })
        .collect()
}

/// `ID` 값을 OS 계열 이름으로 변환합니다.
fn family_for_id(id: &str) -> Option<&'static str> {
    match id {
        "alpine" => Some("alpine"),
        "debian" => Some("debian"),
        "ubuntu" => Some("ubuntu"),
        "centos" => Some("centos"),
        "rhel" => Some("redhat"),
        "fedora" => Some("fedora"),
        "amzn" => Some("amazon"),
        "photon" => Some("photon"),
        "ol" => Some("oracle"),
        id if id.starts_with("opensuse") || id == "sles" => Some("opensuse"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> Option<FileFinding> {
        let mut reader = content.as_bytes();
        OsReleaseAnalyzer
            .analyze(AnalysisInput::new(
                "etc/os-release",
                &mut reader,
                content.len() as u64,
            ))
            .unwrap()
    }

    #[test]
    fn required_paths() {
        assert!(OsReleaseAnalyzer.required("etc/os-release"));
        assert!(OsReleaseAnalyzer.required("usr/lib/os-release"));
        assert!(!OsReleaseAnalyzer.required("opt/etc/os-release"));
    }

    #[test]
    fn parses_ubuntu() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nVERSION_ID=\"22.04\"\n";
        assert_eq!(
            run(content),
            Some(FileFinding::Os(Os::new("ubuntu", "22.04")))
        );
    }

    #[test]
    fn maps_rhel_to_redhat() {
        let content = "ID='rhel'\nVERSION_ID='9.3'\n";
        assert_eq!(run(content), Some(FileFinding::Os(Os::new("redhat", "9.3"))));
    }

    #[test]
    fn maps_opensuse_variants() {
        let content = "ID=\"opensuse-leap\"\nVERSION_ID=\"15.5\"\n";
        assert_eq!(
            run(content),
            Some(FileFinding::Os(Os::new("opensuse", "15.5")))
        );
    }

    #[test]
    fn unknown_id_yields_nothing() {
        assert_eq!(run("ID=plan9\nVERSION_ID=4\n"), None);
    }

    #[test]
    fn missing_version_yields_nothing() {
        assert_eq!(run("ID=debian\n# comment\n"), None);
    }
}
