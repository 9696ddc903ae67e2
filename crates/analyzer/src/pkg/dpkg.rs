//! dpkg status DB 분석기
//!
//! ```text
//! Package: libc6
//! Status: install ok installed
//! Source: glibc (2.31-13)
//! Version: 2.31-13+deb11u5
//! ```
//!
//! `Status`가 `installed`로 끝나는 스탠자만 설치된 패키지로 봅니다.
//! `Source`에 버전이 없으면 바이너리 버전을 소스 버전으로 씁니다.

use tracing::debug;

use layerprobe_core::types::Package;

use crate::analyzer::{AnalysisInput, Analyzer};
use crate::error::AnalyzerError;
use crate::pkg::stanzas;
use crate::types::{AnalyzerType, FileFinding};

const REQUIRED_FILE: &str = "var/lib/dpkg/status";

/// dpkg status DB 분석기
pub struct DpkgAnalyzer;

impl Analyzer for DpkgAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Dpkg
    }

    fn required(&self, file_path: &str) -> bool {
        file_path == REQUIRED_FILE
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let packages = parse_status(&content, input.file_path)?;
        if packages.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileFinding::Packages(packages)))
    }
}

/// status DB 내용을 설치된 패키지 목록으로 변환합니다.
pub fn parse_status(content: &str, file_path: &str) -> Result<Vec<Package>, AnalyzerError> {
    let mut packages = Vec::new();

    for stanza in stanzas(content) {
        let mut name = None;
        let mut version = None;
        let mut status = None;
        let mut source = None;

        for line in stanza {
            // 여러 줄 값(Description 등)의 연속 줄
            if line.starts_with(' ') || line.starts_with('\t') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(AnalyzerError::parse(
                    AnalyzerType::Dpkg,
                    file_path,
                    format!("malformed line: {line:?}"),
                ));
            };
            let value = value.trim();
            match key {
                "Package" => name = Some(value),
                "Version" => version = Some(value),
                "Status" => status = Some(value),
                "Source" => source = Some(value),
                _ => {}
            }
        }

        // Status: "<want> <flag> <status>", 상태 토큰이 정확히 installed인 것만
        if status.is_some_and(|s| s.split_whitespace().next_back() != Some("installed")) {
            continue;
        }

        let (Some(name), Some(version)) = (name, version) else {
            debug!(path = file_path, "dpkg stanza without name or version, skipping");
            continue;
        };

        let mut pkg = Package::new(name, version);
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            let (src_name, src_version) = parse_source(source);
            pkg.src_name = src_name.to_owned();
            if let Some(src_version) = src_version {
                pkg.src_version = src_version.to_owned();
            }
        }
        packages.push(pkg);
    }

    Ok(packages)
}

/// `Source: glibc (2.31-13)` 형식을 (이름, 버전)으로 나눕니다.
fn parse_source(source: &str) -> (&str, Option<&str>) {
    match source.split_once('(') {
        Some((name, rest)) => {
            let version = rest.trim_end().trim_end_matches(')').trim();
            let version = (!version.is_empty()).then_some(version);
            (name.trim(), version)
        }
        None => (source.trim(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STATUS: &str = "\
Package: libc6
Status: install ok installed
Priority: optional
Source: glibc (2.31-13)
Version: 2.31-13+deb11u5
Description: GNU C Library: Shared libraries
 Contains the standard libraries that are used by nearly all programs on
 the system.

Package: bash
Status: install ok installed
Version: 5.1-2+deb11u1

Package: removed-pkg
Status: deinstall ok config-files
Version: 1.0
";

    #[test]
    fn required_only_exact_path() {
        assert!(DpkgAnalyzer.required("var/lib/dpkg/status"));
        assert!(!DpkgAnalyzer.required("var/lib/dpkg/status-old"));
    }

    #[test]
    fn parses_installed_packages_only() {
        let packages = parse_status(SAMPLE_STATUS, REQUIRED_FILE).unwrap();
        assert_eq!(packages.len(), 2);

        let libc = &packages[0];
        assert_eq!(libc.name, "libc6");
        assert_eq!(libc.version, "2.31-13+deb11u5");
        assert_eq!(libc.src_name, "glibc");
        assert_eq!(libc.src_version, "2.31-13");

        assert_eq!(packages[1], Package::new("bash", "5.1-2+deb11u1"));
    }

    #[test]
    fn source_without_version_keeps_binary_version() {
        let content = "Package: libssl1.1\nStatus: install ok installed\nSource: openssl\nVersion: 1.1.1n-0\n";
        let packages = parse_status(content, REQUIRED_FILE).unwrap();
        assert_eq!(packages[0].src_name, "openssl");
        assert_eq!(packages[0].src_version, "1.1.1n-0");
    }

    #[test]
    fn half_installed_and_unpacked_are_skipped() {
        let content = "\
Package: foo
Status: install ok half-installed
Version: 1.0

Package: bar
Status: install ok unpacked
Version: 2.0

Package: baz
Status: hold ok installed
Version: 3.0
";
        let packages = parse_status(content, REQUIRED_FILE).unwrap();
        assert_eq!(packages, vec![Package::new("baz", "3.0")]);
    }

    #[test]
    fn parse_source_variants() {
        assert_eq!(parse_source("glibc (2.31-13)"), ("glibc", Some("2.31-13")));
        assert_eq!(parse_source("zlib"), ("zlib", None));
        assert_eq!(parse_source("zlib ()"), ("zlib", None));
    }

    #[test]
    fn malformed_line_is_parse_error() {
        assert!(parse_status("Package libc6\n", REQUIRED_FILE).is_err());
    }
}
