//! Alpine 릴리스 파일 분석기

use layerprobe_core::types::Os;

use crate::analyzer::{AnalysisInput, Analyzer};
use crate::error::AnalyzerError;
use crate::types::{AnalyzerType, FileFinding};

/// OS 계열 이름
pub const FAMILY_ALPINE: &str = "alpine";

const REQUIRED_FILE: &str = "etc/alpine-release";

/// `etc/alpine-release` 분석기
///
/// 첫 줄을 버전으로 사용합니다.
pub struct AlpineReleaseAnalyzer;

impl Analyzer for AlpineReleaseAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Alpine
    }

    fn required(&self, file_path: &str) -> bool {
        file_path == REQUIRED_FILE
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let version = content.lines().next().map(str::trim).unwrap_or_default();
        if version.is_empty() {
            return Err(AnalyzerError::parse(
                self.analyzer_type(),
                input.file_path,
                "empty release file",
            ));
        }
        Ok(Some(FileFinding::Os(Os::new(FAMILY_ALPINE, version))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> Result<Option<FileFinding>, AnalyzerError> {
        let mut reader = content.as_bytes();
        AlpineReleaseAnalyzer.analyze(AnalysisInput::new(
            REQUIRED_FILE,
            &mut reader,
            content.len() as u64,
        ))
    }

    #[test]
    fn required_only_exact_path() {
        assert!(AlpineReleaseAnalyzer.required("etc/alpine-release"));
        assert!(!AlpineReleaseAnalyzer.required("usr/etc/alpine-release"));
        assert!(!AlpineReleaseAnalyzer.required("etc/os-release"));
    }

    #[test]
    fn parses_first_line() {
        let finding = run("3.11.6\n").unwrap();
        assert_eq!(finding, Some(FileFinding::Os(Os::new("alpine", "3.11.6"))));
    }

    #[test]
    fn trims_whitespace() {
        let finding = run("  3.19.1  \r\nignored\n").unwrap();
        assert_eq!(finding, Some(FileFinding::Os(Os::new("alpine", "3.19.1"))));
    }

    #[test]
    fn empty_file_is_parse_error() {
        let err = run("").unwrap_err();
        assert!(err.to_string().contains("empty release file"));
    }
}
