//! 분석 결과 누적기
//!
//! [`CompositeResult`]는 한 번의 검사 동안 모든 분석기 결과를 합칩니다.
//! 병합은 디스패치 엔진의 단일 병합 루프에서만 호출됩니다.
//!
//! 모든 그룹은 파일 경로를 키로 하는 `BTreeMap`에 담기므로 도착 순서와 무관하게
//! 순회 순서가 정해집니다. 그룹 안의 정렬은 [`canonical`](crate::canonical)이 담당합니다.

use std::collections::BTreeMap;

use tracing::debug;

use layerprobe_analyzer::{AnalyzerType, FileFinding};
use layerprobe_core::types::{Library, Os, Package};

use crate::error::ArtifactError;

/// OS 식별 정보와 그 출처
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsProvenance {
    /// OS 식별 정보
    pub os: Os,
    /// 기록한 분석기
    pub analyzer: AnalyzerType,
    /// 원본 파일 경로
    pub file_path: String,
}

/// 한 번의 검사 결과 누적기
#[derive(Debug, Default)]
pub struct CompositeResult {
    pub(crate) os: Option<OsProvenance>,
    pub(crate) packages: BTreeMap<String, Vec<Package>>,
    /// (타입, 파일 경로) -> 의존성
    pub(crate) applications: BTreeMap<(String, String), Vec<Library>>,
    /// (타입, 파일 경로) -> 내용
    pub(crate) configs: BTreeMap<(String, String), serde_json::Value>,
}

impl CompositeResult {
    /// 빈 누적기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 분석 결과 하나를 합칩니다.
    ///
    /// # Errors
    ///
    /// 이미 기록된 OS와 다른 OS가 들어오면 `OsConflict`
    pub fn merge(
        &mut self,
        file_path: &str,
        analyzer: AnalyzerType,
        finding: FileFinding,
    ) -> Result<(), ArtifactError> {
        match finding {
            FileFinding::Os(os) => self.set_os(file_path, analyzer, os)?,
            FileFinding::Packages(packages) => {
                self.packages
                    .entry(file_path.to_owned())
                    .or_default()
                    .extend(packages);
            }
            FileFinding::Application {
                app_type,
                libraries,
            } => {
                self.applications
                    .entry((app_type, file_path.to_owned()))
                    .or_default()
                    .extend(libraries);
            }
            FileFinding::Config {
                config_type,
                content,
            } => {
                self.configs
                    .insert((config_type, file_path.to_owned()), content);
            }
        }
        Ok(())
    }

    fn set_os(&mut self, file_path: &str, analyzer: AnalyzerType, os: Os) -> Result<(), ArtifactError> {
        if let Some(existing) = &self.os {
            if existing.os != os {
                return Err(ArtifactError::OsConflict {
                    first_os: existing.os.to_string(),
                    first_analyzer: existing.analyzer.to_string(),
                    first_path: existing.file_path.clone(),
                    second_os: os.to_string(),
                    second_analyzer: analyzer.to_string(),
                    second_path: file_path.to_owned(),
                });
            }
            debug!(
                os = %os,
                first = %existing.analyzer,
                second = %analyzer,
                "same OS reported twice"
            );
            return Ok(());
        }

        self.os = Some(OsProvenance {
            os,
            analyzer,
            file_path: file_path.to_owned(),
        });
        Ok(())
    }

    /// 기록된 OS 식별 정보
    pub fn os(&self) -> Option<&OsProvenance> {
        self.os.as_ref()
    }

    /// 패키지 목록이 기록된 파일 수
    pub fn package_file_count(&self) -> usize {
        self.packages.len()
    }

    /// 의존성 목록이 기록된 매니페스트 수
    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    /// 기록된 설정 파일 수
    pub fn config_count(&self) -> usize {
        self.configs.len()
    }

    /// 아무 결과도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.os.is_none()
            && self.packages.is_empty()
            && self.applications.is_empty()
            && self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_is_set_once() {
        let mut composite = CompositeResult::new();
        composite
            .merge(
                "etc/alpine-release",
                AnalyzerType::Alpine,
                FileFinding::Os(Os::new("alpine", "3.11.6")),
            )
            .unwrap();
        let os = composite.os().unwrap();
        assert_eq!(os.os, Os::new("alpine", "3.11.6"));
        assert_eq!(os.analyzer, AnalyzerType::Alpine);
        assert_eq!(os.file_path, "etc/alpine-release");
    }

    #[test]
    fn identical_os_is_accepted() {
        let mut composite = CompositeResult::new();
        composite
            .merge(
                "etc/alpine-release",
                AnalyzerType::Alpine,
                FileFinding::Os(Os::new("alpine", "3.11.6")),
            )
            .unwrap();
        composite
            .merge(
                "etc/os-release",
                AnalyzerType::OsRelease,
                FileFinding::Os(Os::new("alpine", "3.11.6")),
            )
            .unwrap();
        assert_eq!(composite.os().unwrap().analyzer, AnalyzerType::Alpine);
    }

    #[test]
    fn conflicting_os_names_both_analyzers() {
        let mut composite = CompositeResult::new();
        composite
            .merge(
                "etc/alpine-release",
                AnalyzerType::Alpine,
                FileFinding::Os(Os::new("alpine", "3.11.6")),
            )
            .unwrap();
        let err = composite
            .merge(
                "etc/os-release",
                AnalyzerType::OsRelease,
                FileFinding::Os(Os::new("debian", "11")),
            )
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("alpine"));
        assert!(msg.contains("os-release"));
        assert!(msg.contains("etc/alpine-release"));
        assert!(msg.contains("etc/os-release"));
    }

    #[test]
    fn packages_group_by_file() {
        let mut composite = CompositeResult::new();
        composite
            .merge(
                "lib/apk/db/installed",
                AnalyzerType::Apk,
                FileFinding::Packages(vec![Package::new("musl", "1.1.24-r2")]),
            )
            .unwrap();
        composite
            .merge(
                "var/lib/dpkg/status",
                AnalyzerType::Dpkg,
                FileFinding::Packages(vec![Package::new("bash", "5.1")]),
            )
            .unwrap();
        assert_eq!(composite.package_file_count(), 2);
        assert!(!composite.is_empty());
    }

    #[test]
    fn applications_and_configs_are_keyed_by_type_and_path() {
        let mut composite = CompositeResult::new();
        composite
            .merge(
                "app/package-lock.json",
                AnalyzerType::Npm,
                FileFinding::Application {
                    app_type: "npm".to_owned(),
                    libraries: vec![Library {
                        name: "lodash".to_owned(),
                        version: "4.17.21".to_owned(),
                    }],
                },
            )
            .unwrap();
        composite
            .merge(
                "Dockerfile",
                AnalyzerType::Dockerfile,
                FileFinding::Config {
                    config_type: "dockerfile".to_owned(),
                    content: serde_json::json!([]),
                },
            )
            .unwrap();
        assert_eq!(composite.application_count(), 1);
        assert_eq!(composite.config_count(), 1);
    }
}
