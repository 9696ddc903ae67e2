//! 분석기 레지스트리
//!
//! [`RegistryBuilder`]로 프로세스 시작 시 한 번 분석기를 등록하고,
//! [`build`](RegistryBuilder::build)로 불변 [`AnalyzerRegistry`] 스냅샷을 얻습니다.
//! 검사 중에는 읽기만 하므로 잠금이 필요 없습니다.
//!
//! # 사용 예시
//!
//! ```
//! use std::collections::HashSet;
//! use layerprobe_analyzer::{AnalyzerRegistry, AnalyzerType};
//!
//! let registry = AnalyzerRegistry::with_defaults();
//! let disabled: HashSet<AnalyzerType> = [AnalyzerType::Apk].into_iter().collect();
//! let active = registry.filtered(&disabled);
//! assert!(!active.types().contains(&AnalyzerType::Apk));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::config::dockerfile::DockerfileAnalyzer;
use crate::error::AnalyzerError;
use crate::lang::cargo::CargoLockAnalyzer;
use crate::lang::npm::NpmLockAnalyzer;
use crate::os::alpine::AlpineReleaseAnalyzer;
use crate::os::release::OsReleaseAnalyzer;
use crate::pkg::apk::ApkAnalyzer;
use crate::pkg::dpkg::DpkgAnalyzer;
use crate::types::{AnalyzerGroup, AnalyzerType};

/// 레지스트리 빌더
///
/// 같은 타입의 분석기를 두 번 등록하면 에러를 반환합니다.
#[derive(Default)]
pub struct RegistryBuilder {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl RegistryBuilder {
    /// 빈 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 분석기를 등록합니다.
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) -> Result<(), AnalyzerError> {
        let analyzer_type = analyzer.analyzer_type();
        if self
            .analyzers
            .iter()
            .any(|a| a.analyzer_type() == analyzer_type)
        {
            return Err(AnalyzerError::DuplicateType {
                analyzer: analyzer_type,
            });
        }
        self.analyzers.push(Arc::from(analyzer));
        Ok(())
    }

    /// 체이닝용 등록 메서드
    pub fn with(mut self, analyzer: Box<dyn Analyzer>) -> Result<Self, AnalyzerError> {
        self.register(analyzer)?;
        Ok(self)
    }

    /// 불변 레지스트리를 생성합니다.
    ///
    /// 분석기는 (그룹, 태그) 순으로 정렬되어 등록 순서와 무관하게 결정적입니다.
    pub fn build(mut self) -> AnalyzerRegistry {
        self.analyzers
            .sort_by_key(|a| (a.group(), a.analyzer_type().as_str()));
        AnalyzerRegistry {
            analyzers: self.analyzers,
        }
    }
}

/// 불변 분석기 레지스트리
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// 기본 제공 분석기를 모두 등록한 레지스트리를 생성합니다.
    pub fn with_defaults() -> Self {
        let analyzers: Vec<Arc<dyn Analyzer>> = vec![
            Arc::new(AlpineReleaseAnalyzer),
            Arc::new(OsReleaseAnalyzer),
            Arc::new(ApkAnalyzer),
            Arc::new(DpkgAnalyzer),
            Arc::new(NpmLockAnalyzer),
            Arc::new(CargoLockAnalyzer),
            Arc::new(DockerfileAnalyzer),
        ];
        RegistryBuilder { analyzers }.build()
    }

    /// 등록된 분석기 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// 등록된 분석기가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// 등록된 분석기 타입을 (그룹, 태그) 순으로 반환합니다.
    pub fn types(&self) -> Vec<AnalyzerType> {
        self.analyzers.iter().map(|a| a.analyzer_type()).collect()
    }

    /// 타입이 등록되어 있는지 확인합니다.
    pub fn contains(&self, analyzer_type: AnalyzerType) -> bool {
        self.analyzers
            .iter()
            .any(|a| a.analyzer_type() == analyzer_type)
    }

    /// 비활성화 목록에 없는 분석기만 모은 활성 집합을 반환합니다.
    pub fn filtered(&self, disabled: &HashSet<AnalyzerType>) -> ActiveAnalyzers {
        let mut active = ActiveAnalyzers::default();
        for analyzer in &self.analyzers {
            if disabled.contains(&analyzer.analyzer_type()) {
                continue;
            }
            let bucket = match analyzer.group() {
                AnalyzerGroup::Os => &mut active.os,
                AnalyzerGroup::Package => &mut active.package,
                AnalyzerGroup::Other => &mut active.other,
            };
            bucket.push(Arc::clone(analyzer));
        }
        active
    }
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("analyzers", &self.types())
            .finish()
    }
}

/// 활성 분석기 집합
///
/// OS 그룹, 패키지 그룹, 기타 그룹 순으로 순회합니다.
#[derive(Clone, Default)]
pub struct ActiveAnalyzers {
    os: Vec<Arc<dyn Analyzer>>,
    package: Vec<Arc<dyn Analyzer>>,
    other: Vec<Arc<dyn Analyzer>>,
}

impl ActiveAnalyzers {
    /// 그룹 순서대로 모든 활성 분석기를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Analyzer>> {
        self.os.iter().chain(&self.package).chain(&self.other)
    }

    /// 주어진 경로를 처리하는 분석기를 그룹 순서대로 반환합니다.
    pub fn matching(&self, file_path: &str) -> Vec<Arc<dyn Analyzer>> {
        self.iter()
            .filter(|a| a.required(file_path))
            .cloned()
            .collect()
    }

    /// 그룹별 분석기 목록
    pub fn group(&self, group: AnalyzerGroup) -> &[Arc<dyn Analyzer>] {
        match group {
            AnalyzerGroup::Os => &self.os,
            AnalyzerGroup::Package => &self.package,
            AnalyzerGroup::Other => &self.other,
        }
    }

    /// 활성 분석기 타입 목록
    pub fn types(&self) -> Vec<AnalyzerType> {
        self.iter().map(|a| a.analyzer_type()).collect()
    }

    /// 활성 분석기 수
    pub fn len(&self) -> usize {
        self.os.len() + self.package.len() + self.other.len()
    }

    /// 활성 분석기가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ActiveAnalyzers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveAnalyzers")
            .field("analyzers", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisInput;
    use crate::types::FileFinding;

    struct NoopAnalyzer(AnalyzerType);

    impl Analyzer for NoopAnalyzer {
        fn analyzer_type(&self) -> AnalyzerType {
            self.0
        }

        fn required(&self, _file_path: &str) -> bool {
            true
        }

        fn analyze(
            &self,
            _input: AnalysisInput<'_>,
        ) -> Result<Option<FileFinding>, AnalyzerError> {
            Ok(None)
        }
    }

    #[test]
    fn register_rejects_duplicate_type() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(Box::new(NoopAnalyzer(AnalyzerType::Npm)))
            .unwrap();
        let err = builder
            .register(Box::new(NoopAnalyzer(AnalyzerType::Npm)))
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::DuplicateType {
                analyzer: AnalyzerType::Npm
            }
        ));
    }

    #[test]
    fn build_orders_by_group_then_tag() {
        let registry = RegistryBuilder::new()
            .with(Box::new(NoopAnalyzer(AnalyzerType::Npm)))
            .and_then(|b| b.with(Box::new(NoopAnalyzer(AnalyzerType::Dpkg))))
            .and_then(|b| b.with(Box::new(NoopAnalyzer(AnalyzerType::OsRelease))))
            .and_then(|b| b.with(Box::new(NoopAnalyzer(AnalyzerType::Alpine))))
            .unwrap()
            .build();
        assert_eq!(
            registry.types(),
            vec![
                AnalyzerType::Alpine,
                AnalyzerType::OsRelease,
                AnalyzerType::Dpkg,
                AnalyzerType::Npm
            ]
        );
    }

    #[test]
    fn defaults_within_group_follow_tag_strings() {
        let registry = AnalyzerRegistry::with_defaults();
        let active = registry.filtered(&HashSet::new());
        let other: Vec<&str> = active
            .group(AnalyzerGroup::Other)
            .iter()
            .map(|a| a.analyzer_type().as_str())
            .collect();
        assert_eq!(other, vec!["cargo", "dockerfile", "npm"]);
        let os: Vec<&str> = active
            .group(AnalyzerGroup::Os)
            .iter()
            .map(|a| a.analyzer_type().as_str())
            .collect();
        assert_eq!(os, vec!["alpine", "os-release"]);
    }

    #[test]
    fn defaults_register_every_type_once() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(registry.len(), AnalyzerType::ALL.len());
        for t in AnalyzerType::ALL {
            assert!(registry.contains(t), "{t} missing");
        }
    }

    #[test]
    fn filtered_excludes_disabled_types() {
        let registry = AnalyzerRegistry::with_defaults();
        let disabled: HashSet<AnalyzerType> = [AnalyzerType::Alpine, AnalyzerType::Apk]
            .into_iter()
            .collect();
        let active = registry.filtered(&disabled);
        assert_eq!(active.len(), registry.len() - 2);
        assert!(!active.types().contains(&AnalyzerType::Alpine));
        assert!(!active.types().contains(&AnalyzerType::Apk));
        assert_eq!(active.group(AnalyzerGroup::Os).len(), 1);
    }

    #[test]
    fn filtered_with_empty_set_keeps_all() {
        let registry = AnalyzerRegistry::with_defaults();
        let active = registry.filtered(&HashSet::new());
        assert_eq!(active.types(), registry.types());
    }

    #[test]
    fn matching_returns_only_required_analyzers() {
        let registry = AnalyzerRegistry::with_defaults();
        let active = registry.filtered(&HashSet::new());
        let matched: Vec<AnalyzerType> = active
            .matching("lib/apk/db/installed")
            .iter()
            .map(|a| a.analyzer_type())
            .collect();
        assert_eq!(matched, vec![AnalyzerType::Apk]);
        assert!(active.matching("usr/bin/busybox").is_empty());
    }
}
