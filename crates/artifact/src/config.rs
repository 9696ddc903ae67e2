//! 검사 옵션
//!
//! [`ScannerOptions`]는 core의 [`ScanConfig`](layerprobe_core::config::ScanConfig)에서
//! 파생되며, 분석기 태그와 skip 패턴을 검증된 형태로 보관합니다.
//!
//! # 사용 예시
//!
//! ```
//! use layerprobe_artifact::{ScannerOptions, ScannerOptionsBuilder};
//! use layerprobe_analyzer::AnalyzerType;
//!
//! // 기본값으로 생성
//! let options = ScannerOptions::default();
//! options.validate().unwrap();
//!
//! // 빌더로 생성
//! let options = ScannerOptionsBuilder::new()
//!     .disable(AnalyzerType::Dockerfile)
//!     .skip_dirs(vec!["^proc$".to_owned()])
//!     .concurrency(4)
//!     .build()
//!     .unwrap();
//! ```

use layerprobe_analyzer::AnalyzerType;
use layerprobe_core::config::{MAX_CONCURRENCY, MAX_FILE_SIZE_LIMIT, ScanConfig};

use crate::error::ArtifactError;
use crate::walker::SkipRules;

/// 검사 옵션
///
/// # 필드
///
/// - **disabled_analyzers**: 비활성화할 분석기 (생성자에 넘긴 목록과 합쳐짐)
/// - **skip_files**: 분석과 diffID에서 제외할 파일 경로 정규식
/// - **skip_dirs**: 순회하지 않을 디렉토리 경로 정규식
/// - **follow_symlinks**: 루트 안을 가리키는 심볼릭 링크 추적 여부
/// - **concurrency**: 동시에 분석하는 최대 파일 수
/// - **max_file_size**: 분석기에 넘길 최대 파일 크기 (바이트)
/// - **artifact_name**: 결과 참조 이름
#[derive(Debug, Clone)]
pub struct ScannerOptions {
    /// 비활성화할 분석기
    pub disabled_analyzers: Vec<AnalyzerType>,
    /// 제외할 파일 패턴 (루트 기준 상대 경로)
    pub skip_files: Vec<String>,
    /// 제외할 디렉토리 패턴 (루트 기준 상대 경로)
    pub skip_dirs: Vec<String>,
    /// 심볼릭 링크 추적 여부
    pub follow_symlinks: bool,
    /// 동시 분석 파일 수
    pub concurrency: usize,
    /// 분석 대상 최대 파일 크기 (바이트)
    pub max_file_size: usize,
    /// 결과 참조 이름
    pub artifact_name: String,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        let core = ScanConfig::default();
        Self {
            disabled_analyzers: Vec::new(),
            skip_files: Vec::new(),
            skip_dirs: Vec::new(),
            follow_symlinks: core.follow_symlinks,
            concurrency: core.concurrency,
            max_file_size: core.max_file_size,
            artifact_name: core.artifact_name,
        }
    }
}

impl ScannerOptions {
    /// core의 `ScanConfig`에서 검사 옵션을 생성합니다.
    ///
    /// 알 수 없는 분석기 태그는 에러입니다.
    pub fn from_core(core: &ScanConfig) -> Result<Self, ArtifactError> {
        let disabled_analyzers = core
            .disabled_analyzers
            .iter()
            .map(|tag| {
                tag.parse::<AnalyzerType>()
                    .map_err(|e| ArtifactError::config("disabled_analyzers", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = Self {
            disabled_analyzers,
            skip_files: core.skip_files.clone(),
            skip_dirs: core.skip_dirs.clone(),
            follow_symlinks: core.follow_symlinks,
            concurrency: core.concurrency,
            max_file_size: core.max_file_size,
            artifact_name: core.artifact_name.clone(),
        };
        options.validate()?;
        Ok(options)
    }

    /// 옵션 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `concurrency`: 1-256
    /// - `max_file_size`: 1-1073741824 (1 GiB)
    /// - `artifact_name`: 비어 있으면 안 됨
    /// - `skip_files`, `skip_dirs`: 올바른 정규식
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ArtifactError::config(
                "concurrency",
                format!("must be 1-{MAX_CONCURRENCY}"),
            ));
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ArtifactError::config(
                "max_file_size",
                format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            ));
        }

        if self.artifact_name.trim().is_empty() {
            return Err(ArtifactError::config(
                "artifact_name",
                "must not be empty",
            ));
        }

        self.skip_rules()?;
        Ok(())
    }

    /// skip 패턴을 컴파일합니다.
    pub fn skip_rules(&self) -> Result<SkipRules, ArtifactError> {
        SkipRules::compile(&self.skip_files, &self.skip_dirs)
    }
}

/// [`ScannerOptions`] 빌더
///
/// 빌드 시 유효성 검증을 수행합니다.
#[derive(Default)]
pub struct ScannerOptionsBuilder {
    options: ScannerOptions,
}

impl ScannerOptionsBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 분석기 하나를 비활성화합니다.
    pub fn disable(mut self, analyzer: AnalyzerType) -> Self {
        if !self.options.disabled_analyzers.contains(&analyzer) {
            self.options.disabled_analyzers.push(analyzer);
        }
        self
    }

    /// 비활성화 목록을 설정합니다.
    pub fn disabled_analyzers(mut self, analyzers: Vec<AnalyzerType>) -> Self {
        self.options.disabled_analyzers = analyzers;
        self
    }

    /// 제외할 파일 패턴을 설정합니다.
    pub fn skip_files(mut self, patterns: Vec<String>) -> Self {
        self.options.skip_files = patterns;
        self
    }

    /// 제외할 디렉토리 패턴을 설정합니다.
    pub fn skip_dirs(mut self, patterns: Vec<String>) -> Self {
        self.options.skip_dirs = patterns;
        self
    }

    /// 심볼릭 링크 추적 여부를 설정합니다.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.options.follow_symlinks = follow;
        self
    }

    /// 동시 분석 파일 수를 설정합니다.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    /// 최대 파일 크기(바이트)를 설정합니다.
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.options.max_file_size = size;
        self
    }

    /// 결과 참조 이름을 설정합니다.
    pub fn artifact_name(mut self, name: impl Into<String>) -> Self {
        self.options.artifact_name = name.into();
        self
    }

    /// 옵션을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ArtifactError::Config` 반환
    pub fn build(self) -> Result<ScannerOptions, ArtifactError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let options = ScannerOptions::default();
        options.validate().unwrap();
        assert_eq!(options.artifact_name, "host");
        assert!(!options.follow_symlinks);
    }

    #[test]
    fn from_core_preserves_values() {
        let core = ScanConfig {
            disabled_analyzers: vec!["apk".to_owned(), "OS_RELEASE".to_owned()],
            skip_files: vec![r"\.log$".to_owned()],
            skip_dirs: vec!["^proc$".to_owned()],
            follow_symlinks: true,
            concurrency: 4,
            max_file_size: 1024,
            artifact_name: "rootfs".to_owned(),
        };
        let options = ScannerOptions::from_core(&core).unwrap();
        assert_eq!(
            options.disabled_analyzers,
            vec![AnalyzerType::Apk, AnalyzerType::OsRelease]
        );
        assert_eq!(options.skip_dirs, vec!["^proc$"]);
        assert!(options.follow_symlinks);
        assert_eq!(options.concurrency, 4);
        assert_eq!(options.artifact_name, "rootfs");
    }

    #[test]
    fn from_core_rejects_unknown_analyzer() {
        let core = ScanConfig {
            disabled_analyzers: vec!["rpm".to_owned()],
            ..ScanConfig::default()
        };
        let err = ScannerOptions::from_core(&core).unwrap_err();
        assert!(err.to_string().contains("unknown analyzer type: 'rpm'"));
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        let err = ScannerOptionsBuilder::new().concurrency(0).build().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn builder_rejects_too_large_concurrency() {
        assert!(
            ScannerOptionsBuilder::new()
                .concurrency(MAX_CONCURRENCY + 1)
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_rejects_zero_max_file_size() {
        let err = ScannerOptionsBuilder::new()
            .max_file_size(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_file_size"));
    }

    #[test]
    fn builder_rejects_invalid_regex() {
        let err = ScannerOptionsBuilder::new()
            .skip_files(vec!["([unclosed".to_owned()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("skip_files"));
    }

    #[test]
    fn builder_rejects_blank_name() {
        assert!(ScannerOptionsBuilder::new().artifact_name(" ").build().is_err());
    }

    #[test]
    fn builder_disable_deduplicates() {
        let options = ScannerOptionsBuilder::new()
            .disable(AnalyzerType::Npm)
            .disable(AnalyzerType::Npm)
            .build()
            .unwrap();
        assert_eq!(options.disabled_analyzers, vec![AnalyzerType::Npm]);
    }
}
