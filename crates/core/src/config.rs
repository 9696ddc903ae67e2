//! 설정 관리 -- layerprobe.toml 파싱 및 런타임 설정
//!
//! [`LayerprobeConfig`]는 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LAYERPROBE_SCAN_CONCURRENCY=16` 형식)
//! 3. 설정 파일 (`layerprobe.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), layerprobe_core::error::LayerprobeError> {
//! use layerprobe_core::config::LayerprobeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LayerprobeConfig::load("layerprobe.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LayerprobeConfig::parse("[scan]\nconcurrency = 4")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LayerprobeError};

/// 동시 분석 파일 수 상한
pub const MAX_CONCURRENCY: usize = 256;

/// 분석 대상 파일 크기 상한 (1 GiB)
pub const MAX_FILE_SIZE_LIMIT: usize = 1024 * 1024 * 1024;

/// layerprobe 통합 설정
///
/// `layerprobe.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerprobeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 검사 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
}

impl LayerprobeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LayerprobeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LayerprobeError> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Self::load(path).await;
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LayerprobeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LayerprobeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LayerprobeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LayerprobeError> {
        toml::from_str(toml_str).map_err(|e| {
            LayerprobeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LAYERPROBE_{SECTION}_{FIELD}`
    /// 예: `LAYERPROBE_SCAN_FOLLOW_SYMLINKS=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LAYERPROBE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LAYERPROBE_GENERAL_LOG_FORMAT");

        // Scan
        override_csv(
            &mut self.scan.disabled_analyzers,
            "LAYERPROBE_SCAN_DISABLED_ANALYZERS",
        );
        override_csv(&mut self.scan.skip_files, "LAYERPROBE_SCAN_SKIP_FILES");
        override_csv(&mut self.scan.skip_dirs, "LAYERPROBE_SCAN_SKIP_DIRS");
        override_bool(
            &mut self.scan.follow_symlinks,
            "LAYERPROBE_SCAN_FOLLOW_SYMLINKS",
        );
        override_usize(&mut self.scan.concurrency, "LAYERPROBE_SCAN_CONCURRENCY");
        override_usize(&mut self.scan.max_file_size, "LAYERPROBE_SCAN_MAX_FILE_SIZE");
        override_string(&mut self.scan.artifact_name, "LAYERPROBE_SCAN_ARTIFACT_NAME");

        // Cache
        if let Ok(val) = std::env::var("LAYERPROBE_CACHE_BACKEND") {
            match CacheBackend::from_str_loose(&val) {
                Some(backend) => self.cache.backend = backend,
                None => warn!(
                    env_key = "LAYERPROBE_CACHE_BACKEND",
                    value = val.as_str(),
                    "unknown cache backend in env var, ignoring"
                ),
            }
        }
        override_string(&mut self.cache.dir, "LAYERPROBE_CACHE_DIR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LayerprobeError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.scan.concurrency == 0 || self.scan.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidValue {
                field: "scan.concurrency".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENCY}"),
            }
            .into());
        }

        if self.scan.max_file_size == 0 || self.scan.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.scan.artifact_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.artifact_name".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.cache.backend == CacheBackend::Fs && self.cache.dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache.dir".to_owned(),
                reason: "cache dir must not be empty for the fs backend".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 검사 설정
///
/// 아티팩트 크레이트의 `ScannerOptions`로 변환되어 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 비활성화할 분석기 타입 태그 목록 (예: "apk", "alpine")
    pub disabled_analyzers: Vec<String>,
    /// 분석에서 제외할 파일 경로 패턴 (정규식, 루트 기준 상대 경로)
    pub skip_files: Vec<String>,
    /// 순회에서 제외할 디렉토리 경로 패턴 (정규식, 루트 기준 상대 경로)
    pub skip_dirs: Vec<String>,
    /// 심볼릭 링크 추적 여부 (루트 밖으로는 나가지 않음)
    pub follow_symlinks: bool,
    /// 동시에 분석하는 최대 파일 수
    pub concurrency: usize,
    /// 분석기에 넘길 최대 파일 크기 (바이트)
    pub max_file_size: usize,
    /// 검사 결과 참조의 이름
    pub artifact_name: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            disabled_analyzers: Vec::new(),
            skip_files: Vec::new(),
            skip_dirs: Vec::new(),
            follow_symlinks: false,
            concurrency: 8,
            max_file_size: 64 * 1024 * 1024, // 64 MB
            artifact_name: "host".to_owned(),
        }
    }
}

/// 캐시 백엔드 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// 디렉토리 기반 영구 캐시
    #[default]
    Fs,
    /// 프로세스 내 메모리 캐시
    Memory,
}

impl CacheBackend {
    /// 문자열에서 백엔드를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fs" | "file" | "filesystem" => Some(Self::Fs),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fs => write!(f, "fs"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// 캐시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 백엔드 종류
    pub backend: CacheBackend,
    /// fs 백엔드의 루트 디렉토리
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Fs,
            dir: "/var/lib/layerprobe/cache".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
