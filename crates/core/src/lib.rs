//! layerprobe 공통 크레이트
//!
//! 파일시스템 트리 검사 결과를 표현하는 도메인 타입, 최상위 에러,
//! `layerprobe.toml` 설정, 콘텐츠 해시 헬퍼를 제공합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 최상위 에러 (`LayerprobeError`, `ConfigError`)
//! - [`config`]: 설정 (`LayerprobeConfig`, `ScanConfig`, `CacheConfig`)
//! - [`types`]: 도메인 타입 (`Os`, `Package`, `PackageInfo`, `BlobInfo`, `ArtifactReference`)
//! - [`digest`]: `sha256:<hex>` 형식의 콘텐츠 해시
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod digest;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LayerprobeError};

// 설정
pub use config::{CacheBackend, CacheConfig, GeneralConfig, LayerprobeConfig, ScanConfig};

// 도메인 타입
pub use types::{
    Application, ArtifactReference, BLOB_JSON_SCHEMA_VERSION, BlobInfo, ConfigFile, Library, Os,
    Package, PackageInfo,
};
