//! 아티팩트 검사 에러 타입
//!
//! [`ArtifactError`]는 `inspect` 호출자에게 전달되는 단일 에러 타입입니다.
//! [`CacheError`]는 캐시 백엔드가 반환하는 에러이며,
//! 검사 중 저장 실패는 `ArtifactError::CacheWrite`로 감싸집니다.
//!
//! # 에러 카테고리
//!
//! - **루트 접근 불가**: `RootInaccessible` (분석 전에 중단, 원본 I/O 에러 메시지 보존)
//! - **파일 읽기 실패**: `FileRead`
//! - **결과 일관성**: `OsConflict`
//! - **저장 실패**: `CacheWrite` (`failed to store blob` 접두사)
//! - **취소**: `Cancelled`
//! - **설정**: `Config`
//! - **내부**: `Encode`, `Worker`

use layerprobe_core::error::{ConfigError, LayerprobeError};

/// 아티팩트 검사 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// 루트 디렉토리에 접근할 수 없음
    #[error("root not accessible: {path}: {source}")]
    RootInaccessible {
        /// 루트 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 순회된 파일을 읽을 수 없음
    #[error("failed to read file: {path}: {source}")]
    FileRead {
        /// 루트 기준 상대 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 서로 다른 OS 식별 정보가 검출됨
    #[error(
        "conflicting OS identity: {first_os} from {first_analyzer} ({first_path}) \
         vs {second_os} from {second_analyzer} ({second_path})"
    )]
    OsConflict {
        /// 먼저 기록된 OS
        first_os: String,
        /// 먼저 기록한 분석기
        first_analyzer: String,
        /// 먼저 기록된 파일
        first_path: String,
        /// 충돌한 OS
        second_os: String,
        /// 충돌한 분석기
        second_analyzer: String,
        /// 충돌한 파일
        second_path: String,
    },

    /// 정규 레코드 직렬화 실패
    #[error("failed to encode blob: {0}")]
    Encode(#[from] serde_json::Error),

    /// 캐시 저장 실패
    #[error("failed to store blob {blob_id}: {source}")]
    CacheWrite {
        /// 저장하려던 blobID
        blob_id: String,
        /// 캐시 에러
        source: CacheError,
    },

    /// 취소됨
    #[error("inspection cancelled")]
    Cancelled,

    /// 잘못된 설정
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 워커 태스크 실패
    #[error("worker error: {0}")]
    Worker(String),
}

impl ArtifactError {
    /// 설정 에러 헬퍼
    pub fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    /// 취소로 끝났는지 확인합니다.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// 캐시 백엔드 에러
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// 백엔드 I/O 실패
    #[error("cache io error: {path}: {source}")]
    Io {
        /// 관련 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 레코드 직렬화/역직렬화 실패
    #[error("cache encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// 형식이 잘못된 blobID
    #[error("invalid blob id: '{0}'")]
    InvalidId(String),

    /// 기타 백엔드 실패
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<ArtifactError> for LayerprobeError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::Config { field, reason } => {
                LayerprobeError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => LayerprobeError::Inspect(other.to_string()),
        }
    }
}

impl From<CacheError> for LayerprobeError {
    fn from(err: CacheError) -> Self {
        LayerprobeError::Cache(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_inaccessible_keeps_io_text() {
        let err = ArtifactError::RootInaccessible {
            path: "/nonexistent".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent"));
        assert!(msg.contains("no such file or directory"));
    }

    #[test]
    fn cache_write_has_stable_prefix() {
        let err = ArtifactError::CacheWrite {
            blob_id: "sha256:abc".to_owned(),
            source: CacheError::Backend("disk full".to_owned()),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to store blob"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn os_conflict_names_both_contributors() {
        let err = ArtifactError::OsConflict {
            first_os: "alpine 3.11.6".to_owned(),
            first_analyzer: "alpine".to_owned(),
            first_path: "etc/alpine-release".to_owned(),
            second_os: "debian 11".to_owned(),
            second_analyzer: "os-release".to_owned(),
            second_path: "etc/os-release".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("alpine"));
        assert!(msg.contains("os-release"));
        assert!(msg.contains("etc/os-release"));
    }

    #[test]
    fn conversion_preserves_message() {
        let err = ArtifactError::CacheWrite {
            blob_id: "sha256:abc".to_owned(),
            source: CacheError::InvalidId("x".to_owned()),
        };
        let top: LayerprobeError = err.into();
        assert!(top.to_string().contains("failed to store blob"));

        let top: LayerprobeError = ArtifactError::config("concurrency", "must be 1-256").into();
        assert!(matches!(top, LayerprobeError::Config(_)));
    }

    #[test]
    fn cancelled_is_distinct() {
        assert!(ArtifactError::Cancelled.is_cancelled());
        assert!(!ArtifactError::Worker("x".to_owned()).is_cancelled());
    }
}
