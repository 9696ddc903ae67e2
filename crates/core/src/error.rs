//! 에러 타입 -- 도메인별 에러 정의
//!
//! 하위 크레이트의 에러(`AnalyzerError`, `ArtifactError`)는 `From` 구현을 통해
//! [`LayerprobeError`]로 변환됩니다. 변환 시 원본 메시지를 그대로 보존하여
//! 호출자가 부분 문자열로 원인을 판별할 수 있습니다.

/// layerprobe 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LayerprobeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 분석기 에러 (등록, 파싱)
    #[error("analyzer error: {0}")]
    Analyzer(String),

    /// 아티팩트 검사 에러
    #[error("inspect error: {0}")]
    Inspect(String),

    /// 캐시 에러
    #[error("cache error: {0}")]
    Cache(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_with_context() {
        let err: LayerprobeError = ConfigError::InvalidValue {
            field: "scan.concurrency".to_owned(),
            reason: "must be 1-256".to_owned(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("scan.concurrency"));
        assert!(msg.contains("must be 1-256"));
    }

    #[test]
    fn io_error_keeps_os_text() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory");
        let err: LayerprobeError = io_err.into();
        assert!(err.to_string().contains("no such file or directory"));
    }

    #[test]
    fn inspect_error_display() {
        let err = LayerprobeError::Inspect("failed to store blob: disk full".to_owned());
        assert!(err.to_string().contains("failed to store blob"));
    }
}
