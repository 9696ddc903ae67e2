//! 분석기 에러 타입
//!
//! [`AnalyzerError`]는 분석기 실행과 레지스트리 구성에서 발생하는 에러를 나타냅니다.
//!
//! # 에러 카테고리
//!
//! - **파일 내용 해석 실패**: `Parse` (검사 전체는 계속 진행)
//! - **파일 읽기 실패**: `Io` (호출자가 심각도를 판단)
//! - **레지스트리 구성**: `DuplicateType`, `UnknownType`

use layerprobe_core::error::LayerprobeError;

use crate::types::AnalyzerType;

/// 분석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// 파일 내용 해석 실패
    #[error("{analyzer} analyzer failed to parse {path}: {reason}")]
    Parse {
        /// 실패한 분석기
        analyzer: AnalyzerType,
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 읽기 실패
    #[error("io error: {path}: {source}")]
    Io {
        /// 대상 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 같은 타입의 분석기가 이미 등록됨
    #[error("analyzer already registered: {analyzer}")]
    DuplicateType {
        /// 중복된 타입
        analyzer: AnalyzerType,
    },

    /// 알 수 없는 분석기 태그
    #[error("unknown analyzer type: '{0}'")]
    UnknownType(String),
}

impl AnalyzerError {
    /// 파일 읽기 에러인지 확인합니다.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// 파싱 에러를 만드는 헬퍼
    pub fn parse(analyzer: AnalyzerType, path: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            analyzer,
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<AnalyzerError> for LayerprobeError {
    fn from(err: AnalyzerError) -> Self {
        LayerprobeError::Analyzer(err.to_string())
    }
}
