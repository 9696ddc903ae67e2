//! 도메인 타입 -- 분석기 태그, 그룹, 분석 결과
//!
//! [`AnalyzerType`] 태그 문자열은 비활성화 목록의 키로 설정 파일과 CLI에
//! 그대로 저장되므로 한 번 정한 값은 바꾸지 않습니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use layerprobe_core::types::{Library, Os, Package};

use crate::error::AnalyzerError;

/// 분석기 타입 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerType {
    /// Alpine `/etc/alpine-release`
    Alpine,
    /// freedesktop `os-release`
    OsRelease,
    /// Alpine apk 설치 DB
    Apk,
    /// Debian dpkg status DB
    Dpkg,
    /// NPM package-lock.json
    Npm,
    /// Rust Cargo.lock
    Cargo,
    /// Dockerfile
    Dockerfile,
}

impl AnalyzerType {
    /// 모든 분석기 타입 (태그 사전순)
    pub const ALL: [AnalyzerType; 7] = [
        Self::Alpine,
        Self::Apk,
        Self::Cargo,
        Self::Dockerfile,
        Self::Dpkg,
        Self::Npm,
        Self::OsRelease,
    ];

    /// 안정적인 태그 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpine => "alpine",
            Self::OsRelease => "os-release",
            Self::Apk => "apk",
            Self::Dpkg => "dpkg",
            Self::Npm => "npm",
            Self::Cargo => "cargo",
            Self::Dockerfile => "dockerfile",
        }
    }

    /// 이 분석기가 속하는 그룹을 반환합니다.
    pub fn group(&self) -> AnalyzerGroup {
        match self {
            Self::Alpine | Self::OsRelease => AnalyzerGroup::Os,
            Self::Apk | Self::Dpkg => AnalyzerGroup::Package,
            Self::Npm | Self::Cargo | Self::Dockerfile => AnalyzerGroup::Other,
        }
    }

    /// 문자열에서 분석기 타입을 파싱합니다 (대소문자 구분 없음).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alpine" => Some(Self::Alpine),
            "os-release" | "os_release" | "osrelease" => Some(Self::OsRelease),
            "apk" => Some(Self::Apk),
            "dpkg" => Some(Self::Dpkg),
            "npm" => Some(Self::Npm),
            "cargo" => Some(Self::Cargo),
            "dockerfile" => Some(Self::Dockerfile),
            _ => None,
        }
    }
}

impl FromStr for AnalyzerType {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AnalyzerError::UnknownType(s.trim().to_owned()))
    }
}

impl fmt::Display for AnalyzerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 분석기 그룹
///
/// 선언 순서가 곧 실행 순서입니다. 패키지 분석기는 OS 분석기 뒤에 옵니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerGroup {
    /// OS 식별
    Os,
    /// OS 패키지 DB
    Package,
    /// 애플리케이션 매니페스트, 설정 파일
    Other,
}

impl fmt::Display for AnalyzerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Os => write!(f, "os"),
            Self::Package => write!(f, "package"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// 파일 하나에 대한 분석 결과
///
/// 원본 파일 경로는 결과를 합치는 쪽이 알고 있으므로 담지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFinding {
    /// OS 식별 정보
    Os(Os),
    /// 패키지 DB 파일의 패키지 목록
    Packages(Vec<Package>),
    /// 애플리케이션 의존성 목록
    Application {
        /// 매니페스트 종류 (예: "npm")
        app_type: String,
        /// 의존성 목록
        libraries: Vec<Library>,
    },
    /// 구조화된 설정 파일 내용
    Config {
        /// 설정 종류 (예: "dockerfile")
        config_type: String,
        /// 내용
        content: serde_json::Value,
    },
}
