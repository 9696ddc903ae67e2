//! 도메인 타입 -- 검사 결과 레코드와 반환값
//!
//! [`BlobInfo`]는 캐시에 저장되는 불변 단위이며, 직렬화 형태가 곧 blobID의
//! 입력이므로 필드 순서와 이름을 함부로 바꾸면 안 됩니다.
//! 필드를 바꿀 때는 [`BLOB_JSON_SCHEMA_VERSION`]을 올립니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 저장 레코드 스키마 버전
pub const BLOB_JSON_SCHEMA_VERSION: u32 = 1;

/// OS 식별 정보
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Os {
    /// 배포판 계열 (예: "alpine", "debian")
    pub family: String,
    /// 배포판 버전 (예: "3.11.6")
    pub name: String,
}

impl Os {
    /// 새 OS 식별 정보를 생성합니다.
    pub fn new(family: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.name)
    }
}

/// OS 패키지
///
/// 필드 선언 순서(name, version, src_name, src_version)가 곧 정렬 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// 패키지 이름
    pub name: String,
    /// 패키지 버전
    pub version: String,
    /// 소스 패키지 이름
    pub src_name: String,
    /// 소스 패키지 버전
    pub src_version: String,
}

impl Package {
    /// 소스 패키지가 바이너리 패키지와 같은 경우의 생성자
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        Self {
            src_name: name.clone(),
            src_version: version.clone(),
            name,
            version,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// 한 패키지 DB 파일에서 나온 패키지 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// 루트 기준 상대 경로 (`/` 구분)
    pub file_path: String,
    /// 패키지 목록
    pub packages: Vec<Package>,
}

/// 애플리케이션 의존성 (lockfile 항목)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Library {
    /// 라이브러리 이름
    pub name: String,
    /// 라이브러리 버전
    pub version: String,
}

/// 한 매니페스트 파일에서 나온 애플리케이션 의존성 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// 매니페스트 종류 (예: "npm", "cargo")
    #[serde(rename = "type")]
    pub app_type: String,
    /// 루트 기준 상대 경로
    pub file_path: String,
    /// 의존성 목록
    pub libraries: Vec<Library>,
}

/// 설정 파일 분석 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// 설정 종류 (예: "dockerfile")
    #[serde(rename = "type")]
    pub config_type: String,
    /// 루트 기준 상대 경로
    pub file_path: String,
    /// 구조화된 내용
    pub content: serde_json::Value,
}

/// 캐시에 저장되는 검사 결과 레코드
///
/// 한 번의 검사에서 한 번 생성되고 이후 변경되지 않습니다.
/// 빈 그룹과 없는 OS는 직렬화에서 생략됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    /// 스키마 버전
    pub schema_version: u32,
    /// 원본 파일 콘텐츠 스트림 해시
    #[serde(rename = "diffID")]
    pub diff_id: String,
    /// OS 식별 정보
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    /// 파일별 패키지 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_infos: Vec<PackageInfo>,
    /// 파일별 애플리케이션 의존성
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<Application>,
    /// 설정 파일 분석 결과
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigFile>,
}

impl BlobInfo {
    /// 전체 OS 패키지 수를 반환합니다.
    pub fn package_count(&self) -> usize {
        self.package_infos.iter().map(|p| p.packages.len()).sum()
    }

    /// 전체 애플리케이션 의존성 수를 반환합니다.
    pub fn library_count(&self) -> usize {
        self.applications.iter().map(|a| a.libraries.len()).sum()
    }

    /// 분석 결과가 하나도 없는지 확인합니다.
    pub fn has_no_findings(&self) -> bool {
        self.os.is_none()
            && self.package_infos.is_empty()
            && self.applications.is_empty()
            && self.configs.is_empty()
    }
}

impl fmt::Display for BlobInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlobInfo(diff={}, os={}, packages={}, libraries={}, configs={})",
            self.diff_id,
            self.os
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_owned()),
            self.package_count(),
            self.library_count(),
            self.configs.len(),
        )
    }
}

/// 검사 결과 참조 (`inspect`의 반환값)
///
/// 단일 디렉토리 검사는 항상 blob 하나를 만들지만,
/// 여러 레이어를 합성하는 상위 아티팩트와 형태를 맞추기 위해 목록으로 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// 사람이 읽는 출처 이름 (예: "host")
    pub name: String,
    /// blobID
    #[serde(rename = "id")]
    pub id: String,
    /// blobID 목록
    #[serde(rename = "blobIDs")]
    pub blob_ids: Vec<String>,
}

impl ArtifactReference {
    /// 단일 blob으로 구성된 참조를 생성합니다.
    pub fn single(name: impl Into<String>, blob_id: impl Into<String>) -> Self {
        let blob_id = blob_id.into();
        Self {
            name: name.into(),
            id: blob_id.clone(),
            blob_ids: vec![blob_id],
        }
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
