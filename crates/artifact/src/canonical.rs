//! 정규화 및 콘텐츠 해시
//!
//! - **diffID**: 순회된 파일 목록 `[{path, mode, size, digest}]`을 경로 우선으로 정렬한
//!   JSON의 SHA-256. 분석기 설정과 무관합니다.
//! - **blobID**: 정규화된 [`BlobInfo`] JSON의 SHA-256. diffID와 모든 분석 결과를 포함합니다.
//!
//! # 정렬 규칙
//!
//! - `packageInfos`: filePath 순, 안의 패키지는 (name, version, srcName, srcVersion) 순
//! - `applications`: (type, filePath) 순, 안의 의존성은 (name, version) 순
//! - `configs`: (type, filePath) 순
//!
//! 레코드 필드 순서는 `BlobInfo` 선언 순서로 고정되고, 설정 내용의 JSON 객체 키는
//! `serde_json::Map`(BTreeMap) 특성상 사전순으로 직렬화됩니다.

use serde::Serialize;

use layerprobe_core::digest::sha256_bytes;
use layerprobe_core::types::{
    Application, BLOB_JSON_SCHEMA_VERSION, BlobInfo, ConfigFile, PackageInfo,
};

use crate::composite::CompositeResult;
use crate::error::ArtifactError;

/// diffID 입력이 되는 파일 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// 루트 기준 상대 경로
    pub path: String,
    /// 권한 비트
    pub mode: u32,
    /// 크기 (바이트)
    pub size: u64,
    /// 파일 내용 다이제스트 (`sha256:<hex>`)
    pub digest: String,
}

/// 파일 목록에서 diffID를 계산합니다.
///
/// 목록은 (path, digest, mode, size) 순으로 정렬된 뒤 직렬화됩니다. 전순서이므로
/// 입력 순서가 결과에 영향을 주지 않습니다.
pub fn diff_id(mut entries: Vec<ManifestEntry>) -> Result<String, ArtifactError> {
    entries.sort_by(|a, b| {
        (&a.path, &a.digest, a.mode, a.size).cmp(&(&b.path, &b.digest, b.mode, b.size))
    });
    let bytes = serde_json::to_vec(&entries)?;
    Ok(sha256_bytes(&bytes))
}

/// 누적된 결과를 정규화된 레코드로 변환합니다.
pub fn canonicalize(composite: CompositeResult, diff_id: String) -> BlobInfo {
    let package_infos = composite
        .packages
        .into_iter()
        .map(|(file_path, mut packages)| {
            packages.sort();
            PackageInfo {
                file_path,
                packages,
            }
        })
        .collect();

    let applications = composite
        .applications
        .into_iter()
        .map(|((app_type, file_path), mut libraries)| {
            libraries.sort();
            libraries.dedup();
            Application {
                app_type,
                file_path,
                libraries,
            }
        })
        .collect();

    let configs = composite
        .configs
        .into_iter()
        .map(|((config_type, file_path), content)| ConfigFile {
            config_type,
            file_path,
            content,
        })
        .collect();

    BlobInfo {
        schema_version: BLOB_JSON_SCHEMA_VERSION,
        diff_id,
        os: composite.os.map(|p| p.os),
        package_infos,
        applications,
        configs,
    }
}

/// 정규화된 레코드의 blobID를 계산합니다.
pub fn blob_id(blob: &BlobInfo) -> Result<String, ArtifactError> {
    let bytes = serde_json::to_vec(blob)?;
    Ok(sha256_bytes(&bytes))
}
