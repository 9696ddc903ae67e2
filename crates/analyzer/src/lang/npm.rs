//! package-lock.json 분석기
//!
//! [`NpmLockAnalyzer`]는 NPM의 package-lock.json 파일을 파싱하여
//! 애플리케이션 의존성 목록을 만듭니다.
//!
//! # package-lock.json v3 형식 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/lodash": { "version": "4.17.21", "resolved": "...", "integrity": "sha512-..." }
//!   }
//! }
//! ```
//!
//! v1 파일에는 `packages`가 없고 중첩된 `dependencies`만 있습니다.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use layerprobe_core::types::Library;

use crate::analyzer::{AnalysisInput, Analyzer, base_name};
use crate::error::AnalyzerError;
use crate::types::{AnalyzerType, FileFinding};

/// 애플리케이션 타입 이름
pub const APP_TYPE_NPM: &str = "npm";

const LOCKFILE_NAME: &str = "package-lock.json";

/// package-lock.json 분석기
pub struct NpmLockAnalyzer;

/// package-lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct NpmLockFile {
    #[serde(default)]
    packages: HashMap<String, NpmPackageEntry>,
    #[serde(default)]
    dependencies: HashMap<String, NpmDependencyEntry>,
}

/// v2/v3 `packages` 항목 (파싱용)
#[derive(Deserialize)]
struct NpmPackageEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    link: bool,
}

/// v1 `dependencies` 항목 (파싱용)
#[derive(Deserialize)]
struct NpmDependencyEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, NpmDependencyEntry>,
}

impl Analyzer for NpmLockAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Npm
    }

    fn required(&self, file_path: &str) -> bool {
        base_name(file_path) == LOCKFILE_NAME && !file_path.contains("node_modules/")
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let libraries = parse_lockfile(&content, input.file_path)?;
        if libraries.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileFinding::Application {
            app_type: APP_TYPE_NPM.to_owned(),
            libraries,
        }))
    }
}

/// lockfile 내용을 의존성 목록으로 변환합니다. 중복은 제거됩니다.
pub fn parse_lockfile(content: &str, file_path: &str) -> Result<Vec<Library>, AnalyzerError> {
    let lock_file: NpmLockFile = serde_json::from_str(content)
        .map_err(|e| AnalyzerError::parse(AnalyzerType::Npm, file_path, e.to_string()))?;

    let mut libraries = BTreeSet::new();

    if lock_file.packages.is_empty() {
        collect_v1(&lock_file.dependencies, &mut libraries);
    } else {
        for (key, entry) in &lock_file.packages {
            // 루트 패키지는 키가 빈 문자열
            if key.is_empty() || entry.link {
                continue;
            }
            let Some(version) = &entry.version else {
                continue; // 버전 없는 항목은 건너뜀
            };
            let name = entry
                .name
                .clone()
                .unwrap_or_else(|| extract_package_name(key));
            libraries.insert(Library {
                name,
                version: version.clone(),
            });
        }
    }

    Ok(libraries.into_iter().collect())
}

fn collect_v1(deps: &HashMap<String, NpmDependencyEntry>, out: &mut BTreeSet<Library>) {
    for (name, entry) in deps {
        if let Some(version) = &entry.version {
            out.insert(Library {
                name: name.clone(),
                version: version.clone(),
            });
        }
        collect_v1(&entry.dependencies, out);
    }
}

/// "node_modules/@scope/name" 또는 "node_modules/name" 에서 패키지명 추출
fn extract_package_name(key: &str) -> String {
    // 마지막 "node_modules/" 이후의 부분을 패키지명으로 사용
    match key.rfind("node_modules/") {
        Some(pos) => key[pos + "node_modules/".len()..].to_owned(),
        None => key.to_owned(),
    }
}
