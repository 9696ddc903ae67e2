//! 파일시스템 캐시 백엔드
//!
//! 레코드 하나를 `<dir>/blob/<hex>.json` 파일 하나로 저장합니다.
//! 쓰기는 같은 디렉토리의 임시 파일에 기록한 뒤 rename하므로,
//! 읽는 쪽은 완성된 파일만 봅니다.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use layerprobe_core::digest::split_sha256;
use layerprobe_core::types::BlobInfo;

use crate::cache::ArtifactCache;
use crate::error::CacheError;

const BLOB_DIR: &str = "blob";

/// 디렉토리 기반 캐시
#[derive(Debug, Clone)]
pub struct FsCache {
    blob_dir: PathBuf,
}

impl FsCache {
    /// 캐시 디렉토리를 열고, 없으면 생성합니다.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let blob_dir = dir.as_ref().join(BLOB_DIR);
        fs::create_dir_all(&blob_dir).map_err(|source| CacheError::Io {
            path: blob_dir.display().to_string(),
            source,
        })?;
        Ok(Self { blob_dir })
    }

    /// blob 파일이 저장되는 디렉토리
    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }

    fn blob_path(&self, blob_id: &str) -> Result<PathBuf, CacheError> {
        let hex = split_sha256(blob_id).ok_or_else(|| CacheError::InvalidId(blob_id.to_owned()))?;
        Ok(self.blob_dir.join(format!("{hex}.json")))
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let temp_path = self
            .blob_dir
            .join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let io_err = |source: std::io::Error| CacheError::Io {
            path: temp_path.display().to_string(),
            source,
        };

        let result = File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, target));

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }
        Ok(())
    }
}

impl ArtifactCache for FsCache {
    fn put_blob(&self, blob_id: &str, blob: &BlobInfo) -> Result<(), CacheError> {
        let target = self.blob_path(blob_id)?;
        if target.exists() {
            debug!(blob_id, "blob already cached");
            return Ok(());
        }
        let bytes = serde_json::to_vec(blob)?;
        self.write_atomic(&target, &bytes)?;
        debug!(blob_id, path = %target.display(), "blob stored");
        Ok(())
    }

    fn get_blob(&self, blob_id: &str) -> Result<Option<BlobInfo>, CacheError> {
        let path = self.blob_path(blob_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn missing_blobs(&self, blob_ids: &[String]) -> Result<Vec<String>, CacheError> {
        let mut missing = Vec::new();
        for id in blob_ids {
            if !self.blob_path(id)?.exists() {
                missing.push(id.clone());
            }
        }
        Ok(missing)
    }
}
