//! blob 캐시
//!
//! [`ArtifactCache`]는 blobID를 키로 정규 레코드를 저장하는 계약입니다.
//! 같은 키로 다시 저장하는 것은 아무 일도 하지 않으며 성공합니다.
//!
//! # 백엔드
//!
//! - [`memory::MemoryCache`]: 프로세스 메모리 (테스트, 일회성 실행)
//! - [`fs::FsCache`]: `<dir>/blob/<hex>.json` 파일 (원자적 쓰기)

pub mod fs;
pub mod memory;

use std::sync::Arc;

use layerprobe_core::config::{CacheBackend, CacheConfig};
use layerprobe_core::types::BlobInfo;

use crate::error::CacheError;

/// blob 캐시 trait
///
/// 검사 엔진은 `spawn_blocking` 안에서 이 trait을 호출하므로
/// 구현체는 blocking I/O를 수행해도 됩니다.
pub trait ArtifactCache: Send + Sync {
    /// 레코드를 저장합니다. 이미 있는 키면 아무 일도 하지 않습니다.
    fn put_blob(&self, blob_id: &str, blob: &BlobInfo) -> Result<(), CacheError>;

    /// 레코드를 조회합니다.
    fn get_blob(&self, blob_id: &str) -> Result<Option<BlobInfo>, CacheError>;

    /// 주어진 키 중 저장되어 있지 않은 키를 입력 순서대로 반환합니다.
    fn missing_blobs(&self, blob_ids: &[String]) -> Result<Vec<String>, CacheError> {
        let mut missing = Vec::new();
        for id in blob_ids {
            if self.get_blob(id)?.is_none() {
                missing.push(id.clone());
            }
        }
        Ok(missing)
    }
}

/// 설정에 맞는 캐시 백엔드를 생성합니다.
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn ArtifactCache>, CacheError> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(memory::MemoryCache::new())),
        CacheBackend::Fs => Ok(Arc::new(fs::FsCache::open(&config.dir)?)),
    }
}
