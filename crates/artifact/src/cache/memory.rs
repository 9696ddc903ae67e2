//! 메모리 캐시 백엔드

use std::collections::HashMap;
use std::sync::RwLock;

use layerprobe_core::types::BlobInfo;

use crate::cache::ArtifactCache;
use crate::error::CacheError;

/// 프로세스 메모리에 레코드를 보관하는 캐시
#[derive(Debug, Default)]
pub struct MemoryCache {
    blobs: RwLock<HashMap<String, BlobInfo>>,
}

impl MemoryCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 레코드 수
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    /// 저장된 레코드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactCache for MemoryCache {
    fn put_blob(&self, blob_id: &str, blob: &BlobInfo) -> Result<(), CacheError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| CacheError::Backend(format!("lock poisoned: {e}")))?;
        blobs
            .entry(blob_id.to_owned())
            .or_insert_with(|| blob.clone());
        Ok(())
    }

    fn get_blob(&self, blob_id: &str) -> Result<Option<BlobInfo>, CacheError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| CacheError::Backend(format!("lock poisoned: {e}")))?;
        Ok(blobs.get(blob_id).cloned())
    }
}
