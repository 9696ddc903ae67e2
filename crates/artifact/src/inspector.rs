//! 아티팩트 검사 오케스트레이터 -- 전체 검사 흐름 관리
//!
//! [`Artifact`]는 디렉토리 하나를 검사하여 정규화된 레코드를 캐시에 저장하고
//! [`ArtifactReference`]를 반환합니다.
//!
//! # 검사 단계
//!
//! 1. 루트 확인 및 순회 시작 (`spawn_blocking`)
//! 2. 디스패치 및 병합 ([`DispatchEngine`])
//! 3. diffID 계산, 정규화, blobID 계산
//! 4. `ArtifactCache::put_blob` (`spawn_blocking`)
//!
//! 각 단계 사이에서 취소 여부를 확인하며, 취소되면 캐시에 아무것도 쓰지 않습니다.
//!
//! # 사용 예시
//!
//! ```no_run
//! use std::sync::Arc;
//! use layerprobe_artifact::{Artifact, MemoryCache, ScannerOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), layerprobe_artifact::ArtifactError> {
//! let artifact = Artifact::new(
//!     "/var/lib/rootfs",
//!     Arc::new(MemoryCache::new()),
//!     [],
//!     ScannerOptions::default(),
//! )?;
//! let reference = artifact.inspect(&CancellationToken::new()).await?;
//! println!("{}", reference.id);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use layerprobe_analyzer::{ActiveAnalyzers, AnalyzerRegistry, AnalyzerType};
use layerprobe_core::metrics as m;
use layerprobe_core::types::ArtifactReference;

use crate::cache::ArtifactCache;
use crate::canonical;
use crate::config::ScannerOptions;
use crate::dispatch::{AnalysisOutput, AnalyzerFailure, DispatchEngine};
use crate::error::ArtifactError;
use crate::walker::TreeWalker;

/// 검사 요약
///
/// CLI 출력용이며 저장되는 레코드에는 포함되지 않습니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectionReport {
    /// 계산된 diffID
    pub diff_id: String,
    /// 다이제스트에 포함된 파일 수
    pub files_walked: usize,
    /// 분석기가 호출된 파일 수
    pub files_analyzed: usize,
    /// 순회 후 사라진 파일 수
    pub files_vanished: usize,
    /// 순회 중 건너뛴 엔트리 수
    pub walk_errors: usize,
    /// 복구된 분석기 실패 목록
    pub failures: Vec<AnalyzerFailure>,
}

/// [`Artifact`] 빌더
pub struct ArtifactBuilder {
    root: PathBuf,
    cache: Arc<dyn ArtifactCache>,
    registry: Option<Arc<AnalyzerRegistry>>,
    disabled: HashSet<AnalyzerType>,
    options: ScannerOptions,
    name: Option<String>,
}

impl ArtifactBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new(root: impl Into<PathBuf>, cache: Arc<dyn ArtifactCache>) -> Self {
        Self {
            root: root.into(),
            cache,
            registry: None,
            disabled: HashSet::new(),
            options: ScannerOptions::default(),
            name: None,
        }
    }

    /// 분석기 레지스트리를 지정합니다. 지정하지 않으면 기본 레지스트리를 사용합니다.
    pub fn registry(mut self, registry: Arc<AnalyzerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 분석기 하나를 비활성화합니다.
    pub fn disable(mut self, analyzer: AnalyzerType) -> Self {
        self.disabled.insert(analyzer);
        self
    }

    /// 비활성화할 분석기를 추가합니다.
    pub fn disabled(mut self, analyzers: impl IntoIterator<Item = AnalyzerType>) -> Self {
        self.disabled.extend(analyzers);
        self
    }

    /// 검사 옵션을 지정합니다.
    pub fn options(mut self, options: ScannerOptions) -> Self {
        self.options = options;
        self
    }

    /// 결과 참조 이름을 지정합니다. 지정하지 않으면 `options.artifact_name`을 사용합니다.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 검사기를 빌드합니다.
    ///
    /// 루트 경로의 존재 여부는 검사 시점에 확인합니다.
    ///
    /// # Errors
    ///
    /// 빈 루트 경로, 빈 이름, 잘못된 옵션은 `ArtifactError::Config`
    pub fn build(self) -> Result<Artifact, ArtifactError> {
        if self.root.as_os_str().is_empty() {
            return Err(ArtifactError::config("root", "must not be empty"));
        }
        self.options.validate()?;
        let rules = self.options.skip_rules()?;

        let name = self
            .name
            .unwrap_or_else(|| self.options.artifact_name.clone());
        if name.trim().is_empty() {
            return Err(ArtifactError::config("name", "must not be empty"));
        }

        let mut disabled = self.disabled;
        disabled.extend(self.options.disabled_analyzers.iter().copied());

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(AnalyzerRegistry::with_defaults()));
        let active = registry.filtered(&disabled);
        debug!(
            root = %self.root.display(),
            analyzers = ?active.types(),
            "artifact inspector built"
        );

        Ok(Artifact {
            walker: TreeWalker::new(self.root.clone(), rules, self.options.follow_symlinks),
            engine: DispatchEngine::new(
                active,
                self.options.concurrency,
                self.options.max_file_size as u64,
            ),
            root: self.root,
            cache: self.cache,
            name,
        })
    }
}

/// 디렉토리 하나에 대한 검사기
pub struct Artifact {
    root: PathBuf,
    cache: Arc<dyn ArtifactCache>,
    walker: TreeWalker,
    engine: DispatchEngine,
    name: String,
}

impl Artifact {
    /// 기본 레지스트리로 검사기를 생성합니다.
    ///
    /// `disabled`와 `options.disabled_analyzers`의 합집합이 비활성화됩니다.
    pub fn new(
        root: impl Into<PathBuf>,
        cache: Arc<dyn ArtifactCache>,
        disabled: impl IntoIterator<Item = AnalyzerType>,
        options: ScannerOptions,
    ) -> Result<Self, ArtifactError> {
        ArtifactBuilder::new(root, cache)
            .disabled(disabled)
            .options(options)
            .build()
    }

    /// 결과 참조 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 활성 분석기 집합
    pub fn active_analyzers(&self) -> &ActiveAnalyzers {
        self.engine.analyzers()
    }

    /// 디렉토리를 검사하고 결과를 캐시에 저장합니다.
    ///
    /// # Errors
    ///
    /// - 루트 접근 불가: `RootInaccessible`
    /// - 파일 읽기 실패: `FileRead`
    /// - OS 충돌: `OsConflict`
    /// - 캐시 저장 실패: `CacheWrite` (`failed to store blob`)
    /// - 취소: `Cancelled` (캐시에 쓰지 않음)
    pub async fn inspect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ArtifactReference, ArtifactError> {
        self.inspect_with_report(cancel)
            .await
            .map(|(reference, _)| reference)
    }

    /// [`inspect`](Self::inspect)와 같지만 검사 요약도 함께 반환합니다.
    pub async fn inspect_with_report(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(ArtifactReference, InspectionReport), ArtifactError> {
        let start = Instant::now();
        let result = self.run(cancel).await;

        let label = match &result {
            Ok(_) => "success",
            Err(e) if e.is_cancelled() => "cancelled",
            Err(_) => "failure",
        };
        counter!(m::INSPECTIONS_TOTAL, m::LABEL_RESULT => label).increment(1);
        histogram!(m::INSPECTION_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(ArtifactReference, InspectionReport), ArtifactError> {
        ensure_active(cancel)?;

        let walker = self.walker.clone();
        let walk = tokio::task::spawn_blocking(move || walker.walk())
            .await
            .map_err(|e| ArtifactError::Worker(format!("spawn_blocking failed: {e}")))??;

        let AnalysisOutput {
            composite,
            manifest,
            failures,
            files_walked,
            files_analyzed,
            files_vanished,
            walk_errors,
        } = self.engine.run(walk, cancel).await?;
        ensure_active(cancel)?;

        let diff_id = canonical::diff_id(manifest)?;
        let blob = canonical::canonicalize(composite, diff_id.clone());
        let blob_id = canonical::blob_id(&blob)?;
        ensure_active(cancel)?;

        let cache = Arc::clone(&self.cache);
        let put_id = blob_id.clone();
        tokio::task::spawn_blocking(move || cache.put_blob(&put_id, &blob))
            .await
            .map_err(|e| ArtifactError::Worker(format!("spawn_blocking failed: {e}")))?
            .map_err(|source| ArtifactError::CacheWrite {
                blob_id: blob_id.clone(),
                source,
            })?;
        counter!(m::BLOBS_STORED_TOTAL).increment(1);

        info!(
            name = %self.name,
            root = %self.root.display(),
            diff_id = %diff_id,
            blob_id = %blob_id,
            files_walked,
            failures = failures.len(),
            "inspection complete"
        );

        let report = InspectionReport {
            diff_id,
            files_walked,
            files_analyzed,
            files_vanished,
            walk_errors,
            failures,
        };
        Ok((ArtifactReference::single(self.name.clone(), blob_id), report))
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), ArtifactError> {
    if cancel.is_cancelled() {
        Err(ArtifactError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;

    #[test]
    fn build_rejects_empty_root() {
        let err = ArtifactBuilder::new("", Arc::new(MemoryCache::new()))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn build_does_not_touch_filesystem() {
        let artifact = Artifact::new(
            "/nonexistent/layerprobe",
            Arc::new(MemoryCache::new()),
            [],
            ScannerOptions::default(),
        );
        assert!(artifact.is_ok());
    }

    #[test]
    fn disabled_sets_are_merged() {
        let options = ScannerOptions {
            disabled_analyzers: vec![AnalyzerType::Apk],
            ..ScannerOptions::default()
        };
        let artifact = Artifact::new(
            "/tmp",
            Arc::new(MemoryCache::new()),
            [AnalyzerType::Alpine],
            options,
        )
        .unwrap();
        let types = artifact.active_analyzers().types();
        assert!(!types.contains(&AnalyzerType::Apk));
        assert!(!types.contains(&AnalyzerType::Alpine));
        assert!(types.contains(&AnalyzerType::Dpkg));
    }

    #[test]
    fn name_defaults_to_option() {
        let artifact = Artifact::new(
            "/tmp",
            Arc::new(MemoryCache::new()),
            [],
            ScannerOptions::default(),
        )
        .unwrap();
        assert_eq!(artifact.name(), "host");

        let named = ArtifactBuilder::new("/tmp", Arc::new(MemoryCache::new()))
            .name("rootfs")
            .build()
            .unwrap();
        assert_eq!(named.name(), "rootfs");
    }

    #[test]
    fn invalid_options_fail_at_build() {
        let options = ScannerOptions {
            concurrency: 0,
            ..ScannerOptions::default()
        };
        assert!(
            Artifact::new("/tmp", Arc::new(MemoryCache::new()), [], options).is_err()
        );
    }

    #[tokio::test]
    async fn cancelled_before_start_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MemoryCache::new());
        let artifact = Artifact::new(
            dir.path(),
            cache.clone(),
            [],
            ScannerOptions::default(),
        )
        .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = artifact.inspect(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(cache.is_empty());
    }
}
