//! 분석기 디스패치 엔진
//!
//! [`DispatchEngine`]은 [`Walk`]가 내놓는 파일을 한정된 동시성으로 분석하고,
//! 결과를 단일 병합 루프에서 [`CompositeResult`]에 합칩니다.
//!
//! # 동작 방식
//!
//! 1. blocking 태스크가 순회 시퀀스를 소비하며 bounded 채널로 파일을 보냅니다.
//! 2. 병합 루프가 파일을 받아 세마포어 허가를 얻은 뒤 분석 태스크를 생성합니다.
//!    동시에 분석 중인 파일 수는 `concurrency`를 넘지 않습니다.
//! 3. 각 분석 태스크는 `spawn_blocking` 안에서 파일을 한 번 읽고, 다이제스트를 계산하고,
//!    해당 경로를 처리하는 분석기를 그룹 순서대로 호출합니다.
//! 4. 완료된 결과는 병합 루프만 누적기에 씁니다.
//!
//! # 실패 처리
//!
//! - 분석기의 해석 실패: 경고 후 기록하고 계속 진행
//! - 순회 후 사라진 파일: 경고 후 제외
//! - 그 외 파일 읽기 실패, OS 충돌: 즉시 중단
//! - 취소: 진행 중인 태스크가 끝나기를 기다린 뒤 `Cancelled` 반환

use std::io::Read;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use layerprobe_analyzer::{
    ActiveAnalyzers, AnalysisInput, Analyzer, AnalyzerError, AnalyzerType, FileFinding,
};
use layerprobe_core::digest::{sha256_bytes, sha256_reader};
use layerprobe_core::metrics as m;

use crate::canonical::ManifestEntry;
use crate::composite::CompositeResult;
use crate::error::ArtifactError;
use crate::walker::{Walk, WalkEntry};

/// 분석기 하나가 파일 하나를 해석하지 못한 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerFailure {
    /// 실패한 분석기
    pub analyzer: AnalyzerType,
    /// 루트 기준 상대 경로
    pub path: String,
    /// 실패 사유
    pub reason: String,
}

/// 디스패치 결과
#[derive(Debug, Default)]
pub struct AnalysisOutput {
    /// 누적된 분석 결과
    pub composite: CompositeResult,
    /// diffID 입력이 되는 파일 목록
    pub manifest: Vec<ManifestEntry>,
    /// 분석기 실패 목록 (경로, 분석기 순)
    pub failures: Vec<AnalyzerFailure>,
    /// 다이제스트에 포함된 파일 수
    pub files_walked: usize,
    /// 분석기가 한 번 이상 호출된 파일 수
    pub files_analyzed: usize,
    /// 순회 후 사라져 제외된 파일 수
    pub files_vanished: usize,
    /// 순회 중 건너뛴 엔트리 수
    pub walk_errors: usize,
}

impl AnalysisOutput {
    fn absorb(&mut self, outcome: FileOutcome) -> Result<(), ArtifactError> {
        let report = match outcome {
            FileOutcome::Vanished => {
                self.files_vanished += 1;
                return Ok(());
            }
            FileOutcome::Done(report) => report,
        };

        for (analyzer, finding) in report.findings {
            self.composite
                .merge(&report.manifest.path, analyzer, finding)?;
        }
        self.failures.extend(report.failures);
        if report.analyzed {
            self.files_analyzed += 1;
        }
        self.files_walked += 1;
        self.manifest.push(report.manifest);
        Ok(())
    }
}

/// 파일 하나의 처리 결과
enum FileOutcome {
    Done(FileReport),
    /// 순회 이후 삭제됨
    Vanished,
}

struct FileReport {
    manifest: ManifestEntry,
    findings: Vec<(AnalyzerType, FileFinding)>,
    failures: Vec<AnalyzerFailure>,
    analyzed: bool,
}

/// 한정 동시성 디스패치 엔진
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    analyzers: ActiveAnalyzers,
    concurrency: usize,
    max_file_size: u64,
}

impl DispatchEngine {
    /// 새 엔진을 생성합니다.
    ///
    /// `concurrency`가 0이면 1로 취급합니다.
    pub fn new(analyzers: ActiveAnalyzers, concurrency: usize, max_file_size: u64) -> Self {
        Self {
            analyzers,
            concurrency: concurrency.max(1),
            max_file_size,
        }
    }

    /// 활성 분석기 집합
    pub fn analyzers(&self) -> &ActiveAnalyzers {
        &self.analyzers
    }

    /// 순회 시퀀스 전체를 분석합니다.
    ///
    /// # Errors
    ///
    /// - 파일 읽기 실패: `FileRead`
    /// - OS 충돌: `OsConflict`
    /// - 취소: `Cancelled`
    pub async fn run(
        &self,
        walk: Walk,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutput, ArtifactError> {
        let (tx, mut rx) = mpsc::channel::<WalkEntry>(self.concurrency * 2);

        let producer_cancel = cancel.clone();
        let producer = tokio::task::spawn_blocking(move || {
            let mut walk = walk;
            for entry in walk.by_ref() {
                if producer_cancel.is_cancelled() {
                    break;
                }
                if tx.blocking_send(entry).is_err() {
                    // 병합 루프가 중단됨
                    break;
                }
            }
            walk.errors()
        });

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Result<FileOutcome, ArtifactError>> = JoinSet::new();
        let mut output = AnalysisOutput::default();
        let mut rx_open = true;

        let result: Result<(), ArtifactError> = loop {
            if !rx_open && tasks.is_empty() {
                break Ok(());
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    break Err(ArtifactError::Cancelled);
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    let outcome = match joined {
                        Ok(outcome) => outcome,
                        Err(e) => Err(ArtifactError::Worker(format!("analysis task failed: {e}"))),
                    };
                    if let Err(e) = outcome.and_then(|o| output.absorb(o)) {
                        break Err(e);
                    }
                }

                received = rx.recv(), if rx_open => {
                    let Some(entry) = received else {
                        rx_open = false;
                        continue;
                    };

                    let permit = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
                    };
                    let Some(permit) = permit else {
                        break Err(ArtifactError::Cancelled);
                    };

                    let matched = self.analyzers.matching(&entry.relative_path);
                    debug!(path = %entry.relative_path, analyzers = matched.len(), "dispatching file");
                    let max_file_size = self.max_file_size;
                    tasks.spawn(async move {
                        let _permit = permit;
                        match tokio::task::spawn_blocking(move || {
                            analyze_file(entry, matched, max_file_size)
                        })
                        .await
                        {
                            Ok(outcome) => outcome,
                            Err(e) => Err(ArtifactError::Worker(format!("spawn_blocking failed: {e}"))),
                        }
                    });
                }
            }
        };

        // 생산자를 멈추고 진행 중인 분석이 끝나기를 기다림
        drop(rx);
        if result.is_err() {
            while tasks.join_next().await.is_some() {}
        }
        let walk_errors = producer
            .await
            .map_err(|e| ArtifactError::Worker(format!("walk task failed: {e}")));

        result?;
        output.walk_errors = walk_errors?;
        output
            .failures
            .sort_by(|a, b| (&a.path, a.analyzer).cmp(&(&b.path, b.analyzer)));
        debug!(
            files_walked = output.files_walked,
            files_analyzed = output.files_analyzed,
            failures = output.failures.len(),
            "dispatch finished"
        );
        Ok(output)
    }
}

/// 파일 하나를 읽고 해당 분석기를 모두 호출합니다.
///
/// blocking I/O를 수행하므로 `spawn_blocking` 안에서만 호출합니다.
fn analyze_file(
    entry: WalkEntry,
    analyzers: Vec<Arc<dyn Analyzer>>,
    max_file_size: u64,
) -> Result<FileOutcome, ArtifactError> {
    let read_err = |source: std::io::Error| ArtifactError::FileRead {
        path: entry.relative_path.clone(),
        source,
    };

    let mut file = match entry.open() {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %entry.relative_path, "file vanished after walk, skipping");
            return Ok(FileOutcome::Vanished);
        }
        Err(e) => return Err(read_err(e)),
    };

    if analyzers.is_empty() || entry.size > max_file_size {
        if !analyzers.is_empty() {
            warn!(
                path = %entry.relative_path,
                size = entry.size,
                max_file_size,
                "file exceeds max_file_size, digest only"
            );
        }
        let (digest, size) = sha256_reader(&mut file).map_err(read_err)?;
        return Ok(FileOutcome::Done(FileReport {
            manifest: ManifestEntry {
                path: entry.relative_path.clone(),
                mode: entry.mode,
                size,
                digest,
            },
            findings: Vec::new(),
            failures: Vec::new(),
            analyzed: false,
        }));
    }

    let mut bytes = Vec::with_capacity(usize::try_from(entry.size).unwrap_or(0));
    file.read_to_end(&mut bytes).map_err(read_err)?;
    drop(file);

    let size = bytes.len() as u64;
    let mut findings = Vec::new();
    let mut failures = Vec::new();

    for analyzer in &analyzers {
        let analyzer_type = analyzer.analyzer_type();
        let mut reader: &[u8] = &bytes;
        let input = AnalysisInput::new(&entry.relative_path, &mut reader, size);

        match analyzer.analyze(input) {
            Ok(Some(finding)) => findings.push((analyzer_type, finding)),
            Ok(None) => {}
            Err(AnalyzerError::Io { source, .. }) => return Err(read_err(source)),
            Err(e) => {
                warn!(
                    analyzer = %analyzer_type,
                    path = %entry.relative_path,
                    error = %e,
                    "analyzer failed, continuing"
                );
                counter!(m::ANALYZER_FAILURES_TOTAL, m::LABEL_ANALYZER => analyzer_type.as_str())
                    .increment(1);
                failures.push(AnalyzerFailure {
                    analyzer: analyzer_type,
                    path: entry.relative_path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(FileOutcome::Done(FileReport {
        manifest: ManifestEntry {
            path: entry.relative_path.clone(),
            mode: entry.mode,
            size,
            digest: sha256_bytes(&bytes),
        },
        findings,
        failures,
        analyzed: true,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use layerprobe_analyzer::AnalyzerRegistry;
    use layerprobe_core::types::Os;

    use super::*;
    use crate::walker::{SkipRules, TreeWalker};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn engine(disabled: &[AnalyzerType], concurrency: usize) -> DispatchEngine {
        let disabled: HashSet<AnalyzerType> = disabled.iter().copied().collect();
        let active = AnalyzerRegistry::with_defaults().filtered(&disabled);
        DispatchEngine::new(active, concurrency, 1024 * 1024)
    }

    fn walk(root: &Path) -> Walk {
        TreeWalker::new(root, SkipRules::default(), false)
            .walk()
            .unwrap()
    }

    #[tokio::test]
    async fn run_merges_os_and_packages() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "etc/alpine-release", "3.11.6\n");
        write(
            dir.path(),
            "lib/apk/db/installed",
            "P:musl\nV:1.1.24-r2\no:musl\n\n",
        );
        write(dir.path(), "bin/busybox", "binary");

        let output = engine(&[], 4)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            output.composite.os().map(|p| p.os.clone()),
            Some(Os::new("alpine", "3.11.6"))
        );
        assert_eq!(output.composite.package_file_count(), 1);
        assert_eq!(output.files_walked, 3);
        assert_eq!(output.files_analyzed, 2);
        assert_eq!(output.manifest.len(), 3);
        assert!(output.failures.is_empty());
    }

    #[tokio::test]
    async fn disabled_analyzers_still_digest_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "etc/alpine-release", "3.11.6\n");

        let output = engine(&[AnalyzerType::Alpine], 1)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.composite.is_empty());
        assert_eq!(output.files_walked, 1);
        assert_eq!(output.files_analyzed, 0);
    }

    #[tokio::test]
    async fn parse_failure_is_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib/apk/db/installed", "garbage without colon\n");
        write(dir.path(), "etc/alpine-release", "3.11.6\n");

        let output = engine(&[], 2)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].analyzer, AnalyzerType::Apk);
        assert_eq!(output.failures[0].path, "lib/apk/db/installed");
        assert!(output.composite.os().is_some());
        assert_eq!(output.composite.package_file_count(), 0);
    }

    #[tokio::test]
    async fn oversized_files_are_digested_but_not_analyzed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "etc/alpine-release", "3.11.6\n");
        let active = AnalyzerRegistry::with_defaults().filtered(&HashSet::new());
        let engine = DispatchEngine::new(active, 2, 3);

        let output = engine
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.composite.os().is_none());
        assert_eq!(output.manifest.len(), 1);
        assert_eq!(output.manifest[0].size, 7);
    }

    #[tokio::test]
    async fn conflicting_os_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "etc/alpine-release", "3.11.6\n");
        write(
            dir.path(),
            "etc/os-release",
            "ID=debian\nVERSION_ID=\"11\"\n",
        );

        let err = engine(&[], 2)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::OsConflict { .. }));
    }

    #[tokio::test]
    async fn cancelled_token_stops_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            write(dir.path(), &format!("files/{i:03}.txt"), "x");
        }
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine(&[], 2)
            .run(walk(dir.path()), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn result_does_not_depend_on_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "etc/alpine-release", "3.11.6\n");
        write(
            dir.path(),
            "lib/apk/db/installed",
            "P:musl\nV:1.1.24-r2\n\nP:zlib\nV:1.2.11-r3\n\n",
        );
        for i in 0..20 {
            write(dir.path(), &format!("data/{i}.bin"), &format!("payload {i}"));
        }

        let serial = engine(&[], 1)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();
        let parallel = engine(&[], 16)
            .run(walk(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        let a = crate::canonical::diff_id(serial.manifest).unwrap();
        let b = crate::canonical::diff_id(parallel.manifest).unwrap();
        assert_eq!(a, b);
        assert_eq!(serial.files_walked, parallel.files_walked);
    }
}
