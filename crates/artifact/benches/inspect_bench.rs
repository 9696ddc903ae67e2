//! 아티팩트 검사 벤치마크
//!
//! 정규화, diffID/blobID 계산, 소규모 트리 전체 검사 성능을 측정합니다.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tokio_util::sync::CancellationToken;

use layerprobe_analyzer::{AnalyzerType, FileFinding};
use layerprobe_artifact::canonical::{self, ManifestEntry};
use layerprobe_artifact::{Artifact, CompositeResult, MemoryCache, ScannerOptions};
use layerprobe_core::types::{Os, Package};

fn build_composite(packages: usize) -> CompositeResult {
    let mut composite = CompositeResult::new();
    composite
        .merge(
            "etc/alpine-release",
            AnalyzerType::Alpine,
            FileFinding::Os(Os::new("alpine", "3.11.6")),
        )
        .unwrap();
    // 역순으로 넣어 정렬 비용을 포함
    let list = (0..packages)
        .rev()
        .map(|i| Package::new(format!("pkg-{i:05}"), format!("1.{i}.0-r0")))
        .collect();
    composite
        .merge("lib/apk/db/installed", AnalyzerType::Apk, FileFinding::Packages(list))
        .unwrap();
    composite
}

fn build_manifest(files: usize) -> Vec<ManifestEntry> {
    (0..files)
        .rev()
        .map(|i| ManifestEntry {
            path: format!("usr/lib/file-{i:06}"),
            mode: 0o100644,
            size: i as u64,
            digest: layerprobe_core::digest::sha256_bytes(format!("{i}").as_bytes()),
        })
        .collect()
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize_blob_id");
    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || build_composite(size),
                |composite| {
                    let blob = canonical::canonicalize(composite, "sha256:bench".to_owned());
                    black_box(canonical::blob_id(&blob).unwrap())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_diff_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_id");
    for size in [100, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || build_manifest(size),
                |manifest| black_box(canonical::diff_id(manifest).unwrap()),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_inspect(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let installed: String = (0..200)
        .map(|i| format!("P:pkg-{i}\nV:1.{i}.0-r0\no:pkg-{i}\n\n"))
        .collect();
    let files = [
        ("etc/alpine-release", "3.11.6\n".to_owned()),
        ("lib/apk/db/installed", installed),
    ];
    for (rel, content) in &files {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    for i in 0..100 {
        let path = dir.path().join(format!("usr/bin/tool-{i}"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, vec![b'x'; 4096]).unwrap();
    }

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let artifact = Artifact::new(
        dir.path(),
        Arc::new(MemoryCache::new()),
        [],
        ScannerOptions::default(),
    )
    .unwrap();

    c.bench_function("inspect_small_rootfs", |b| {
        b.iter(|| {
            runtime
                .block_on(artifact.inspect(&CancellationToken::new()))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_canonicalize, bench_diff_id, bench_inspect);
criterion_main!(benches);
