#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use layerprobe_analyzer::{AnalyzerType, FileFinding};
use layerprobe_artifact::canonical::{blob_id, canonicalize};
use layerprobe_artifact::CompositeResult;
use layerprobe_core::types::{Library, Package};

/// 퍼저용 분석 결과 입력
#[derive(Arbitrary, Debug)]
struct FuzzFindings {
    packages: Vec<FuzzPackage>,
    libraries: Vec<FuzzLibrary>,
}

#[derive(Arbitrary, Debug)]
struct FuzzPackage {
    file: u8,
    name: String,
    version: String,
}

#[derive(Arbitrary, Debug)]
struct FuzzLibrary {
    file: u8,
    name: String,
    version: String,
}

fn findings(input: &FuzzFindings) -> Vec<(String, AnalyzerType, FileFinding)> {
    let mut out = Vec::new();
    for p in &input.packages {
        out.push((
            format!("pkg/{}", p.file % 4),
            AnalyzerType::Apk,
            FileFinding::Packages(vec![Package::new(p.name.clone(), p.version.clone())]),
        ));
    }
    for l in &input.libraries {
        out.push((
            format!("app/{}/package-lock.json", l.file % 4),
            AnalyzerType::Npm,
            FileFinding::Application {
                app_type: "npm".to_owned(),
                libraries: vec![Library {
                    name: l.name.clone(),
                    version: l.version.clone(),
                }],
            },
        ));
    }
    out
}

fn compute(items: Vec<(String, AnalyzerType, FileFinding)>) -> String {
    let mut composite = CompositeResult::new();
    for (path, analyzer, finding) in items {
        if composite.merge(&path, analyzer, finding).is_err() {
            return String::new();
        }
    }
    let blob = canonicalize(composite, "sha256:fuzz".to_owned());
    blob_id(&blob).unwrap_or_default()
}

fuzz_target!(|input: FuzzFindings| {
    // 입력 크기 제한 (퍼징 성능)
    if input.packages.len() + input.libraries.len() > 256 {
        return;
    }

    let forward = findings(&input);
    let mut reversed = findings(&input);
    reversed.reverse();

    // 병합 순서와 무관하게 같은 blobID
    assert_eq!(compute(forward), compute(reversed));
});
