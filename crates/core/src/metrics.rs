//! 메트릭 이름 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `layerprobe_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(layerprobe_core::metrics::FILES_WALKED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 분석기 타입 레이블 키 (alpine, apk, npm, ...)
pub const LABEL_ANALYZER: &str = "analyzer";

/// 결과 레이블 키 (success, failure, cancelled)
pub const LABEL_RESULT: &str = "result";

// ─── Artifact 메트릭 ───────────────────────────────────────────────

/// 순회된 일반 파일 수 (counter)
pub const FILES_WALKED_TOTAL: &str = "layerprobe_files_walked_total";

/// 순회 중 건너뛴 디렉토리/엔트리 수 (counter)
pub const WALK_ERRORS_TOTAL: &str = "layerprobe_walk_errors_total";

/// 분석기 실패 수 (counter, label: analyzer)
pub const ANALYZER_FAILURES_TOTAL: &str = "layerprobe_analyzer_failures_total";

/// 캐시에 저장 요청된 blob 수 (counter)
pub const BLOBS_STORED_TOTAL: &str = "layerprobe_blobs_stored_total";

/// 검사 실행 수 (counter, label: result)
pub const INSPECTIONS_TOTAL: &str = "layerprobe_inspections_total";

/// 검사 소요 시간 (histogram, 초)
pub const INSPECTION_DURATION_SECONDS: &str = "layerprobe_inspection_duration_seconds";
