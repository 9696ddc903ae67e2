//! layerprobe 아티팩트 검사 크레이트
//!
//! 디렉토리 트리 하나를 검사하여 OS 식별 정보, 패키지 목록, 애플리케이션 의존성,
//! 설정 파일 분석 결과를 하나의 정규화된 레코드([`BlobInfo`](layerprobe_core::BlobInfo))로
//! 만들고, 콘텐츠 해시(blobID)를 키로 캐시에 저장합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ArtifactError`, `CacheError`)
//! - [`config`]: Scanner options (`ScannerOptions`, builder)
//! - [`walker`]: Lazy directory walk (`TreeWalker`, `Walk`, `WalkEntry`, `SkipRules`)
//! - [`dispatch`]: Bounded concurrent analyzer dispatch (`DispatchEngine`, `AnalysisOutput`)
//! - [`composite`]: Findings accumulator (`CompositeResult`)
//! - [`canonical`]: Canonical record and content hashes (`canonicalize`, `diff_id`, `blob_id`)
//! - [`cache`]: Blob store contract and backends (`ArtifactCache`, `MemoryCache`, `FsCache`)
//! - [`inspector`]: Top-level orchestrator (`Artifact`, `ArtifactBuilder`, `InspectionReport`)
//!
//! # Architecture
//!
//! ```text
//! root dir --> TreeWalker --> Walk (lazy) --> mpsc --> DispatchEngine (Semaphore + JoinSet)
//!                                                           |
//!                                             ActiveAnalyzers::matching(path)
//!                                                           |
//!                                                 single merge loop
//!                                                           |
//!                                                   CompositeResult
//!                                                           |
//!                                 canonicalize --> BlobInfo --> diffID / blobID
//!                                                           |
//!                                               ArtifactCache::put_blob
//!                                                           |
//!                                                 ArtifactReference
//! ```

pub mod cache;
pub mod canonical;
pub mod composite;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod inspector;
pub mod walker;

// --- Public API Re-exports ---

// Inspector (main orchestrator)
pub use inspector::{Artifact, ArtifactBuilder, InspectionReport};

// Configuration
pub use config::{ScannerOptions, ScannerOptionsBuilder};

// Error
pub use error::{ArtifactError, CacheError};

// Cache
pub use cache::fs::FsCache;
pub use cache::memory::MemoryCache;
pub use cache::ArtifactCache;

// Pipeline stages
pub use composite::CompositeResult;
pub use dispatch::{AnalysisOutput, AnalyzerFailure, DispatchEngine};
pub use walker::{SkipRules, TreeWalker, Walk, WalkEntry};
