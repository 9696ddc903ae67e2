//! layerprobe 분석기 크레이트
//!
//! 파일 하나를 받아 OS 식별 정보, 패키지 목록, 애플리케이션 의존성,
//! 설정 파일 내용을 뽑아내는 분석기들과, 이를 묶는 불변 레지스트리를 제공합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`AnalyzerError`)
//! - [`types`]: Analyzer tags and findings (`AnalyzerType`, `AnalyzerGroup`, `FileFinding`)
//! - [`analyzer`]: Capability trait (`Analyzer`, `AnalysisInput`)
//! - [`registry`]: Immutable registry snapshot (`RegistryBuilder`, `AnalyzerRegistry`, `ActiveAnalyzers`)
//! - [`os`]: OS identity analyzers (`AlpineReleaseAnalyzer`, `OsReleaseAnalyzer`)
//! - [`pkg`]: Package database analyzers (`ApkAnalyzer`, `DpkgAnalyzer`)
//! - [`lang`]: Application lockfile analyzers (`NpmLockAnalyzer`, `CargoLockAnalyzer`)
//! - [`config`]: Configuration file analyzers (`DockerfileAnalyzer`)
//!
//! # Architecture
//!
//! ```text
//! RegistryBuilder --register()--> AnalyzerRegistry (immutable)
//!                                        |
//!                              filtered(disabled set)
//!                                        |
//!                                 ActiveAnalyzers
//!                         (OS group -> Package group -> Other)
//!                                        |
//!                  relative path --> matching(path) --> analyze(input) --> FileFinding
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod lang;
pub mod os;
pub mod pkg;
pub mod registry;
pub mod types;

// --- Public API Re-exports ---

// Trait
pub use analyzer::{AnalysisInput, Analyzer};

// Error
pub use error::AnalyzerError;

// Types
pub use types::{AnalyzerGroup, AnalyzerType, FileFinding};

// Registry
pub use registry::{ActiveAnalyzers, AnalyzerRegistry, RegistryBuilder};

// Built-in analyzers
pub use config::dockerfile::DockerfileAnalyzer;
pub use lang::cargo::CargoLockAnalyzer;
pub use lang::npm::NpmLockAnalyzer;
pub use os::alpine::AlpineReleaseAnalyzer;
pub use os::release::OsReleaseAnalyzer;
pub use pkg::apk::ApkAnalyzer;
pub use pkg::dpkg::DpkgAnalyzer;
