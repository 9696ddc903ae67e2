//! OS 식별 분석기
//!
//! - `etc/alpine-release` -- [`AlpineReleaseAnalyzer`](alpine::AlpineReleaseAnalyzer)
//! - `etc/os-release`, `usr/lib/os-release` -- [`OsReleaseAnalyzer`](release::OsReleaseAnalyzer)

pub mod alpine;
pub mod release;
