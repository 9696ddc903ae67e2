//! 설정 파일 분석기
//!
//! - `Dockerfile`, `*.Dockerfile`, `Dockerfile.*` -- [`DockerfileAnalyzer`](dockerfile::DockerfileAnalyzer)

pub mod dockerfile;
