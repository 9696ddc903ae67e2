//! 애플리케이션 lockfile 분석기
//!
//! # 지원 형식
//!
//! - `package-lock.json` (JSON, v1/v2/v3) -- [`NpmLockAnalyzer`](npm::NpmLockAnalyzer)
//! - `Cargo.lock` (TOML) -- [`CargoLockAnalyzer`](cargo::CargoLockAnalyzer)
//!
//! 두 분석기 모두 트리 어느 깊이에 있든 파일 이름으로 대상을 판별합니다.

pub mod cargo;
pub mod npm;
