//! OS 패키지 DB 분석기
//!
//! - `lib/apk/db/installed` -- [`ApkAnalyzer`](apk::ApkAnalyzer)
//! - `var/lib/dpkg/status` -- [`DpkgAnalyzer`](dpkg::DpkgAnalyzer)
//!
//! 두 형식 모두 빈 줄로 구분된 스탠자(stanza) 목록입니다.

pub mod apk;
pub mod dpkg;

/// 빈 줄로 구분된 스탠자를 순회합니다.
pub(crate) fn stanzas(content: &str) -> impl Iterator<Item = Vec<&str>> {
    let mut current: Vec<&str> = Vec::new();
    let mut lines = content.lines();
    std::iter::from_fn(move || {
        loop {
            match lines.next() {
                Some(line) if line.trim().is_empty() => {
                    if !current.is_empty() {
                        return Some(std::mem::take(&mut current));
                    }
                }
                Some(line) => current.push(line),
                None => {
                    if current.is_empty() {
                        return None;
                    }
                    return Some(std::mem::take(&mut current));
                }
            }
        }
    })
}
