//! 디렉토리 트리 순회
//!
//! [`TreeWalker::walk`]는 루트를 먼저 확인한 뒤 일반 파일만 내놓는 지연 시퀀스
//! [`Walk`]를 반환합니다. 루트에 접근할 수 없으면 원본 I/O 에러와 함께 실패하고,
//! 순회 도중 읽을 수 없는 디렉토리는 경고 후 건너뜁니다.
//!
//! 같은 디렉토리 안의 엔트리는 파일 이름 순으로 방문합니다.
//! 이 함수는 blocking I/O를 수행하므로 `spawn_blocking` 안에서 호출해야 합니다.

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use metrics::counter;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use layerprobe_core::metrics as m;

use crate::error::ArtifactError;

/// 컴파일된 skip 패턴
///
/// 패턴은 루트 기준 상대 경로(`/` 구분) 전체에 대해 검사합니다.
#[derive(Debug, Clone, Default)]
pub struct SkipRules {
    files: Vec<Regex>,
    dirs: Vec<Regex>,
}

impl SkipRules {
    /// 패턴 문자열을 컴파일합니다.
    pub fn compile(files: &[String], dirs: &[String]) -> Result<Self, ArtifactError> {
        Ok(Self {
            files: compile_all("skip_files", files)?,
            dirs: compile_all("skip_dirs", dirs)?,
        })
    }

    /// 파일을 건너뛸지 확인합니다.
    pub fn skip_file(&self, relative_path: &str) -> bool {
        self.files.iter().any(|re| re.is_match(relative_path))
    }

    /// 디렉토리를 건너뛸지 확인합니다.
    pub fn skip_dir(&self, relative_path: &str) -> bool {
        self.dirs.iter().any(|re| re.is_match(relative_path))
    }
}

fn compile_all(field: &str, patterns: &[String]) -> Result<Vec<Regex>, ArtifactError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ArtifactError::config(field, format!("'{p}': {e}")))
        })
        .collect()
}

/// 순회된 일반 파일 하나
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// 루트 기준 상대 경로 (`/` 구분)
    pub relative_path: String,
    /// 실제 파일 경로
    pub absolute_path: PathBuf,
    /// 파일 크기 (바이트)
    pub size: u64,
    /// 권한 비트 (unix 외 플랫폼에서는 0)
    pub mode: u32,
}

impl WalkEntry {
    /// 파일을 엽니다. 반환된 핸들은 drop 시 닫힙니다.
    pub fn open(&self) -> std::io::Result<File> {
        File::open(&self.absolute_path)
    }
}

/// 디렉토리 트리 순회기
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    rules: SkipRules,
    follow_symlinks: bool,
}

impl TreeWalker {
    /// 새 순회기를 생성합니다.
    pub fn new(root: impl Into<PathBuf>, rules: SkipRules, follow_symlinks: bool) -> Self {
        Self {
            root: root.into(),
            rules,
            follow_symlinks,
        }
    }

    /// 루트를 확인하고 지연 순회를 시작합니다.
    ///
    /// # Errors
    ///
    /// 루트가 없거나, 디렉토리가 아니거나, 읽을 수 없으면 `RootInaccessible`
    pub fn walk(&self) -> Result<Walk, ArtifactError> {
        let root_err = |source: std::io::Error| ArtifactError::RootInaccessible {
            path: self.root.display().to_string(),
            source,
        };

        let metadata = std::fs::metadata(&self.root).map_err(root_err)?;
        if !metadata.is_dir() {
            return Err(root_err(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "not a directory",
            )));
        }
        // 권한 확인: 루트 자체를 열 수 있어야 함
        std::fs::read_dir(&self.root).map_err(root_err)?;
        let canonical_root = std::fs::canonicalize(&self.root).map_err(root_err)?;

        let rules = self.rules.clone();
        let follow_symlinks = self.follow_symlinks;
        let filter_root = canonical_root.clone();
        let inner = WalkDir::new(&canonical_root)
            .follow_links(follow_symlinks)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                keep_entry(entry, &filter_root, &rules, follow_symlinks)
            });

        Ok(Walk {
            root: canonical_root,
            rules: self.rules.clone(),
            inner: Box::new(inner),
            errors: 0,
        })
    }
}

/// 디렉토리 단위 필터: skip_dirs, 루트 밖을 가리키는 링크
fn keep_entry(entry: &DirEntry, root: &Path, rules: &SkipRules, follow_symlinks: bool) -> bool {
    if follow_symlinks && entry.path_is_symlink() {
        match std::fs::canonicalize(entry.path()) {
            Ok(target) if target.starts_with(root) => {}
            Ok(target) => {
                debug!(
                    path = %entry.path().display(),
                    target = %target.display(),
                    "symlink points outside root, skipping"
                );
                return false;
            }
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "dangling symlink, skipping");
                return false;
            }
        }
    }

    if entry.file_type().is_dir() {
        let relative = relative_path(root, entry.path());
        if rules.skip_dir(&relative) {
            debug!(path = %relative, "directory matches skip_dirs, skipping");
            return false;
        }
    }
    true
}

/// 루트 기준 상대 경로를 `/`로 이어 붙입니다.
///
/// 이름은 손실 없이 인코딩됩니다. `\`는 `\\`로, UTF-8이 아닌 바이트는 `\xNN`으로
/// 바뀌므로 서로 다른 파일 이름은 항상 서로 다른 경로가 됩니다.
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| encode_component(c.as_os_str()))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn encode_component(name: &OsStr) -> String {
    use std::fmt::Write;
    use std::os::unix::ffi::OsStrExt;

    let mut out = String::with_capacity(name.len());
    for chunk in name.as_bytes().utf8_chunks() {
        for ch in chunk.valid().chars() {
            if ch == '\\' {
                out.push_str("\\\\");
            } else {
                out.push(ch);
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    out
}

#[cfg(not(unix))]
fn encode_component(name: &OsStr) -> String {
    name.to_string_lossy().into_owned()
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    0
}

/// 지연 순회 시퀀스
///
/// 한 번만 순회할 수 있으며, 일반 파일만 내놓습니다.
pub struct Walk {
    root: PathBuf,
    rules: SkipRules,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
    errors: usize,
}

impl Walk {
    /// 지금까지 건너뛴 엔트리 수
    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl Iterator for Walk {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    warn!(path = %path, error = %e, "failed to read directory entry, skipping");
                    counter!(m::WALK_ERRORS_TOTAL).increment(1);
                    self.errors += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(&self.root, entry.path());
            if self.rules.skip_file(&relative) {
                debug!(path = %relative, "file matches skip_files, skipping");
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(md) => md,
                Err(e) => {
                    warn!(path = %relative, error = %e, "failed to read file metadata, skipping");
                    counter!(m::WALK_ERRORS_TOTAL).increment(1);
                    self.errors += 1;
                    continue;
                }
            };

            counter!(m::FILES_WALKED_TOTAL).increment(1);
            return Some(WalkEntry {
                relative_path: relative,
                absolute_path: entry.into_path(),
                size: metadata.len(),
                mode: file_mode(&metadata),
            });
        }
    }
}
