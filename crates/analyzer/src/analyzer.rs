//! 분석기 trait
//!
//! [`Analyzer`]는 각 분석기가 구현해야 하는 인터페이스입니다.
//! 분석기는 상태가 없고 `Send + Sync`이므로 여러 워커 스레드가 같은 인스턴스를
//! 동시에 호출할 수 있습니다.
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `Analyzer` trait을 구현하고
//! [`RegistryBuilder`](crate::registry::RegistryBuilder)에 등록합니다.

use std::io::Read;

use crate::error::AnalyzerError;
use crate::types::{AnalyzerGroup, AnalyzerType, FileFinding};

/// 분석기에 전달되는 파일 하나
///
/// 리더는 호출자가 소유하며 분석기가 반환되면 닫힙니다.
pub struct AnalysisInput<'a> {
    /// 루트 기준 상대 경로 (`/` 구분)
    pub file_path: &'a str,
    /// 파일 내용 리더
    pub reader: &'a mut dyn Read,
    /// 파일 크기 (바이트)
    pub size: u64,
}

impl<'a> AnalysisInput<'a> {
    /// 새 입력을 생성합니다.
    pub fn new(file_path: &'a str, reader: &'a mut dyn Read, size: u64) -> Self {
        Self {
            file_path,
            reader,
            size,
        }
    }

    /// 파일 전체를 UTF-8 문자열로 읽습니다.
    ///
    /// UTF-8이 아닌 내용은 `Parse` 에러, 읽기 실패는 `Io` 에러가 됩니다.
    pub fn read_to_string(&mut self, analyzer: AnalyzerType) -> Result<String, AnalyzerError> {
        let mut content = String::with_capacity(usize::try_from(self.size).unwrap_or(0));
        match self.reader.read_to_string(&mut content) {
            Ok(_) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(AnalyzerError::parse(
                analyzer,
                self.file_path,
                "file is not valid UTF-8",
            )),
            Err(e) => Err(AnalyzerError::Io {
                path: self.file_path.to_owned(),
                source: e,
            }),
        }
    }
}

/// 분석기 trait
pub trait Analyzer: Send + Sync {
    /// 이 분석기의 타입 태그를 반환합니다.
    fn analyzer_type(&self) -> AnalyzerType;

    /// 이 분석기가 속하는 그룹을 반환합니다.
    fn group(&self) -> AnalyzerGroup {
        self.analyzer_type().group()
    }

    /// 주어진 상대 경로의 파일을 이 분석기가 처리하는지 확인합니다.
    fn required(&self, file_path: &str) -> bool;

    /// 파일 내용을 분석합니다.
    ///
    /// 처리할 내용이 없으면 `Ok(None)`을 반환합니다.
    fn analyze(&self, input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError>;
}

/// 경로의 마지막 구성 요소를 반환합니다.
pub(crate) fn base_name(file_path: &str) -> &str {
    file_path.rsplit('/').next().unwrap_or(file_path)
}
