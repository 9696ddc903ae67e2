//! Dockerfile 분석기
//!
//! 명령어 목록을 `[{"instruction": "FROM", "arguments": "alpine:3.11"}, ...]`
//! 형태로 구조화합니다. 줄 끝 `\`로 이어진 줄은 하나로 합칩니다.

use serde::Serialize;

use crate::analyzer::{AnalysisInput, Analyzer, base_name};
use crate::error::AnalyzerError;
use crate::types::{AnalyzerType, FileFinding};

/// 설정 타입 이름
pub const CONFIG_TYPE_DOCKERFILE: &str = "dockerfile";

/// Dockerfile 분석기
pub struct DockerfileAnalyzer;

/// Dockerfile 명령어 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// 명령어 (대문자)
    pub instruction: String,
    /// 인자 (원문)
    pub arguments: String,
}

impl Analyzer for DockerfileAnalyzer {
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Dockerfile
    }

    fn required(&self, file_path: &str) -> bool {
        let name = base_name(file_path).to_lowercase();
        name == "dockerfile" || name.ends_with(".dockerfile") || name.starts_with("dockerfile.")
    }

    fn analyze(&self, mut input: AnalysisInput<'_>) -> Result<Option<FileFinding>, AnalyzerError> {
        let content = input.read_to_string(self.analyzer_type())?;
        let instructions = parse_instructions(&content, input.file_path)?;
        if instructions.is_empty() {
            return Ok(None);
        }
        let content = serde_json::to_value(&instructions)
            .map_err(|e| AnalyzerError::parse(self.analyzer_type(), input.file_path, e.to_string()))?;
        Ok(Some(FileFinding::Config {
            config_type: CONFIG_TYPE_DOCKERFILE.to_owned(),
            content,
        }))
    }
}

/// Dockerfile 내용을 명령어 목록으로 변환합니다.
pub fn parse_instructions(
    content: &str,
    file_path: &str,
) -> Result<Vec<Instruction>, AnalyzerError> {
    let mut instructions = Vec::new();
    let mut pending = String::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') || (line.is_empty() && pending.is_empty()) {
            continue;
        }

        if let Some(head) = line.strip_suffix('\\') {
            pending.push_str(head.trim_end());
            pending.push(' ');
            continue;
        }
        pending.push_str(line);

        let logical = std::mem::take(&mut pending);
        let logical = logical.trim();
        if logical.is_empty() {
            continue;
        }
        instructions.push(split_instruction(logical, idx + 1, file_path)?);
    }

    let rest = pending.trim();
    if !rest.is_empty() {
        instructions.push(split_instruction(rest, content.lines().count(), file_path)?);
    }

    Ok(instructions)
}

fn split_instruction(
    logical: &str,
    line_no: usize,
    file_path: &str,
) -> Result<Instruction, AnalyzerError> {
    let (keyword, arguments) = logical
        .split_once(char::is_whitespace)
        .unwrap_or((logical, ""));
    if keyword.is_empty() || !keyword.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AnalyzerError::parse(
            AnalyzerType::Dockerfile,
            file_path,
            format!("line {line_no}: invalid instruction {keyword:?}"),
        ));
    }
    Ok(Instruction {
        instruction: keyword.to_ascii_uppercase(),
        arguments: arguments.trim().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOCKERFILE: &str = "\
# syntax=docker/dockerfile:1
FROM alpine:3.11

RUN apk add --no-cache \\
    curl \\
    jq
user nobody
CMD [\"sh\"]
";

    #[test]
    fn required_name_variants() {
        assert!(DockerfileAnalyzer.required("Dockerfile"));
        assert!(DockerfileAnalyzer.required("build/app.Dockerfile"));
        assert!(DockerfileAnalyzer.required("build/Dockerfile.prod"));
        assert!(!DockerfileAnalyzer.required("build/Dockerfiles/readme.md"));
    }

    #[test]
    fn parses_instructions_with_continuations() {
        let parsed = parse_instructions(SAMPLE_DOCKERFILE, "Dockerfile").unwrap();
        let keywords: Vec<&str> = parsed.iter().map(|i| i.instruction.as_str()).collect();
        assert_eq!(keywords, vec!["FROM", "RUN", "USER", "CMD"]);
        assert_eq!(parsed[1].arguments, "apk add --no-cache curl jq");
        assert_eq!(parsed[3].arguments, "[\"sh\"]");
    }

    #[test]
    fn invalid_instruction_is_parse_error() {
        let err = parse_instructions("FROM alpine\n1234 nope\n", "Dockerfile").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn analyze_produces_config_finding() {
        let mut reader = SAMPLE_DOCKERFILE.as_bytes();
        let finding = DockerfileAnalyzer
            .analyze(AnalysisInput::new(
                "Dockerfile",
                &mut reader,
                SAMPLE_DOCKERFILE.len() as u64,
            ))
            .unwrap();
        let Some(FileFinding::Config { config_type, content }) = finding else {
            panic!("expected config finding");
        };
        assert_eq!(config_type, "dockerfile");
        assert_eq!(content[0]["instruction"], "FROM");
        assert_eq!(content[0]["arguments"], "alpine:3.11");
    }

    #[test]
    fn comments_only_yields_nothing() {
        let mut reader: &[u8] = b"# nothing here\n";
        let finding = DockerfileAnalyzer
            .analyze(AnalysisInput::new("Dockerfile", &mut reader, 15))
            .unwrap();
        assert!(finding.is_none());
    }
}
