//! 콘텐츠 해시 유틸리티
//!
//! 모든 식별자(diffID, blobID)는 `"<algorithm>:<hex-digest>"` 형식으로 표현됩니다.
//! 현재 알고리즘은 SHA-256 하나뿐입니다.

use std::io::Read;

use sha2::{Digest, Sha256};

/// 해시 알고리즘 접두사
pub const SHA256_PREFIX: &str = "sha256:";

/// 바이트 슬라이스의 SHA-256 해시를 `sha256:<hex>` 형식으로 반환합니다.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Reader 전체를 스트리밍으로 해시합니다.
///
/// 반환값은 `(sha256:<hex>, 읽은 바이트 수)`입니다.
pub fn sha256_reader<R: Read>(mut reader: R) -> std::io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        total += n as u64;
    }
    Ok((format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize())), total))
}

/// `sha256:<64 hex>` 형식인지 검사하고 hex 부분을 반환합니다.
pub fn split_sha256(id: &str) -> Option<&str> {
    let hex_part = id.strip_prefix(SHA256_PREFIX)?;
    if hex_part.len() == 64 && hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(hex_part)
    } else {
        None
    }
}
