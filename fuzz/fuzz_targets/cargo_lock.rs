#![no_main]

use libfuzzer_sys::fuzz_target;
use layerprobe_analyzer::lang::cargo::parse_lockfile;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_lockfile(content, "fuzz/Cargo.lock");
    }
});
