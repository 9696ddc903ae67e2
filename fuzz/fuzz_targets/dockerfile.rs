#![no_main]

use libfuzzer_sys::fuzz_target;
use layerprobe_analyzer::config::dockerfile::parse_instructions;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_instructions(content, "fuzz/Dockerfile");
    }
});
