#![no_main]

use libfuzzer_sys::fuzz_target;
use layerprobe_analyzer::pkg::apk::parse_installed;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_installed(content, "lib/apk/db/installed");
    }
});
