#![no_main]

use libfuzzer_sys::fuzz_target;
use layerprobe_analyzer::pkg::dpkg::parse_status;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_status(content, "var/lib/dpkg/status");
    }
});
