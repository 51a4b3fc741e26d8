#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        // Fuzz `.remote` line parsing - this should never panic
        let _ = remote::config::classic::parse_config_line(line);
    }
});
