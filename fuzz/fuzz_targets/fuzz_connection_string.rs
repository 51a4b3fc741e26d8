#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(connection) = std::str::from_utf8(data) {
        // An accepted host never contains the directory separator
        if let Ok((host, _)) = remote::config::parse_connection_string(connection) {
            assert!(!host.contains(':'));
        }
    }
});
