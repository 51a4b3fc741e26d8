#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        if let Ok(option) = remote::ForwardingOption::parse(value) {
            assert!(option.to_string().ends_with(&option.remote_port.to_string()));
        }
    }
});
