#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    json_delta_fuzz::fuzz_delta_decode(data);
});
