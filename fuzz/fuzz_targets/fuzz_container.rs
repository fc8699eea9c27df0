#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce entities or an error, never a panic
    let _ = mer::bsp::read_entities(data);
});
