#![no_main]

use libfuzzer_sys::fuzz_target;

use hexarith::{decode_hex, FixedFormat, Invocation};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    // none of the parsers may panic on arbitrary text
    let _ = decode_hex(&source);
    let _ = source.parse::<FixedFormat>();

    // whitespace-separated words become an argument list
    let args = std::iter::once("hexarith").chain(source.split_whitespace());
    if let Ok(invocation) = Invocation::from_args(args) {
        let _ = invocation.evaluate();
    }
});
