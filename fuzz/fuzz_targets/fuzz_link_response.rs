//! Fuzz target: response decoding on the control core
//!
//! Arbitrary bytes as a link response must decode to an error or to a
//! body that fits the buffer, and the body helpers must never panic.
//!
//! cargo fuzz run fuzz_link_response

#![no_main]

use diogate::rpc::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = codec::decode_response(data) {
        assert!(body.len() <= codec::MAX_VERSION_LEN);
        let _ = codec::body_value(body);
        let _ = codec::body_levels(body);
        let _ = codec::body_version(body);
    }
});
