//! Fuzz target: request decoding on the real-time core
//!
//! Any request that decodes must re-encode to the same bytes.
//!
//! cargo fuzz run fuzz_link_request

#![no_main]

use diogate::rpc::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = codec::decode_request(data) {
        let mut out = [0u8; codec::MAX_MESSAGE_SIZE];
        let n = codec::encode_request(&request, &mut out).expect("decoded request fits");
        assert_eq!(codec::decode_request(&out[..n]), Ok(request));
    }
});
