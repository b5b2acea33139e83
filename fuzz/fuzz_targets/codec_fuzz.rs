//! Fuzz test for the multi-value codec
//!
//! Feeds arbitrary byte sequences through decode to find panics, and checks
//! that anything decode accepts re-encodes to a stable decoding.
//!
//! Run with: cargo +nightly fuzz run codec_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sluice_protocol::codec::{decode, encode};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Decode should return Ok or Err, never panic
        if let Ok(items) = decode(text) {
            // Whatever decode accepts must be stable under re-encoding
            let encoded = encode(&items);
            assert_eq!(
                decode(&encoded).expect("re-encoded items should decode"),
                items,
                "decode -> encode -> decode should be a fixpoint"
            );
        }
    }
});
