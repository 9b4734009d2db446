//! Fuzz target: `LineDecoder::push` + `BridgeCommand::parse`
//!
//! Streams arbitrary console bytes through the bridge line decoder and
//! parses every yielded line.  Neither may panic, and yielded lines stay
//! within the line limit.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use biovote::bridge::codec::{LineDecoder, MAX_LINE_LEN};
use biovote::bridge::commands::BridgeCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();
    for &b in data {
        if let Some(line) = decoder.push(b) {
            assert!(!line.is_empty(), "decoder must not yield empty lines");
            assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
            let _ = BridgeCommand::parse(line);
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    for &b in data {
        let _ = decoder.push(b);
    }
});
