//! Fuzz target: AS608 packet parser
//!
//! Feeds arbitrary bytes to `announced_len` and `parse_packet`.  A packet
//! that parses must borrow a payload inside the input and re-encode to the
//! same bytes.
//!
//! cargo fuzz run fuzz_as608_packet

#![no_main]

use biovote::drivers::fingerprint::{MAX_PACKET_LEN, PREAMBLE_LEN, announced_len, encode_packet, parse_packet};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(len) = announced_len(data) {
        assert!(PREAMBLE_LEN + len <= MAX_PACKET_LEN);
    }

    if let Ok(packet) = parse_packet(data) {
        assert!(packet.payload.len() + PREAMBLE_LEN + 2 <= data.len());

        let mut out = [0u8; MAX_PACKET_LEN];
        let n = encode_packet(packet.address, packet.pid, packet.payload, &mut out)
            .expect("parsed packet fits the encoder");
        assert_eq!(&out[..n], &data[..n]);
    }
});
