//! Newline-delimited line codec.
//!
//! Wire format: one UTF-8 JSON document per line, terminated by `\n`
//! (a trailing `\r` is stripped).
//!
//! The decoder accumulates incoming bytes and yields complete lines.  A
//! line that grows past [`MAX_LINE_LEN`] is discarded up to its
//! terminating newline, so one oversized command cannot wedge the
//! channel.

/// Maximum accepted line length in bytes (excluding the terminator).
pub const MAX_LINE_LEN: usize = 256;

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Collecting bytes of the current line.
    Collecting,
    /// A line was handed out; the buffer is cleared on the next byte.
    Yielded,
    /// Skipping the rest of an oversized line.
    Discarding,
}

/// Streaming line decoder.
pub struct LineDecoder {
    state: DecoderState,
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Collecting,
            buf: heapless::Vec::new(),
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some(line)` when `byte` completes a non-empty line.  The
    /// slice is valid until the next call.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if self.state == DecoderState::Yielded {
            self.buf.clear();
            self.state = DecoderState::Collecting;
        }

        match (self.state, byte) {
            (DecoderState::Discarding, b'\n') => {
                log::warn!("Bridge line longer than {} bytes discarded", MAX_LINE_LEN);
                self.state = DecoderState::Collecting;
                None
            }
            (DecoderState::Discarding, _) => None,
            (_, b'\n') => {
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                if self.buf.is_empty() {
                    return None;
                }
                self.state = DecoderState::Yielded;
                Some(self.buf.as_slice())
            }
            (_, _) => {
                if self.buf.push(byte).is_err() {
                    self.buf.clear();
                    self.state = DecoderState::Discarding;
                }
                None
            }
        }
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = DecoderState::Collecting;
    }
}
