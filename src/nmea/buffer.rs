//! Streaming line buffer between the bus and the frame scanner.
//!
//! The bus hands over N arbitrary bytes per read; the scanner wants whole
//! lines. This buffer accumulates reads, yields terminator-complete lines
//! and keeps the trailing incomplete fragment for the next cycle —
//! dropping that fragment would truncate the sentence it belongs to.

use tinyvec::ArrayVec;

use super::frame::MAX_SENTENCE;
use crate::log_warn;

/// Accumulation capacity. Several sentences' worth, so a burst of reads
/// between drains doesn't overflow.
pub const BUF_SIZE: usize = 512;

#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    buf: ArrayVec<[u8; BUF_SIZE]>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything accumulated. Called at the start of a polling
    /// session.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Append a bus read.
    ///
    /// If the buffer fills up without a terminator in sight, it clears
    /// itself and starts over from the incoming bytes: a fragment longer
    /// than the whole buffer cannot be a valid sentence, so this is a
    /// resync, not data loss.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.buf.try_push(b).is_some() {
                log_warn!("line buffer overflow at {} bytes, resyncing", self.buf.len());
                self.buf.clear();
                let _ = self.buf.try_push(b);
            }
        }
    }

    /// Remove and return the next terminator-complete line, `\r` included.
    ///
    /// Lines too long to be a sentence are consumed and truncated, which
    /// leaves them without their terminator; the scanner then skips them
    /// as framing misses. `None` means only an incomplete fragment (or
    /// nothing) remains buffered.
    pub fn take_line(&mut self) -> Option<ArrayVec<[u8; MAX_SENTENCE]>> {
        let end = self.buf.iter().position(|&b| b == b'\r')?;
        let mut line = ArrayVec::new();
        for b in self.buf.drain(..=end) {
            let _ = line.try_push(b);
        }
        Some(line)
    }

    /// The incomplete fragment currently held for the next cycle.
    pub fn pending(&self) -> &[u8] {
        self.buf.as_slice()
    }
}
