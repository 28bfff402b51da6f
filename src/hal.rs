//! Hardware abstraction traits consumed by the driver.
//!
//! The original system wired the receiver, clock and timers up as
//! module-level singletons; here everything is explicit: the caller
//! constructs its implementations and hands them to
//! [`L76Driver::new`](crate::L76Driver::new).

use chrono::NaiveDateTime;
use core::time::Duration;

use crate::error::TransportError;

/// Byte-oriented bus to the receiver (I2C or UART behind the scenes).
pub trait Transport {
    /// Best-effort read of up to `buf.len()` bytes.
    ///
    /// Returns the number of bytes actually placed in `buf`; `Ok(0)` means
    /// nothing was pending, which is normal between sentence bursts.
    /// Errors are not recoverable inline and propagate to the caller.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Device real-time clock.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn set(&mut self, t: NaiveDateTime);
}

/// Free-running stopwatch, the original firmware's chronometer.
///
/// The driver consumes two instances: a per-session watchdog that is reset
/// at the start of every poll, and an uptime reference that is started once
/// at construction and never reset, used to timestamp fixes.
pub trait Monotonic {
    fn start(&mut self);
    fn reset(&mut self);
    fn elapsed(&self) -> Duration;
}

#[cfg(test)]
pub mod mock {
    //! Scripted implementations for the unit tests.

    use super::*;
    use core::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Transport fed from a queue of read chunks.
    ///
    /// Each `read` call drains at most one queued chunk, so tests control
    /// exactly how the byte stream is fragmented across poll iterations.
    /// An empty queue reads as `Ok(0)`, or as the scripted error if one
    /// was set.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        chunks: VecDeque<Vec<u8>>,
        error_when_drained: Option<TransportError>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue `bytes` as a single read chunk.
        pub fn push(&mut self, bytes: &[u8]) {
            self.chunks.push_back(bytes.to_vec());
        }

        /// Queue `bytes` split into reads of at most `chunk` bytes.
        pub fn push_chunked(&mut self, bytes: &[u8], chunk: usize) {
            for piece in bytes.chunks(chunk) {
                self.push(piece);
            }
        }

        /// Fail every read issued after the queue runs dry.
        pub fn fail_when_drained(&mut self, err: TransportError) {
            self.error_when_drained = Some(err);
        }
    }

    impl Transport for MockTransport {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return match self.error_when_drained {
                    Some(err) => Err(err),
                    None => Ok(0),
                };
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                chunk.drain(..n);
                self.chunks.push_front(chunk);
            }
            Ok(n)
        }
    }

    /// Settable real-time clock.
    #[derive(Debug, Clone, Copy)]
    pub struct MockClock {
        pub now: NaiveDateTime,
    }

    impl MockClock {
        pub fn at(now: NaiveDateTime) -> Self {
            Self { now }
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> NaiveDateTime {
            self.now
        }

        fn set(&mut self, t: NaiveDateTime) {
            self.now = t;
        }
    }

    /// Simulated stopwatch.
    ///
    /// Time only moves when the test moves it: either through the shared
    /// [`handle`](Self::handle), or automatically by `tick` on every
    /// `elapsed()` call (which is what lets timeout tests terminate
    /// against an always-empty transport).
    #[derive(Debug)]
    pub struct MockMonotonic {
        now: Rc<Cell<Duration>>,
        base: Cell<Duration>,
        tick: Duration,
    }

    impl MockMonotonic {
        pub fn new() -> Self {
            Self::with_tick(Duration::ZERO)
        }

        pub fn with_tick(tick: Duration) -> Self {
            Self {
                now: Rc::new(Cell::new(Duration::ZERO)),
                base: Cell::new(Duration::ZERO),
                tick,
            }
        }

        /// Shared handle for advancing simulated time from the outside.
        pub fn handle(&self) -> Rc<Cell<Duration>> {
            self.now.clone()
        }
    }

    impl Monotonic for MockMonotonic {
        fn start(&mut self) {}

        fn reset(&mut self) {
            self.base.set(self.now.get());
        }

        fn elapsed(&self) -> Duration {
            let t = self.now.get() + self.tick;
            self.now.set(t);
            t.saturating_sub(self.base.get())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn transport_respects_chunk_boundaries() {
            let mut t = MockTransport::new();
            t.push_chunked(b"abcdefgh", 3);

            let mut buf = [0u8; 16];
            assert_eq!(t.read(&mut buf).unwrap(), 3);
            assert_eq!(&buf[..3], b"abc");
            assert_eq!(t.read(&mut buf).unwrap(), 3);
            assert_eq!(&buf[..3], b"def");
            assert_eq!(t.read(&mut buf).unwrap(), 2);
            assert_eq!(&buf[..2], b"gh");
            assert_eq!(t.read(&mut buf).unwrap(), 0);
        }

        #[test]
        fn transport_splits_oversized_chunks() {
            let mut t = MockTransport::new();
            t.push(b"abcdef");

            let mut buf = [0u8; 4];
            assert_eq!(t.read(&mut buf).unwrap(), 4);
            assert_eq!(&buf, b"abcd");
            assert_eq!(t.read(&mut buf).unwrap(), 2);
            assert_eq!(&buf[..2], b"ef");
        }

        #[test]
        fn monotonic_reset_rebases_elapsed() {
            let mut m = MockMonotonic::new();
            m.handle().set(Duration::from_secs(10));
            m.reset();
            m.handle().set(Duration::from_secs(14));
            assert_eq!(m.elapsed(), Duration::from_secs(4));
        }
    }
}
