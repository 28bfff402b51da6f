#![cfg_attr(not(test), no_std)]

//! Driver for the Quectel L76-class GNSS receiver.
//!
//! The receiver computes its own fixes and streams them out as NMEA 0183
//! text over a byte-oriented bus. This crate turns that unreliable stream
//! (partial reads, interleaved sentences, checksum corruption,
//! constellation-prefixed tag variants) into a small query surface:
//! current coordinates, ground speed, the satellites-in-view table and a
//! fix-freshness check.
//!
//! The driver owns nothing hardware-specific. The bus transport, the
//! real-time clock and the monotonic timers are traits ([`hal`]) injected
//! at construction, so the same code runs against a microcontroller I2C
//! peripheral or against the mocks used by the unit tests.

pub mod driver;
pub mod error;
pub mod hal;
pub mod logging;
pub mod nmea;

pub use driver::{L76Driver, PollMode, PollOutcome};
pub use error::{Error, TransportError};
pub use hal::{Clock, Monotonic, Transport};
pub use nmea::frame::Frame;
pub use nmea::parse::{GgaData, GsvData, RmcData, SatelliteInfo, SentenceData, VtgData};
pub use nmea::Tag;
