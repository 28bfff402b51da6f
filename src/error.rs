//! Error types.
//!
//! Malformed NMEA input is never an error: framing misses are skipped,
//! checksum mismatches are logged and discarded, and unparseable fields
//! decode to `None`. The only fallible path out of the driver is the bus
//! transport, whose failures likely indicate a hardware fault and are
//! propagated unchanged.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Crate-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

/// Failure reported by the bus transport implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The device did not acknowledge the transfer.
    #[error("device did not acknowledge")]
    Nack,
    /// Bus-level fault (arbitration loss, line stuck, ...).
    #[error("bus error")]
    Bus,
    /// The read could not be completed.
    #[error("read failed")]
    ReadFailed,
}
