//! Error taxonomy
//!
//! Nothing here is fatal. Every error leaves the scheduler or engine that
//! raised it in a state from which it can keep running; the application
//! decides what deserves a halt.

use core::fmt;

/// Errors reported by the scheduler and the soft-serial engines
///
/// Register, unregister and `begin_*` calls return these synchronously.
/// Receive-path overruns and framing failures are detected inside the tick
/// handler where nobody is waiting, so they travel through
/// [`SerialEvent`](crate::serial::SerialEvent) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Task table full, or a transmit/read request larger than the free space
    CapacityExceeded,
    /// Task handle is unknown or refers to a slot that has been reused
    NotFound,
    /// Receive buffer overrun; the incoming byte was dropped
    BufferFull,
    /// Protocol-level framing or acknowledge failure
    FrameError(FrameErrorKind),
    /// A task period of zero ticks
    InvalidPeriod,
    /// Reserved or out-of-range I2C address
    InvalidAddress,
    /// Configuration rejected by `validate()`
    InvalidConfig,
    /// A transaction is already in flight
    Busy,
}

/// What went wrong with a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameErrorKind {
    /// Stop bit sampled low
    MissingStopBit,
    /// Received parity bit did not match the data
    Parity,
    /// Line held low for a whole frame
    Break,
    /// Slave did not acknowledge
    Nack,
    /// Slave held SCL low past the stretch limit
    ClockStretchTimeout,
}

impl fmt::Display for FrameErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameErrorKind::MissingStopBit => write!(f, "missing stop bit"),
            FrameErrorKind::Parity => write!(f, "parity mismatch"),
            FrameErrorKind::Break => write!(f, "line break"),
            FrameErrorKind::Nack => write!(f, "not acknowledged"),
            FrameErrorKind::ClockStretchTimeout => write!(f, "clock stretch timeout"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "capacity exceeded"),
            Error::NotFound => write!(f, "task not found"),
            Error::BufferFull => write!(f, "receive buffer full"),
            Error::FrameError(kind) => write!(f, "frame error: {}", kind),
            Error::InvalidPeriod => write!(f, "period must be at least one tick"),
            Error::InvalidAddress => write!(f, "invalid I2C address"),
            Error::InvalidConfig => write!(f, "invalid configuration"),
            Error::Busy => write!(f, "transaction in progress"),
        }
    }
}

impl From<FrameErrorKind> for Error {
    fn from(kind: FrameErrorKind) -> Self {
        Error::FrameError(kind)
    }
}
