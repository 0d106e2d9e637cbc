//! Runtime snapshot for telemetry
//!
//! With the `serde` feature a snapshot can be encoded into a COBS-framed
//! postcard message, so a host can split a byte stream on zero bytes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::serial::{EventCounts, LineStatus};

/// Largest encoded [`Diagnostics`] frame, zero delimiter included
pub const MAX_FRAME_LEN: usize = 64;

/// What the runtime looked like at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Scheduler tick count
    pub ticks: u32,
    /// Registered tasks
    pub tasks: u8,
    /// Status of the telemetry line itself
    pub serial: LineStatus,
    /// Events seen on the I2C bus
    pub bus_events: EventCounts,
}

#[cfg(feature = "serde")]
impl Diagnostics {
    /// Encode into `buf`, returning the frame (terminating zero included)
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], crate::Error> {
        postcard::to_slice_cobs(self, buf).map_err(|_| crate::Error::CapacityExceeded)
    }

    /// Decode a frame produced by [`encode`](Self::encode)
    ///
    /// Decoding happens in place; `frame` is clobbered.
    pub fn decode(frame: &mut [u8]) -> Option<Self> {
        postcard::from_bytes_cobs(frame).ok()
    }
}
