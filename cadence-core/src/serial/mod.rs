//! Soft-serial plumbing
//!
//! The bit-banged engines in `cadence-drivers` share everything above the
//! bit level: bounded byte queues, the event handler, sticky line status
//! and the [`SoftSerial`] contract the tick handler drives them through.
//!
//! # Tick discipline
//!
//! Each call to [`SoftSerial::on_tick`] performs exactly one state
//! transition. On a given tick an engine either moves a clock line or
//! drives/samples a data line, never both.

mod buffer;
mod channel;
mod event;

pub use buffer::ByteQueue;
pub use channel::{Channel, LineStatus};
pub use event::{EventCounters, EventCounts, EventHandler, SerialEvent};

use crate::error::Error;

/// A tick-driven serial engine
pub trait SoftSerial {
    /// Advance the line state machine by one step
    ///
    /// Runs in interrupt context: never blocks, never allocates.
    fn on_tick(&mut self);

    /// Queue bytes for transmission
    ///
    /// All-or-nothing: fails with [`Error::CapacityExceeded`] without
    /// queueing anything if the bytes do not fit. An idle engine starts on
    /// the next tick.
    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Move received bytes into `buf`, returning how many were copied
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Number of received bytes waiting to be read
    fn available(&self) -> usize;

    /// True when nothing is queued or being shifted
    fn is_idle(&self) -> bool;

    /// Drop queued transmit data and return the lines to idle
    ///
    /// Takes effect immediately; no event is raised.
    fn abort(&mut self);

    /// Install the event handler, returning the previous one
    fn set_handler(
        &mut self,
        handler: Option<&'static dyn EventHandler>,
    ) -> Option<&'static dyn EventHandler>;

    fn status(&self) -> LineStatus;

    fn clear_status(&mut self);
}
