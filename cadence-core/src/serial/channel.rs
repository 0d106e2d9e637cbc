//! Buffers, handler and status shared by every soft-serial engine

use crate::error::{Error, FrameErrorKind};

use super::buffer::ByteQueue;
use super::event::{EventHandler, SerialEvent};

/// Sticky line status, cleared only on request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineStatus {
    /// A received byte was dropped since the last clear
    pub overrun: bool,
    /// Most recent framing failure since the last clear
    pub frame_error: Option<FrameErrorKind>,
    /// Frames (bytes or words) fully shifted out
    pub tx_frames: u32,
    /// Frames stored in the receive buffer
    pub rx_frames: u32,
    /// Overruns plus frame errors
    pub errors: u32,
}

impl LineStatus {
    pub fn has_error(&self) -> bool {
        self.overrun || self.frame_error.is_some()
    }
}

/// The byte-level half of an engine
///
/// Engines own one of these and keep their bit-level state beside it. It
/// applies the receive overrun policy and routes events to the handler.
pub struct Channel<const TX: usize, const RX: usize> {
    tx: ByteQueue<TX>,
    rx: ByteQueue<RX>,
    handler: Option<&'static dyn EventHandler>,
    status: LineStatus,
}

impl<const TX: usize, const RX: usize> Default for Channel<TX, RX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const TX: usize, const RX: usize> Channel<TX, RX> {
    pub const fn new() -> Self {
        Self {
            tx: ByteQueue::new(),
            rx: ByteQueue::new(),
            handler: None,
            status: LineStatus {
                overrun: false,
                frame_error: None,
                tx_frames: 0,
                rx_frames: 0,
                errors: 0,
            },
        }
    }

    /// Queue bytes for transmission, all or nothing
    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.tx.push_all(bytes)
    }

    /// Next byte to shift out
    pub fn next_tx(&mut self) -> Option<u8> {
        self.tx.pop()
    }

    /// Bytes waiting to be transmitted
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    pub fn tx_free(&self) -> usize {
        self.tx.free()
    }

    /// Drop everything still queued for transmission
    pub fn clear_tx(&mut self) {
        self.tx.clear();
    }

    /// Store a received byte
    ///
    /// A full receive buffer drops the byte, sets the overrun flag and raises
    /// [`SerialEvent::RxOverrun`]; otherwise raises [`SerialEvent::RxReady`].
    pub fn receive(&mut self, byte: u8) {
        match self.rx.push(byte) {
            Ok(()) => {
                self.status.rx_frames = self.status.rx_frames.wrapping_add(1);
                self.emit(SerialEvent::RxReady);
            }
            Err(_) => {
                self.status.overrun = true;
                self.status.errors = self.status.errors.wrapping_add(1);
                log_warn!("rx overrun, byte dropped");
                self.emit(SerialEvent::RxOverrun);
            }
        }
    }

    /// Record and report a malformed frame
    pub fn frame_error(&mut self, kind: FrameErrorKind) {
        self.status.frame_error = Some(kind);
        self.status.errors = self.status.errors.wrapping_add(1);
        log_debug!("frame error: {}", kind);
        self.emit(SerialEvent::FrameError(kind));
    }

    /// Count one frame fully transmitted
    pub fn transmitted(&mut self) {
        self.status.tx_frames = self.status.tx_frames.wrapping_add(1);
    }

    /// Report that the line went idle with nothing left to send
    pub fn tx_empty(&mut self) {
        self.emit(SerialEvent::TxEmpty);
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.rx.read_into(buf)
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// Bytes waiting in the receive buffer
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    pub fn rx_capacity(&self) -> usize {
        self.rx.capacity()
    }

    /// Bytes the receive buffer can still take before overrunning
    pub fn rx_free(&self) -> usize {
        self.rx.free()
    }

    pub fn clear_rx(&mut self) {
        self.rx.clear();
    }

    /// Install `handler`, returning the one it replaces
    pub fn set_handler(
        &mut self,
        handler: Option<&'static dyn EventHandler>,
    ) -> Option<&'static dyn EventHandler> {
        core::mem::replace(&mut self.handler, handler)
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Clear the sticky error flags; frame counters keep running
    pub fn clear_status(&mut self) {
        self.status.overrun = false;
        self.status.frame_error = None;
    }

    fn emit(&self, event: SerialEvent) {
        if let Some(handler) = self.handler {
            handler.on_event(event);
        }
    }
}
