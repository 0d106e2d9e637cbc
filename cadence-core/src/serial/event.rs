//! Engine events and their handlers

use portable_atomic::{AtomicU32, Ordering};

use crate::error::{Error, FrameErrorKind};

/// Event raised by a soft-serial engine from its tick handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialEvent {
    /// Transmit queue drained and the last frame is fully on the wire
    TxEmpty,
    /// A byte was stored in the receive buffer
    RxReady,
    /// A frame was malformed or not acknowledged
    FrameError(FrameErrorKind),
    /// A received byte was dropped because the receive buffer was full
    RxOverrun,
}

impl SerialEvent {
    /// The error this event reports, if any
    pub fn error(&self) -> Option<Error> {
        match self {
            SerialEvent::FrameError(kind) => Some(Error::FrameError(*kind)),
            SerialEvent::RxOverrun => Some(Error::BufferFull),
            SerialEvent::TxEmpty | SerialEvent::RxReady => None,
        }
    }
}

/// Receiver of engine events
///
/// Called from the tick handler with the engine's lock held. It must not
/// block and must not lock the engine that raised the event; signal the
/// foreground instead.
pub trait EventHandler: Sync {
    fn on_event(&self, event: SerialEvent);
}

/// Event handler that counts events by kind
///
/// Lock-free, so it can sit in a `static` and be read from the foreground
/// while the tick handler updates it.
#[derive(Debug, Default)]
pub struct EventCounters {
    tx_empty: AtomicU32,
    rx_ready: AtomicU32,
    frame_errors: AtomicU32,
    overruns: AtomicU32,
}

/// Point-in-time copy of an [`EventCounters`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventCounts {
    pub tx_empty: u32,
    pub rx_ready: u32,
    pub frame_errors: u32,
    pub overruns: u32,
}

impl EventCounters {
    pub const fn new() -> Self {
        Self {
            tx_empty: AtomicU32::new(0),
            rx_ready: AtomicU32::new(0),
            frame_errors: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> EventCounts {
        EventCounts {
            tx_empty: self.tx_empty.load(Ordering::Relaxed),
            rx_ready: self.rx_ready.load(Ordering::Relaxed),
            frame_errors: self.frame_errors.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.tx_empty.store(0, Ordering::Relaxed);
        self.rx_ready.store(0, Ordering::Relaxed);
        self.frame_errors.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
    }
}

impl EventHandler for EventCounters {
    fn on_event(&self, event: SerialEvent) {
        let counter = match event {
            SerialEvent::TxEmpty => &self.tx_empty,
            SerialEvent::RxReady => &self.rx_ready,
            SerialEvent::FrameError(_) => &self.frame_errors,
            SerialEvent::RxOverrun => &self.overruns,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error() {
        assert_eq!(SerialEvent::TxEmpty.error(), None);
        assert_eq!(SerialEvent::RxOverrun.error(), Some(Error::BufferFull));
        assert_eq!(
            SerialEvent::FrameError(FrameErrorKind::Nack).error(),
            Some(Error::FrameError(FrameErrorKind::Nack))
        );
    }

    #[test]
    fn test_counters() {
        let counters = EventCounters::new();
        counters.on_event(SerialEvent::RxReady);
        counters.on_event(SerialEvent::RxReady);
        counters.on_event(SerialEvent::FrameError(FrameErrorKind::Parity));
        counters.on_event(SerialEvent::TxEmpty);

        assert_eq!(
            counters.snapshot(),
            EventCounts {
                tx_empty: 1,
                rx_ready: 2,
                frame_errors: 1,
                overruns: 0,
            }
        );

        counters.reset();
        assert_eq!(counters.snapshot(), EventCounts::default());
    }
}
