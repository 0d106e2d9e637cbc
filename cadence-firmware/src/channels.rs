//! Signals between the tick handler and the foreground tasks
//!
//! Engine event handlers run inside the tick task with the engine locked,
//! so they only raise signals; the work happens in the waiting task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use cadence_core::serial::{EventHandler, SerialEvent};

/// Raised when the soft UART stored a byte
pub static RX_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Handler installed on the soft UART
pub struct UartEvents;

pub static UART_EVENTS: UartEvents = UartEvents;

impl EventHandler for UartEvents {
    fn on_event(&self, event: SerialEvent) {
        match event {
            SerialEvent::RxReady => RX_READY.signal(()),
            SerialEvent::FrameError(kind) => defmt::debug!("uart frame error: {}", kind),
            SerialEvent::RxOverrun => defmt::warn!("uart rx overrun"),
            SerialEvent::TxEmpty => {}
        }
    }
}
