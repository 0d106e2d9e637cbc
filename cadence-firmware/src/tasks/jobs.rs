//! Scheduler jobs
//!
//! These run inside the tick task, so they must return quickly and never
//! wait.

use defmt::*;

use cadence_core::diagnostics::MAX_FRAME_LEN;
use cadence_core::serial::SoftSerial;
use cadence_hal::gpio::OutputPin;

use crate::board::Board;

/// Toggle the LED
pub fn heartbeat(board: &'static Board) {
    board.led.with_mut(|led| led.toggle());
}

/// Send a COBS-framed diagnostics snapshot over the soft UART
pub fn telemetry(board: &'static Board) {
    let snapshot = board.diagnostics();

    let mut buf = [0u8; MAX_FRAME_LEN];
    let frame = match snapshot.encode(&mut buf) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("telemetry encode failed: {}", e);
            return;
        }
    };

    if let Err(e) = board.uart.with_mut(|uart| uart.begin_transmit(frame)) {
        debug!("telemetry skipped: {}", e);
    }
}
