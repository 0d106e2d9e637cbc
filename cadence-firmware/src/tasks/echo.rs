//! Soft UART echo
//!
//! Sends every received byte straight back.

use defmt::*;

use cadence_core::serial::SoftSerial;

use crate::board::Board;
use crate::channels::RX_READY;

#[embassy_executor::task]
pub async fn echo_task(board: &'static Board) {
    info!("Echo task started");

    let mut buf = [0u8; 32];

    loop {
        RX_READY.wait().await;

        let result = board.uart.with_mut(|uart| {
            let len = uart.read(&mut buf);
            uart.begin_transmit(&buf[..len]).map(|()| len)
        });

        match result {
            Ok(len) => trace!("echoed {} bytes", len),
            Err(e) => warn!("echo dropped: {}", e),
        }
    }
}
