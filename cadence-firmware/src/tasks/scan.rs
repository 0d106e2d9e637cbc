//! I2C bus scan
//!
//! Probes every valid 7-bit address once at boot and logs who answers.

use defmt::*;
use embassy_time::Timer;

use cadence_hal::i2c::{MAX_ADDRESS, MIN_ADDRESS};

use crate::board::Board;

#[embassy_executor::task]
pub async fn scan_task(board: &'static Board) {
    info!("I2C scan started");

    let mut found = 0u8;
    for address in MIN_ADDRESS..=MAX_ADDRESS {
        if let Err(e) = board.i2c.with_mut(|i2c| i2c.probe(address)) {
            warn!("probe {=u8:#04x} failed: {}", address, e);
            continue;
        }

        let outcome = loop {
            Timer::after_millis(1).await;
            if let Some(outcome) = board.i2c.with_mut(|i2c| i2c.take_outcome()) {
                break outcome;
            }
        };

        if outcome.is_ok() {
            info!("I2C device at {=u8:#04x}", address);
            found += 1;
        }
    }

    info!("I2C scan done, {} devices", found);
}
