//! Tick task
//!
//! Steps every engine by one tick, then the scheduler. Engines go first so
//! a job that queues bytes sees the line state of the current tick.

use defmt::*;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use cadence_core::config::TickDivider;
use cadence_core::serial::SoftSerial;

use crate::board::{Board, TICK_HZ};

#[embassy_executor::task]
pub async fn tick_task(board: &'static Board, mut i2c_divider: TickDivider) {
    info!(
        "Tick task started: {} Hz, {} tasks, i2c every {} ticks",
        TICK_HZ,
        board.scheduler.with(|scheduler| scheduler.len()),
        i2c_divider.divisor()
    );

    let mut ticker = Ticker::every(Duration::from_hz(u64::from(TICK_HZ)));

    loop {
        ticker.next().await;

        board.uart.with_mut(|uart| uart.on_tick());
        if i2c_divider.poll() {
            board.i2c.with_mut(|i2c| i2c.on_tick());
        }

        let ticks = board.scheduler.with_mut(|scheduler| {
            scheduler.tick();
            scheduler.tick_count()
        });
        board.ticks.store(ticks, Ordering::Relaxed);
    }
}
