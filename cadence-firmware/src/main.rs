//! Cadence demo firmware
//!
//! One embassy ticker drives a soft UART, a soft I2C master and a small
//! cooperative scheduler on an RP2040:
//!
//! - UART bytes received on GPIO1 are echoed on GPIO0
//! - The I2C bus on GPIO4/GPIO5 is scanned once at boot
//! - The on-board LED blinks from a scheduler job
//! - A second job sends postcard telemetry frames over the UART

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::Pull;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cadence_core::config::{TaskConfig, TickConfig, TickDivider};
use cadence_core::serial::SoftSerial;
use cadence_core::Scheduler;
use cadence_drivers::i2c::TICKS_PER_BIT as I2C_TICKS_PER_BIT;
use cadence_drivers::{SoftI2cConfig, SoftUartConfig};
use cadence_hal::i2c::I2cConfig;
use cadence_hal::uart::UartConfig;
use cadence_hal_rp2040::{InputLine, OpenDrain, PushPull};

use crate::board::{Board, I2c, Uart};

mod board;
mod channels;
mod tasks;

static BOARD: StaticCell<Board> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Cadence firmware starting...");

    let p = embassy_rp::init(Default::default());
    let tick = TickConfig::new(board::TICK_HZ);

    // Soft UART: TX=GPIO0, RX=GPIO1
    let uart_config = unwrap!(SoftUartConfig::from_tick(
        &tick,
        UartConfig {
            baudrate: board::UART_BAUD,
            ..Default::default()
        },
    ));
    let uart = unwrap!(Uart::new(
        PushPull::new(p.PIN_0.into(), true),
        InputLine::new(p.PIN_1.into(), Pull::Up),
        uart_config,
    ));
    info!(
        "UART: {} baud, {} ticks per bit",
        board::UART_BAUD,
        uart_config.ticks_per_bit
    );

    // Soft I2C: SDA=GPIO4, SCL=GPIO5
    let i2c_config = SoftI2cConfig {
        bus: I2cConfig {
            frequency: board::I2C_HZ,
        },
        ..SoftI2cConfig::new(board::I2C_TARGET)
    };
    let i2c_divider = TickDivider::new(unwrap!(
        tick.bit_divisor(board::I2C_HZ * I2C_TICKS_PER_BIT)
    ));
    let i2c = unwrap!(I2c::new(
        OpenDrain::new(p.PIN_5.into()),
        OpenDrain::new(p.PIN_4.into()),
        i2c_config,
    ));

    let led = PushPull::new(p.PIN_25.into(), false);

    let board: &'static Board = BOARD.init(Board::new(led, uart, i2c));
    board
        .uart
        .with_mut(|uart| uart.set_handler(Some(&channels::UART_EVENTS)));
    board
        .i2c
        .with_mut(|i2c| i2c.set_handler(Some(&board.bus_events)));

    let jobs = [
        TaskConfig::new(
            tasks::jobs::heartbeat,
            board,
            unwrap!(tick.period_ticks(board::HEARTBEAT_MS)),
        ),
        TaskConfig::new(
            tasks::jobs::telemetry,
            board,
            unwrap!(tick.period_ticks(board::TELEMETRY_MS)),
        ),
    ];
    let scheduler: board::Jobs = unwrap!(Scheduler::from_config(&jobs));
    board
        .tasks
        .store(scheduler.len() as u8, portable_atomic::Ordering::Relaxed);
    board.scheduler.with_mut(|slot| *slot = scheduler);

    spawner.spawn(tasks::tick_task(board, i2c_divider).unwrap());
    spawner.spawn(tasks::echo_task(board).unwrap());
    spawner.spawn(tasks::scan_task(board).unwrap());

    info!("All tasks spawned, firmware running");
}
