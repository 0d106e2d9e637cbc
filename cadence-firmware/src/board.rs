//! Board wiring and rates
//!
//! Pin numbers follow a Raspberry Pi Pico. Rates are chosen so every line is
//! an exact multiple of the tick.

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use cadence_core::diagnostics::Diagnostics;
use cadence_core::serial::{EventCounters, SoftSerial};
use cadence_core::{Scheduler, Shared};
use cadence_drivers::{SoftI2c, SoftUart};
use cadence_hal_rp2040::{InputLine, OpenDrain, PushPull};

/// Base tick rate for the scheduler and the engines
pub const TICK_HZ: u32 = 9_600;

/// Soft UART line rate; four ticks per bit
pub const UART_BAUD: u32 = 2_400;

/// Soft I2C bit rate; the engine is stepped through a tick divider
pub const I2C_HZ: u32 = 1_200;

/// Default I2C target (TMP102 with ADD0 to ground)
pub const I2C_TARGET: u8 = 0x48;

pub const HEARTBEAT_MS: u32 = 500;
pub const TELEMETRY_MS: u32 = 1_000;

/// Scheduler slots
pub const MAX_TASKS: usize = 4;

/// Telemetry frames are up to 64 bytes, so the transmit side is deeper
pub type Uart = SoftUart<PushPull<'static>, InputLine<'static>, 128, 32>;
pub type I2c = SoftI2c<OpenDrain<'static>, OpenDrain<'static>>;

/// Scheduler jobs get the board as their parameter
pub type Jobs = Scheduler<&'static Board, MAX_TASKS>;

/// Everything the tick task and the foreground tasks share
pub struct Board {
    pub led: Shared<PushPull<'static>>,
    pub uart: Shared<Uart>,
    pub i2c: Shared<I2c>,
    /// Stepped by the tick task; the foreground may register and unregister
    /// jobs between ticks. Jobs run with it locked and must not touch it.
    pub scheduler: Shared<Jobs>,
    /// Events raised by the I2C engine
    pub bus_events: EventCounters,
    /// Scheduler tick count as of the last tick
    pub ticks: AtomicU32,
    /// Registered scheduler tasks, kept so jobs can report it without
    /// locking the scheduler
    pub tasks: AtomicU8,
}

impl Board {
    pub fn new(led: PushPull<'static>, uart: Uart, i2c: I2c) -> Self {
        Self {
            led: Shared::new(led),
            uart: Shared::new(uart),
            i2c: Shared::new(i2c),
            scheduler: Shared::new(Scheduler::new()),
            bus_events: EventCounters::new(),
            ticks: AtomicU32::new(0),
            tasks: AtomicU8::new(0),
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            ticks: self.ticks.load(Ordering::Relaxed),
            tasks: self.tasks.load(Ordering::Relaxed),
            serial: self.uart.with(|uart| uart.status()),
            bus_events: self.bus_events.snapshot(),
        }
    }
}
