//! Board-agnostic core of the tick-driven runtime
//!
//! Everything here is plain data plus the logic that steps it. Nothing
//! touches hardware; the firmware owns the timer and the pins.
//!
//! - [`scheduler`] - Fixed-capacity cooperative task table
//! - [`serial`] - Buffers, events and the [`serial::SoftSerial`] contract
//!   shared by the bit-banged engines
//! - [`sync`] - Critical-section cell for state shared with the tick handler
//! - [`config`] - Tick rate conversions and static task lists
//! - [`diagnostics`] - Runtime snapshot for telemetry
//! - [`error`] - Error taxonomy

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
pub mod log;

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod scheduler;
pub mod serial;
pub mod sync;

pub use error::{Error, FrameErrorKind};
pub use scheduler::{Scheduler, SchedulerTask, TaskHandle};
pub use sync::Shared;
