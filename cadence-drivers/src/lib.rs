//! Soft serial engines
//!
//! Bit-banged implementations of [`SoftSerial`] over the pin traits from
//! cadence-hal. None of them touch a timer: each call to
//! [`SoftSerial::on_tick`] advances the line by one tick, so a single timer
//! can drive any number of engines.
//!
//! - [`SoftUart`]: asynchronous serial, 5 to 8 data bits, optional parity
//! - [`SoftSsi`]: SPI-style master with chip select, any of the four modes
//! - [`SoftI2c`]: I2C master with clock stretching and repeated START
//!
//! [`SoftSerial`]: cadence_core::serial::SoftSerial
//! [`SoftSerial::on_tick`]: cadence_core::serial::SoftSerial::on_tick

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c;
pub mod ssi;
pub mod uart;

#[cfg(test)]
mod mock;

pub use i2c::{I2cState, SoftI2c, SoftI2cConfig};
pub use ssi::{SoftSsi, SoftSsiConfig, SsiState};
pub use uart::{RxState, SoftUart, SoftUartConfig, TxState};
