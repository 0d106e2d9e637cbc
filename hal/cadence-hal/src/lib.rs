//! Cadence Hardware Abstraction Layer
//!
//! Pin traits and line-level configuration types shared by the soft-serial
//! engines in `cadence-drivers` and the chip-specific adapters
//! (`cadence-hal-rp2040`, ...). Nothing in here touches a register; a chip
//! crate implements the pin traits and the engines only ever see those.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cadence-drivers (soft UART/SSI/I2C)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-hal-rp2040 (embassy-rp pins)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::IoPin`] - Digital I/O
//! - [`uart::UartConfig`] - Asynchronous framing (data bits, parity, stop bits)
//! - [`spi::SpiConfig`] - Clock polarity/phase and bit order
//! - [`i2c::I2cConfig`] - Bus rate and 7-bit address rules

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod uart;

pub use gpio::{InputPin, IoPin, Level, OutputPin};
pub use i2c::{AddressError, Direction, I2cConfig};
pub use spi::{BitOrder, Mode, Phase, Polarity, SpiConfig};
pub use uart::{DataBits, Parity, StopBits, UartConfig};
