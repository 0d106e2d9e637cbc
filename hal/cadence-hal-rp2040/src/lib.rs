//! RP2040 adapters for the Cadence pin traits
//!
//! Wraps `embassy-rp` GPIO drivers so the soft-serial engines can run on
//! real pins:
//!
//! - [`PushPull`]: push-pull output (UART TX, SSI clock, data out, chip select)
//! - [`InputLine`]: plain input (UART RX, SSI data in)
//! - [`OpenDrain`]: emulated open-drain line for I2C SCL and SDA

#![no_std]

pub mod gpio;

pub use gpio::{InputLine, OpenDrain, PushPull};
