//! I2C bus configuration and addressing
//!
//! The direction bit is the LSB of the address byte: 0 for a write to the
//! slave, 1 for a read. The master never drives a line high; it releases
//! it and lets the pull-up do the work.

/// Lowest non-reserved 7-bit address
pub const MIN_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit address
pub const MAX_ADDRESS: u8 = 0x77;

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Low speed (10 kHz), the usual ceiling for a timer-driven soft master
    pub const SLOW: Self = Self { frequency: 10_000 };
}

/// Transfer direction encoded in the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

/// Reason a 7-bit address was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Does not fit in 7 bits
    OutOfRange,
    /// Falls in the reserved 0x00-0x07 or 0x78-0x7F blocks
    Reserved,
}

/// Check a 7-bit slave address
///
/// Some datasheets quote 8-bit "read/write addresses"; drop the LSB and
/// shift right once to get the 7-bit address this expects.
pub const fn validate_address(address: u8) -> Result<u8, AddressError> {
    if address > 0x7F {
        Err(AddressError::OutOfRange)
    } else if address < MIN_ADDRESS || address > MAX_ADDRESS {
        Err(AddressError::Reserved)
    } else {
        Ok(address)
    }
}

/// Address byte sent after a (repeated) start condition
pub const fn address_byte(address: u8, direction: Direction) -> u8 {
    let rw = match direction {
        Direction::Write => 0,
        Direction::Read => 1,
    };
    (address << 1) | rw
}
