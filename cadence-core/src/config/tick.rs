//! Tick-rate arithmetic

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Largest rate error tolerated by [`TickConfig::bit_divisor`], in percent
pub const MAX_RATE_ERROR_PERCENT: u64 = 2;

/// Why a timing configuration was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A rate of zero
    ZeroRate,
    /// The requested interval is shorter than one tick
    ZeroTicks,
    /// The nearest whole divisor misses the requested rate by too much
    RateMismatch,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRate => write!(f, "rate must be non-zero"),
            ConfigError::ZeroTicks => write!(f, "interval shorter than one tick"),
            ConfigError::RateMismatch => write!(f, "rate not reachable from tick rate"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(_: ConfigError) -> Self {
        Error::InvalidConfig
    }
}

/// Rate of the timer tick that drives the scheduler and the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickConfig {
    /// Tick frequency in Hz
    pub tick_hz: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { tick_hz: 1_000 }
    }
}

impl TickConfig {
    pub const fn new(tick_hz: u32) -> Self {
        Self { tick_hz }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        Ok(())
    }

    /// Tick period in microseconds, rounded down
    pub fn tick_period_us(&self) -> Result<u32, ConfigError> {
        self.validate()?;
        Ok(1_000_000 / self.tick_hz)
    }

    /// Convert a period in milliseconds to the nearest whole tick count
    ///
    /// Periods that round to zero ticks are rejected; the scheduler would
    /// refuse them anyway.
    pub fn period_ticks(&self, ms: u32) -> Result<u32, ConfigError> {
        self.validate()?;
        let ticks = (u64::from(ms) * u64::from(self.tick_hz) + 500) / 1_000;
        match ticks {
            0 => Err(ConfigError::ZeroTicks),
            t => Ok(u32::try_from(t).unwrap_or(u32::MAX)),
        }
    }

    /// Ticks per bit for a serial line running at `bit_rate` bits per second
    ///
    /// Rounds to the nearest divisor and rejects it if the resulting rate is
    /// off by more than [`MAX_RATE_ERROR_PERCENT`]. Receivers sampling mid-bit
    /// lose sync within a frame beyond that.
    pub fn bit_divisor(&self, bit_rate: u32) -> Result<u32, ConfigError> {
        self.validate()?;
        if bit_rate == 0 {
            return Err(ConfigError::ZeroRate);
        }

        let hz = u64::from(self.tick_hz);
        let rate = u64::from(bit_rate);
        let divisor = (hz + rate / 2) / rate;
        if divisor == 0 {
            return Err(ConfigError::ZeroTicks);
        }

        let nominal = divisor * rate;
        if hz.abs_diff(nominal) * 100 > nominal * MAX_RATE_ERROR_PERCENT {
            return Err(ConfigError::RateMismatch);
        }
        Ok(divisor as u32)
    }
}

/// Passes one tick in every `divisor`
///
/// Used to step an engine more slowly than the base tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDivider {
    divisor: u32,
    count: u32,
}

impl TickDivider {
    /// A divisor of zero behaves like one
    pub const fn new(divisor: u32) -> Self {
        Self {
            divisor: if divisor == 0 { 1 } else { divisor },
            count: 0,
        }
    }

    /// Count one tick; true on every `divisor`-th call
    pub fn poll(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.divisor {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }
}
