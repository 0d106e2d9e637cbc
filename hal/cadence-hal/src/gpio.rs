//! GPIO pin abstractions
//!
//! The soft-serial engines drive and sample lines exclusively through these
//! traits. Chip crates implement them for their pin types; tests implement
//! them with recording mocks.

/// Logic level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Check if the level is high
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Drive the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Drive the pin to a [`Level`]
    fn set_level(&mut self, level: Level) {
        self.set_state(level.is_high());
    }

    /// Toggle the pin state
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Read the line as a [`Level`]
    fn level(&self) -> Level {
        Level::from(self.is_high())
    }
}

/// Open-drain line that can be both driven and read back
///
/// I2C uses this for SCL and SDA. `set_high` must *release* the line
/// (high impedance, external pull-up) rather than actively drive it, so
/// that a slave can hold it low. Reading the line then reports the real bus
/// level, which is how ACKs and clock stretching are observed.
pub trait IoPin: OutputPin + InputPin {
    /// Release the line and let the pull-up take it high
    fn release(&mut self) {
        self.set_high();
    }

    /// Pull the line low
    fn drive_low(&mut self) {
        self.set_low();
    }
}

impl<T: OutputPin + InputPin> IoPin for T {}
