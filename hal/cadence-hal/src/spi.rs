//! SPI / SSI clocking configuration
//!
//! Clock polarity, clock phase and bit order for synchronous serial links.

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
    /// Bit order on the wire
    pub bit_order: BitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::from_mode(Mode::Mode0, 100_000)
    }
}

impl SpiConfig {
    /// Build a configuration from one of the four standard modes, MSB first
    pub fn from_mode(mode: Mode, frequency: u32) -> Self {
        let (polarity, phase) = mode.into();
        Self {
            frequency,
            polarity,
            phase,
            bit_order: BitOrder::MsbFirst,
        }
    }

    /// The standard mode matching this polarity/phase pair
    pub fn mode(&self) -> Mode {
        match (self.polarity, self.phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

impl Polarity {
    /// Clock level while idle
    pub const fn idle_high(self) -> bool {
        matches!(self, Polarity::IdleHigh)
    }
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// Order in which the bits of a word are shifted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

impl BitOrder {
    /// Position within a `width`-bit word of the `index`-th bit on the wire
    pub const fn bit_position(self, index: u8, width: u8) -> u8 {
        match self {
            BitOrder::MsbFirst => width - 1 - index,
            BitOrder::LsbFirst => index,
        }
    }
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3] {
            assert_eq!(SpiConfig::from_mode(mode, 1_000).mode(), mode);
        }
    }

    #[test]
    fn test_bit_position() {
        assert_eq!(BitOrder::MsbFirst.bit_position(0, 8), 7);
        assert_eq!(BitOrder::MsbFirst.bit_position(7, 8), 0);
        assert_eq!(BitOrder::LsbFirst.bit_position(0, 8), 0);
        assert_eq!(BitOrder::MsbFirst.bit_position(0, 4), 3);
    }

    #[test]
    fn test_idle_level() {
        assert!(!SpiConfig::from_mode(Mode::Mode1, 1_000).polarity.idle_high());
        assert!(SpiConfig::from_mode(Mode::Mode3, 1_000).polarity.idle_high());
    }
}
