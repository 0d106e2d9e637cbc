//! GPIO adapters
//!
//! The RP2040 has no open-drain output mode. [`OpenDrain`] gets the same
//! effect with a [`Flex`] pin whose output latch stays low: driving low
//! enables the output, releasing switches back to input and lets the pull-up
//! win.

use cadence_hal::gpio::{InputPin, OutputPin};
use embassy_rp::gpio::{AnyPin, Flex, Input, Level, Output, Pull};
use embassy_rp::Peri;

/// Push-pull output
pub struct PushPull<'d> {
    pin: Output<'d>,
}

impl<'d> PushPull<'d> {
    pub fn new(pin: Peri<'d, AnyPin>, initial_high: bool) -> Self {
        let level = if initial_high { Level::High } else { Level::Low };
        Self {
            pin: Output::new(pin, level),
        }
    }
}

impl OutputPin for PushPull<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Input with the given pull
pub struct InputLine<'d> {
    pin: Input<'d>,
}

impl<'d> InputLine<'d> {
    /// UART RX idles high, so it usually wants [`Pull::Up`]
    pub fn new(pin: Peri<'d, AnyPin>, pull: Pull) -> Self {
        Self {
            pin: Input::new(pin, pull),
        }
    }
}

impl InputPin for InputLine<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Open-drain line emulated on a [`Flex`] pin
///
/// Starts released. The internal pull-up is enabled as a fallback; a real
/// I2C bus still wants external resistors.
pub struct OpenDrain<'d> {
    pin: Flex<'d>,
    released: bool,
}

impl<'d> OpenDrain<'d> {
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_low();
        pin.set_as_input();
        Self {
            pin,
            released: true,
        }
    }
}

impl OutputPin for OpenDrain<'_> {
    /// Release the line
    fn set_high(&mut self) {
        self.pin.set_as_input();
        self.released = true;
    }

    /// Pull the line low
    fn set_low(&mut self) {
        self.pin.set_low();
        self.pin.set_as_output();
        self.released = false;
    }

    fn is_set_high(&self) -> bool {
        self.released
    }
}

impl InputPin for OpenDrain<'_> {
    /// Actual bus level, which a slave may be holding low
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
