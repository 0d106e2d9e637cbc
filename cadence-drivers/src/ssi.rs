//! Bit-banged SSI (SPI master)
//!
//! Full duplex: every word shifted out on MOSI shifts one in from MISO.
//! Chip select is asserted (low) one tick before the first clock edge and
//! held across back-to-back words; it is released one tick after the last.
//!
//! Each bit spans four ticks and every tick does exactly one thing:
//!
//! ```text
//!            tick 0   tick 1   tick 2   tick 3
//! CPHA = 0   drive    lead     sample   trail
//! CPHA = 1   lead     drive    trail    sample
//! ```
//!
//! `lead` moves the clock away from its idle level (CPOL) and `trail`
//! returns it, so data and clock never change on the same tick.

use cadence_core::serial::{Channel, EventHandler, LineStatus, SoftSerial};
use cadence_core::Error;
use cadence_hal::gpio::{InputPin, OutputPin};
use cadence_hal::spi::{Phase, SpiConfig};

/// Number of ticks per bit
pub const TICKS_PER_BIT: u8 = 4;

/// Soft SSI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftSsiConfig {
    /// Clock polarity, phase and bit order
    pub spi: SpiConfig,
    /// Bits per word, 4 to 8
    pub frame_bits: u8,
}

impl Default for SoftSsiConfig {
    fn default() -> Self {
        Self {
            spi: SpiConfig::default(),
            frame_bits: 8,
        }
    }
}

impl SoftSsiConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(4..=8).contains(&self.frame_bits) {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    fn word_mask(&self) -> u8 {
        (((1u16) << self.frame_bits) - 1) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Drive,
    Lead,
    Sample,
    Trail,
}

const CPHA0: [Step; 4] = [Step::Drive, Step::Lead, Step::Sample, Step::Trail];
const CPHA1: [Step; 4] = [Step::Lead, Step::Drive, Step::Trail, Step::Sample];

/// Where the shifter is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SsiState {
    Idle,
    /// Shifting bit `index` of the word, `phase` of [`TICKS_PER_BIT`]
    Bit { index: u8, phase: u8 },
    /// Last word done, chip select still asserted
    Deselect,
}

/// Bit-banged SSI master
pub struct SoftSsi<CLK, MOSI, MISO, CS, const TXN: usize = 16, const RXN: usize = 16> {
    clk: CLK,
    mosi: MOSI,
    miso: MISO,
    cs: CS,
    config: SoftSsiConfig,
    steps: [Step; 4],
    channel: Channel<TXN, RXN>,
    state: SsiState,
    tx_word: u8,
    rx_word: u8,
}

impl<CLK, MOSI, MISO, CS, const TXN: usize, const RXN: usize>
    SoftSsi<CLK, MOSI, MISO, CS, TXN, RXN>
where
    CLK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
{
    /// Take the pins and park them: clock at CPOL, chip select released
    pub fn new(
        clk: CLK,
        mosi: MOSI,
        miso: MISO,
        cs: CS,
        config: SoftSsiConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let steps = match config.spi.phase {
            Phase::CaptureOnFirstTransition => CPHA0,
            Phase::CaptureOnSecondTransition => CPHA1,
        };
        let mut ssi = Self {
            clk,
            mosi,
            miso,
            cs,
            config,
            steps,
            channel: Channel::new(),
            state: SsiState::Idle,
            tx_word: 0,
            rx_word: 0,
        };
        ssi.park();
        ssi.mosi.set_low();
        Ok(ssi)
    }

    pub fn config(&self) -> &SoftSsiConfig {
        &self.config
    }

    pub fn state(&self) -> SsiState {
        self.state
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.channel.read_byte()
    }

    fn park(&mut self) {
        self.clk.set_state(self.config.spi.polarity.idle_high());
        self.cs.set_high();
    }

    fn load(&mut self, word: u8) {
        self.tx_word = word & self.config.word_mask();
        self.rx_word = 0;
        self.state = SsiState::Bit { index: 0, phase: 0 };
    }

    fn bit_mask(&self, index: u8) -> u8 {
        1 << self.config.spi.bit_order.bit_position(index, self.config.frame_bits)
    }

    fn step(&mut self, index: u8, phase: u8) {
        let idle_high = self.config.spi.polarity.idle_high();
        match self.steps[phase as usize] {
            Step::Drive => {
                let high = self.tx_word & self.bit_mask(index) != 0;
                self.mosi.set_state(high);
            }
            Step::Lead => self.clk.set_state(!idle_high),
            Step::Trail => self.clk.set_state(idle_high),
            Step::Sample => {
                if self.miso.is_high() {
                    self.rx_word |= self.bit_mask(index);
                }
            }
        }

        if phase + 1 < TICKS_PER_BIT {
            self.state = SsiState::Bit {
                index,
                phase: phase + 1,
            };
        } else if index + 1 < self.config.frame_bits {
            self.state = SsiState::Bit {
                index: index + 1,
                phase: 0,
            };
        } else {
            self.channel.transmitted();
            self.channel.receive(self.rx_word);
            match self.channel.next_tx() {
                Some(word) => self.load(word),
                None => self.state = SsiState::Deselect,
            }
        }
    }
}

impl<CLK, MOSI, MISO, CS, const TXN: usize, const RXN: usize> SoftSerial
    for SoftSsi<CLK, MOSI, MISO, CS, TXN, RXN>
where
    CLK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
{
    fn on_tick(&mut self) {
        match self.state {
            SsiState::Idle => {
                if let Some(word) = self.channel.next_tx() {
                    self.cs.set_low();
                    self.load(word);
                }
            }
            SsiState::Bit { index, phase } => self.step(index, phase),
            SsiState::Deselect => {
                self.cs.set_high();
                self.state = SsiState::Idle;
                self.channel.tx_empty();
            }
        }
    }

    fn begin_transmit(&mut self, words: &[u8]) -> Result<(), Error> {
        self.channel.enqueue(words)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.channel.read(buf)
    }

    fn available(&self) -> usize {
        self.channel.available()
    }

    fn is_idle(&self) -> bool {
        self.state == SsiState::Idle && self.channel.tx_pending() == 0
    }

    fn abort(&mut self) {
        self.channel.clear_tx();
        self.state = SsiState::Idle;
        self.park();
    }

    fn set_handler(
        &mut self,
        handler: Option<&'static dyn EventHandler>,
    ) -> Option<&'static dyn EventHandler> {
        self.channel.set_handler(handler)
    }

    fn status(&self) -> LineStatus {
        self.channel.status()
    }

    fn clear_status(&mut self) {
        self.channel.clear_status();
    }
}
