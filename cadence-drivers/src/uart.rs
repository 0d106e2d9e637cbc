//! Bit-banged UART
//!
//! Frames are sent LSB first: a low start bit, the data bits, an optional
//! parity bit and one or two high stop bits. The line idles high.
//!
//! Every bit lasts `ticks_per_bit` ticks. The transmitter changes the line
//! only on bit boundaries. The receiver reads its pin exactly once per tick,
//! looks for a falling edge while idle, confirms the start bit half a bit
//! later and then samples each following bit in its middle. Only the first
//! stop bit is checked, so the receiver is ready for the next start bit as
//! early as possible.

use cadence_core::config::TickConfig;
use cadence_core::serial::{Channel, EventHandler, LineStatus, SoftSerial};
use cadence_core::{Error, FrameErrorKind};
use cadence_hal::gpio::{InputPin, OutputPin};
use cadence_hal::uart::{Parity, UartConfig};

/// Soft UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftUartConfig {
    /// Line framing; `baudrate` is informational once `ticks_per_bit` is set
    pub line: UartConfig,
    /// Ticks per bit cell (oversampling factor)
    pub ticks_per_bit: u32,
}

impl Default for SoftUartConfig {
    fn default() -> Self {
        Self {
            line: UartConfig::default(),
            ticks_per_bit: 1,
        }
    }
}

impl SoftUartConfig {
    /// Derive `ticks_per_bit` from the tick rate and `line.baudrate`
    pub fn from_tick(tick: &TickConfig, line: UartConfig) -> Result<Self, Error> {
        let ticks_per_bit = tick.bit_divisor(line.baudrate)?;
        Ok(Self {
            line,
            ticks_per_bit,
        })
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.ticks_per_bit == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

/// Bit currently on the transmit line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    Idle,
    StartBit,
    DataBit(u8),
    ParityBit,
    StopBit(u8),
}

/// Bit the receiver is waiting to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    Idle,
    StartBit,
    DataBit(u8),
    ParityBit,
    StopBit,
    /// After a framing error, waiting for the line to return high
    Recover,
}

/// Bit-banged UART on one output and one input pin
///
/// `TXN` and `RXN` are the transmit and receive buffer sizes in bytes.
pub struct SoftUart<TX, RX, const TXN: usize = 32, const RXN: usize = 32> {
    tx_pin: TX,
    rx_pin: RX,
    config: SoftUartConfig,
    channel: Channel<TXN, RXN>,

    tx_state: TxState,
    tx_byte: u8,
    tx_parity: bool,
    tx_timer: u32,

    rx_enabled: bool,
    rx_state: RxState,
    rx_byte: u8,
    rx_parity_ok: bool,
    rx_parity_high: bool,
    rx_timer: u32,
}

impl<TX, RX, const TXN: usize, const RXN: usize> SoftUart<TX, RX, TXN, RXN>
where
    TX: OutputPin,
    RX: InputPin,
{
    /// Take the pins and drive the transmit line to idle (high)
    pub fn new(mut tx_pin: TX, rx_pin: RX, config: SoftUartConfig) -> Result<Self, Error> {
        config.validate()?;
        tx_pin.set_high();
        Ok(Self {
            tx_pin,
            rx_pin,
            config,
            channel: Channel::new(),
            tx_state: TxState::Idle,
            tx_byte: 0,
            tx_parity: false,
            tx_timer: 0,
            rx_enabled: true,
            rx_state: RxState::Idle,
            rx_byte: 0,
            rx_parity_ok: true,
            rx_parity_high: false,
            rx_timer: 0,
        })
    }

    pub fn config(&self) -> &SoftUartConfig {
        &self.config
    }

    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    pub fn rx_state(&self) -> RxState {
        self.rx_state
    }

    /// Bytes still queued for transmission, not counting the one on the wire
    pub fn tx_pending(&self) -> usize {
        self.channel.tx_pending()
    }

    /// Pop one received byte
    pub fn read_byte(&mut self) -> Option<u8> {
        self.channel.read_byte()
    }

    /// Turn the receiver on or off
    ///
    /// Disabling drops any partially received frame. A disabled receiver
    /// does not read its pin.
    pub fn set_rx_enabled(&mut self, enabled: bool) {
        self.rx_enabled = enabled;
        if !enabled {
            self.rx_state = RxState::Idle;
        }
    }

    /// Give the pins back
    pub fn release(self) -> (TX, RX) {
        (self.tx_pin, self.rx_pin)
    }

    fn tick_tx(&mut self) {
        if self.tx_state == TxState::Idle {
            if let Some(byte) = self.channel.next_tx() {
                self.load(byte);
            }
            return;
        }

        self.tx_timer -= 1;
        if self.tx_timer > 0 {
            return;
        }

        let line = self.config.line;
        self.tx_state = match self.tx_state {
            TxState::StartBit => TxState::DataBit(0),
            TxState::DataBit(i) if i + 1 < line.data_bits.count() => TxState::DataBit(i + 1),
            TxState::DataBit(_) if line.parity != Parity::None => TxState::ParityBit,
            TxState::DataBit(_) | TxState::ParityBit => TxState::StopBit(0),
            TxState::StopBit(n) if n + 1 < line.stop_bits.count() => TxState::StopBit(n + 1),
            TxState::StopBit(_) | TxState::Idle => {
                self.channel.transmitted();
                match self.channel.next_tx() {
                    Some(byte) => self.load(byte),
                    None => {
                        self.tx_state = TxState::Idle;
                        self.channel.tx_empty();
                    }
                }
                return;
            }
        };
        self.drive();
    }

    /// Put the start bit of `byte` on the line
    fn load(&mut self, byte: u8) {
        let line = self.config.line;
        self.tx_byte = byte & line.data_mask();
        self.tx_parity = line.parity.bit_for(self.tx_byte).unwrap_or(true);
        self.tx_state = TxState::StartBit;
        self.drive();
    }

    fn drive(&mut self) {
        let high = match self.tx_state {
            TxState::Idle | TxState::StopBit(_) => true,
            TxState::StartBit => false,
            TxState::DataBit(i) => self.tx_byte & (1 << i) != 0,
            TxState::ParityBit => self.tx_parity,
        };
        self.tx_pin.set_state(high);
        self.tx_timer = self.config.ticks_per_bit;
    }

    fn tick_rx(&mut self) {
        if !self.rx_enabled {
            return;
        }
        let high = self.rx_pin.is_high();

        match self.rx_state {
            RxState::Idle => {
                if !high {
                    self.rx_byte = 0;
                    self.rx_parity_ok = true;
                    self.rx_parity_high = false;
                    let half = self.config.ticks_per_bit / 2;
                    if half == 0 {
                        self.rx_state = RxState::DataBit(0);
                        self.rx_timer = self.config.ticks_per_bit;
                    } else {
                        self.rx_state = RxState::StartBit;
                        self.rx_timer = half;
                    }
                }
                return;
            }
            RxState::Recover => {
                if high {
                    self.rx_state = RxState::Idle;
                }
                return;
            }
            _ => {}
        }

        self.rx_timer -= 1;
        if self.rx_timer > 0 {
            return;
        }
        self.rx_timer = self.config.ticks_per_bit;

        let line = self.config.line;
        self.rx_state = match self.rx_state {
            RxState::StartBit if high => {
                // glitch, not a start bit
                RxState::Idle
            }
            RxState::StartBit => RxState::DataBit(0),
            RxState::DataBit(i) => {
                if high {
                    self.rx_byte |= 1 << i;
                }
                if i + 1 < line.data_bits.count() {
                    RxState::DataBit(i + 1)
                } else if line.parity != Parity::None {
                    RxState::ParityBit
                } else {
                    RxState::StopBit
                }
            }
            RxState::ParityBit => {
                self.rx_parity_high = high;
                self.rx_parity_ok = line.parity.bit_for(self.rx_byte) == Some(high);
                RxState::StopBit
            }
            RxState::StopBit if !high => {
                let kind = if self.rx_byte == 0 && !self.rx_parity_high {
                    FrameErrorKind::Break
                } else {
                    FrameErrorKind::MissingStopBit
                };
                self.channel.frame_error(kind);
                RxState::Recover
            }
            RxState::StopBit => {
                if self.rx_parity_ok {
                    self.channel.receive(self.rx_byte);
                } else {
                    self.channel.frame_error(FrameErrorKind::Parity);
                }
                RxState::Idle
            }
            RxState::Idle | RxState::Recover => RxState::Idle,
        };
    }
}

impl<TX, RX, const TXN: usize, const RXN: usize> SoftSerial for SoftUart<TX, RX, TXN, RXN>
where
    TX: OutputPin,
    RX: InputPin,
{
    /// Step the transmitter, then the receiver
    fn on_tick(&mut self) {
        self.tick_tx();
        self.tick_rx();
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.channel.enqueue(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.channel.read(buf)
    }

    fn available(&self) -> usize {
        self.channel.available()
    }

    fn is_idle(&self) -> bool {
        self.tx_state == TxState::Idle
            && self.channel.tx_pending() == 0
            && self.rx_state == RxState::Idle
    }

    fn abort(&mut self) {
        self.channel.clear_tx();
        self.tx_state = TxState::Idle;
        self.tx_pin.set_high();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{EventLog, MockLine};
    use cadence_core::serial::SerialEvent;
    use cadence_core::Shared;
    use cadence_hal::uart::{DataBits, StopBits};

    type Uart = SoftUart<MockLine, MockLine, 4, 2>;

    /// Bits of one frame as they appear on the wire
    fn frame(byte: u8, line: &UartConfig) -> Vec<bool> {
        let mut bits = vec![false];
        let data = byte & line.data_mask();
        for i in 0..line.data_bits.count() {
            bits.push(data & (1 << i) != 0);
        }
        if let Some(parity) = line.parity.bit_for(data) {
            bits.push(parity);
        }
        for _ in 0..line.stop_bits.count() {
            bits.push(true);
        }
        bits
    }

    fn uart_8n1() -> (Uart, MockLine, MockLine) {
        let tx = MockLine::high();
        let rx = MockLine::high();
        let uart = Uart::new(tx.clone(), rx.clone(), SoftUartConfig::default()).unwrap();
        tx.clear_history();
        (uart, tx, rx)
    }

    #[test]
    fn test_transmit_0x55_waveform() {
        let (mut uart, tx, _rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        uart.begin_transmit(&[0x55]).unwrap();

        let mut levels = Vec::new();
        for tick in 1..=10 {
            uart.on_tick();
            levels.push(tx.level());
            assert!(events.take().is_empty(), "event before tick 11 at {}", tick);
        }
        assert_eq!(
            levels,
            vec![false, true, false, true, false, true, false, true, false, true]
        );

        uart.on_tick();
        assert_eq!(events.take(), vec![SerialEvent::TxEmpty]);
        assert!(tx.level());
        assert!(uart.is_idle());

        for _ in 0..20 {
            uart.on_tick();
        }
        assert!(events.take().is_empty());
        assert_eq!(uart.status().tx_frames, 1);
    }

    #[test]
    fn test_back_to_back_frames_share_one_tx_empty() {
        let (mut uart, tx, _rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));
        uart.begin_transmit(&[0xA3, 0x0F]).unwrap();

        for _ in 0..21 {
            uart.on_tick();
        }
        let line = UartConfig::default();
        let mut expected = frame(0xA3, &line);
        expected.extend(frame(0x0F, &line));
        assert_eq!(tx.history(), expected);
        assert_eq!(events.take(), vec![SerialEvent::TxEmpty]);
    }

    #[test]
    fn test_full_tx_buffer_rejected_unchanged() {
        let (mut uart, tx, _rx) = uart_8n1();
        uart.begin_transmit(&[1, 2, 3]).unwrap();
        assert_eq!(uart.begin_transmit(&[4, 5]), Err(Error::CapacityExceeded));
        assert_eq!(uart.tx_pending(), 3);

        for _ in 0..31 {
            uart.on_tick();
        }
        let line = UartConfig::default();
        let expected: Vec<bool> = [1, 2, 3].iter().flat_map(|&b| frame(b, &line)).collect();
        assert_eq!(tx.history(), expected);
    }

    #[test]
    fn test_parity_and_two_stop_bits() {
        let tx = MockLine::high();
        let config = SoftUartConfig {
            line: UartConfig {
                data_bits: DataBits::Seven,
                parity: Parity::Odd,
                stop_bits: StopBits::Two,
                ..Default::default()
            },
            ticks_per_bit: 1,
        };
        let mut uart: Uart = SoftUart::new(tx.clone(), MockLine::high(), config).unwrap();
        tx.clear_history();

        uart.begin_transmit(&[0x41]).unwrap();
        for _ in 0..12 {
            uart.on_tick();
        }
        assert_eq!(tx.history(), frame(0x41, &config.line));
        assert_eq!(tx.history().len(), 11);
    }

    #[test]
    fn test_oversampled_bit_cells() {
        let tx = MockLine::high();
        let config = SoftUartConfig {
            ticks_per_bit: 3,
            ..Default::default()
        };
        let mut uart: Uart = SoftUart::new(tx.clone(), MockLine::high(), config).unwrap();
        uart.begin_transmit(&[0x01]).unwrap();

        let mut levels = Vec::new();
        for _ in 0..30 {
            uart.on_tick();
            levels.push(tx.level());
        }
        let expected: Vec<bool> = frame(0x01, &config.line)
            .into_iter()
            .flat_map(|bit| [bit; 3])
            .collect();
        assert_eq!(levels, expected);
    }

    #[test]
    fn test_receive_scripted_frame() {
        let (mut uart, _tx, rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        rx.script(&frame(0x5A, &UartConfig::default()));
        for _ in 0..12 {
            uart.on_tick();
        }
        assert_eq!(events.take(), vec![SerialEvent::RxReady]);
        assert_eq!(uart.read_byte(), Some(0x5A));
        assert_eq!(uart.status().rx_frames, 1);
    }

    #[test]
    fn test_missing_stop_bit() {
        let (mut uart, _tx, rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        let mut bits = frame(0x31, &UartConfig::default());
        *bits.last_mut().unwrap() = false;
        rx.script(&bits);
        rx.script(&[false, false]);

        for _ in 0..10 {
            uart.on_tick();
        }
        assert_eq!(
            events.take(),
            vec![SerialEvent::FrameError(FrameErrorKind::MissingStopBit)]
        );
        assert_eq!(uart.rx_state(), RxState::Recover);

        // Held low, then released
        uart.on_tick();
        uart.on_tick();
        assert_eq!(uart.rx_state(), RxState::Recover);
        uart.on_tick();
        assert_eq!(uart.rx_state(), RxState::Idle);
        assert_eq!(uart.available(), 0);

        // The engine keeps receiving afterwards
        rx.script(&frame(0x42, &UartConfig::default()));
        for _ in 0..10 {
            uart.on_tick();
        }
        assert_eq!(uart.read_byte(), Some(0x42));
    }

    #[test]
    fn test_break_detected() {
        let (mut uart, _tx, rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        rx.script(&[false; 10]);
        for _ in 0..10 {
            uart.on_tick();
        }
        assert_eq!(
            events.take(),
            vec![SerialEvent::FrameError(FrameErrorKind::Break)]
        );
        assert_eq!(uart.status().frame_error, Some(FrameErrorKind::Break));
    }

    #[test]
    fn test_parity_error_drops_byte() {
        let rx = MockLine::high();
        let line = UartConfig {
            parity: Parity::Even,
            ..Default::default()
        };
        let config = SoftUartConfig {
            line,
            ticks_per_bit: 1,
        };
        let mut uart: Uart = SoftUart::new(MockLine::high(), rx.clone(), config).unwrap();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        let mut bits = frame(0x07, &line);
        bits[9] = !bits[9];
        rx.script(&bits);
        for _ in 0..11 {
            uart.on_tick();
        }
        assert_eq!(
            events.take(),
            vec![SerialEvent::FrameError(FrameErrorKind::Parity)]
        );
        assert_eq!(uart.available(), 0);

        rx.script(&frame(0x07, &line));
        for _ in 0..11 {
            uart.on_tick();
        }
        assert_eq!(events.take(), vec![SerialEvent::RxReady]);
        assert_eq!(uart.read_byte(), Some(0x07));
    }

    #[test]
    fn test_rx_overrun() {
        let (mut uart, _tx, rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        for byte in [0x10, 0x20, 0x30] {
            rx.script(&frame(byte, &UartConfig::default()));
        }
        for _ in 0..30 {
            uart.on_tick();
        }

        assert_eq!(
            events.take(),
            vec![
                SerialEvent::RxReady,
                SerialEvent::RxReady,
                SerialEvent::RxOverrun
            ]
        );
        assert!(uart.status().overrun);
        assert_eq!(SerialEvent::RxOverrun.error(), Some(Error::BufferFull));

        let mut buf = [0u8; 4];
        assert_eq!(uart.read(&mut buf), 2);
        assert_eq!(&buf[..2], &[0x10, 0x20]);

        uart.clear_status();
        assert!(!uart.status().overrun);
    }

    #[test]
    fn test_false_start_rejected() {
        let rx = MockLine::high();
        let config = SoftUartConfig {
            ticks_per_bit: 4,
            ..Default::default()
        };
        let mut uart: Uart = SoftUart::new(MockLine::high(), rx.clone(), config).unwrap();

        // One low tick, high again by mid-bit
        rx.script(&[false, true, true]);
        for _ in 0..3 {
            uart.on_tick();
        }
        assert_eq!(uart.rx_state(), RxState::Idle);
        for _ in 0..40 {
            uart.on_tick();
        }
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.status(), LineStatus::default());
    }

    #[test]
    fn test_loopback_oversampled() {
        let wire = MockLine::high();
        let config = SoftUartConfig {
            ticks_per_bit: 4,
            ..Default::default()
        };
        let mut uart: SoftUart<MockLine, MockLine, 8, 8> =
            SoftUart::new(wire.clone(), wire.clone(), config).unwrap();

        uart.begin_transmit(b"Hi!").unwrap();
        for _ in 0..(3 * 10 * 4 + 4) {
            uart.on_tick();
        }

        let mut buf = [0u8; 8];
        let n = uart.read(&mut buf);
        assert_eq!(&buf[..n], b"Hi!");
        assert!(uart.is_idle());
    }

    #[test]
    fn test_abort_returns_line_high() {
        let (mut uart, tx, _rx) = uart_8n1();
        let events = EventLog::leak();
        uart.set_handler(Some(events));

        uart.begin_transmit(&[0x00, 0x00]).unwrap();
        for _ in 0..4 {
            uart.on_tick();
        }
        assert!(!tx.level());

        uart.abort();
        assert!(tx.level());
        assert_eq!(uart.tx_state(), TxState::Idle);
        for _ in 0..30 {
            uart.on_tick();
        }
        assert!(tx.level());
        assert!(events.take().is_empty());
    }

    #[test]
    fn test_disabled_receiver_ignores_line() {
        let (mut uart, _tx, rx) = uart_8n1();
        uart.set_rx_enabled(false);
        rx.script(&frame(0x11, &UartConfig::default()));
        for _ in 0..10 {
            uart.on_tick();
        }
        assert_eq!(rx.reads(), 0);
        assert_eq!(rx.script_remaining(), 10);

        uart.set_rx_enabled(true);
        for _ in 0..10 {
            uart.on_tick();
        }
        assert_eq!(uart.read_byte(), Some(0x11));
    }

    #[test]
    fn test_zero_ticks_per_bit_rejected() {
        let config = SoftUartConfig {
            ticks_per_bit: 0,
            ..Default::default()
        };
        assert!(matches!(
            Uart::new(MockLine::high(), MockLine::high(), config),
            Err(Error::InvalidConfig)
        ));
    }

    #[test]
    fn test_config_from_tick() {
        let tick = TickConfig::new(19_200);
        let line = UartConfig {
            baudrate: 4_800,
            ..Default::default()
        };
        assert_eq!(
            SoftUartConfig::from_tick(&tick, line).map(|c| c.ticks_per_bit),
            Ok(4)
        );

        let odd = UartConfig {
            baudrate: 7_000,
            ..Default::default()
        };
        assert_eq!(
            SoftUartConfig::from_tick(&tick, odd),
            Err(Error::InvalidConfig)
        );
    }

    #[test]
    fn test_shared_engine() {
        let wire = MockLine::high();
        let uart: Shared<Uart> =
            Shared::new(Uart::new(wire.clone(), wire, SoftUartConfig::default()).unwrap());

        uart.with_mut(|u| u.begin_transmit(&[0x99])).unwrap();
        for _ in 0..10 {
            uart.with_mut(|u| u.on_tick());
        }
        assert_eq!(uart.with_mut(|u| u.read_byte()), Some(0x99));
    }
}
