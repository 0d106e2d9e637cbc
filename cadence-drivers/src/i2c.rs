//! Bit-banged I2C master
//!
//! Both lines are open drain: "high" means released, and the pull-up does
//! the rest. Every bit spans four ticks. SDA only changes on even ticks and
//! SCL only on odd ones, which gives START (SDA falls while SCL is high) and
//! STOP (SDA rises while SCL is high) their meaning:
//!
//! ```text
//!            tick 0        tick 1        tick 2          tick 3
//! start      release SDA   release SCL   SDA low         SCL low
//! bit out    drive SDA     release SCL   -               SCL low
//! ack in     release SDA   release SCL   sample SDA      SCL low
//! bit in     release SDA   release SCL   sample SDA      SCL low
//! ack out    ACK/NACK      release SCL   -               SCL low
//! stop       SDA low       release SCL   release SDA     finish
//! ```
//!
//! After SCL is released it is read back; a slave holding it low stretches
//! the clock, and the engine waits up to `stretch_limit` ticks before giving
//! up. A NACK or stretch timeout aborts the transfer, but a STOP is always
//! sent, so the bus is left free.

use cadence_core::log_warn;
use cadence_core::serial::{Channel, EventHandler, LineStatus, SoftSerial};
use cadence_core::{Error, FrameErrorKind};
use cadence_hal::gpio::IoPin;
use cadence_hal::i2c::{address_byte, validate_address, Direction, I2cConfig};

/// Ticks per bit
pub const TICKS_PER_BIT: u32 = 4;

/// Default clock stretch allowance in ticks
pub const DEFAULT_STRETCH_LIMIT: u16 = 64;

/// Soft I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftI2cConfig {
    /// Nominal bus rate; the real rate is the tick rate over [`TICKS_PER_BIT`]
    pub bus: I2cConfig,
    /// Target of [`SoftSerial::begin_transmit`]
    pub address: u8,
    /// Ticks a slave may hold SCL low before the transfer is abandoned
    pub stretch_limit: u16,
}

impl SoftI2cConfig {
    pub const fn new(address: u8) -> Self {
        Self {
            bus: I2cConfig::SLOW,
            address,
            stretch_limit: DEFAULT_STRETCH_LIMIT,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_address(self.address).map_err(|_| Error::InvalidAddress)?;
        Ok(())
    }
}

/// Bus phase; the number is the tick within the bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cState {
    Idle,
    /// START or repeated START
    Start(u8),
    /// Shifting out bit `bit` (0 = MSB) of an address or data byte
    SendBit { bit: u8, phase: u8 },
    /// Slave acknowledge slot
    RecvAck(u8),
    /// Shifting in bit `bit` (0 = MSB)
    RecvBit { bit: u8, phase: u8 },
    /// Master acknowledge slot after a read byte
    SendAck(u8),
    Stop(u8),
}

enum Clock {
    High,
    Held,
    TimedOut,
}

/// Bit-banged I2C master on two open-drain lines
///
/// Write data is queued in the transmit buffer, read data lands in the
/// receive buffer. One transaction runs at a time; starting another while
/// the engine is busy fails with [`Error::Busy`].
pub struct SoftI2c<SCL, SDA, const TXN: usize = 16, const RXN: usize = 16> {
    scl: SCL,
    sda: SDA,
    config: SoftI2cConfig,
    channel: Channel<TXN, RXN>,
    state: I2cState,

    address: u8,
    direction: Direction,
    sending_address: bool,
    byte: u8,
    acked: bool,
    /// Bytes to read after a repeated start, once writing is done
    read_after_write: usize,
    read_remaining: usize,
    stretch: u16,
    error: Option<FrameErrorKind>,
    outcome: Option<Result<(), FrameErrorKind>>,
}

impl<SCL, SDA, const TXN: usize, const RXN: usize> SoftI2c<SCL, SDA, TXN, RXN>
where
    SCL: IoPin,
    SDA: IoPin,
{
    /// Take the lines and release both (bus free)
    pub fn new(mut scl: SCL, mut sda: SDA, config: SoftI2cConfig) -> Result<Self, Error> {
        config.validate()?;
        sda.release();
        scl.release();
        Ok(Self {
            scl,
            sda,
            config,
            channel: Channel::new(),
            state: I2cState::Idle,
            address: config.address,
            direction: Direction::Write,
            sending_address: false,
            byte: 0,
            acked: false,
            read_after_write: 0,
            read_remaining: 0,
            stretch: 0,
            error: None,
            outcome: None,
        })
    }

    pub fn config(&self) -> &SoftI2cConfig {
        &self.config
    }

    pub fn state(&self) -> I2cState {
        self.state
    }

    /// Write `bytes` to `address`
    pub fn begin_write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.check_start(address)?;
        self.channel.enqueue(bytes)?;
        self.start(address, Direction::Write, 0, 0);
        Ok(())
    }

    /// Read `len` bytes from `address` into the receive buffer
    pub fn begin_read(&mut self, address: u8, len: usize) -> Result<(), Error> {
        self.check_start(address)?;
        self.check_read_len(len)?;
        self.start(address, Direction::Read, 0, len);
        Ok(())
    }

    /// Write `bytes`, then repeated START and read `len` bytes
    ///
    /// The usual register read: write the register index, read its value.
    pub fn begin_write_read(&mut self, address: u8, bytes: &[u8], len: usize) -> Result<(), Error> {
        self.check_start(address)?;
        self.check_read_len(len)?;
        self.channel.enqueue(bytes)?;
        self.start(address, Direction::Write, len, 0);
        Ok(())
    }

    /// Address `address` with no data, to see whether anything answers
    ///
    /// The answer is in [`take_outcome`](Self::take_outcome) once the engine
    /// is idle again.
    pub fn probe(&mut self, address: u8) -> Result<(), Error> {
        self.check_start(address)?;
        self.start(address, Direction::Write, 0, 0);
        Ok(())
    }

    /// Result of the last finished transaction, cleared on read
    pub fn take_outcome(&mut self) -> Option<Result<(), FrameErrorKind>> {
        self.outcome.take()
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.channel.read_byte()
    }

    fn check_start(&self, address: u8) -> Result<(), Error> {
        if self.state != I2cState::Idle {
            return Err(Error::Busy);
        }
        validate_address(address).map_err(|_| Error::InvalidAddress)?;
        Ok(())
    }

    fn check_read_len(&self, len: usize) -> Result<(), Error> {
        if len == 0 {
            return Err(Error::InvalidConfig);
        }
        // Unread bytes count against the read
        if len > self.channel.rx_free() {
            return Err(Error::CapacityExceeded);
        }
        Ok(())
    }

    fn start(&mut self, address: u8, direction: Direction, read_after_write: usize, read: usize) {
        self.address = address;
        self.direction = direction;
        self.read_after_write = read_after_write;
        self.read_remaining = read;
        self.error = None;
        self.outcome = None;
        self.stretch = 0;
        self.state = I2cState::Start(0);
    }

    /// Release SCL and read it back
    fn release_clock(&mut self) -> Clock {
        if self.stretch == 0 {
            self.scl.release();
        }
        if self.scl.is_high() {
            self.stretch = 0;
            return Clock::High;
        }
        if self.stretch >= self.config.stretch_limit {
            self.stretch = 0;
            Clock::TimedOut
        } else {
            self.stretch += 1;
            Clock::Held
        }
    }

    /// Release SCL and move to `next` once it is high
    fn clock_high(&mut self, next: I2cState) {
        match self.release_clock() {
            Clock::High => self.state = next,
            Clock::Held => {}
            Clock::TimedOut => self.fail(FrameErrorKind::ClockStretchTimeout),
        }
    }

    /// Abandon the transfer; a STOP follows
    fn fail(&mut self, kind: FrameErrorKind) {
        log_warn!("i2c {} at address {}", kind, self.address);
        self.error = Some(kind);
        self.channel.clear_tx();
        self.read_after_write = 0;
        self.read_remaining = 0;
        self.state = I2cState::Stop(0);
    }

    fn send_byte(&mut self, byte: u8) {
        self.byte = byte;
        self.state = I2cState::SendBit { bit: 0, phase: 0 };
    }

    fn receive_byte(&mut self) {
        self.byte = 0;
        self.state = I2cState::RecvBit { bit: 0, phase: 0 };
    }

    /// Decide what follows an acknowledge slot
    fn after_ack(&mut self) {
        if !self.acked {
            self.fail(FrameErrorKind::Nack);
            return;
        }

        if self.sending_address {
            self.sending_address = false;
            if self.direction == Direction::Read {
                self.receive_byte();
                return;
            }
        } else {
            self.channel.transmitted();
        }

        if let Some(byte) = self.channel.next_tx() {
            self.send_byte(byte);
        } else if self.read_after_write > 0 {
            self.direction = Direction::Read;
            self.read_remaining = self.read_after_write;
            self.read_after_write = 0;
            self.state = I2cState::Start(0);
        } else {
            self.state = I2cState::Stop(0);
        }
    }

    fn finish(&mut self) {
        self.state = I2cState::Idle;
        match self.error.take() {
            Some(kind) => {
                self.outcome = Some(Err(kind));
                self.channel.frame_error(kind);
            }
            None => {
                self.outcome = Some(Ok(()));
                self.channel.tx_empty();
            }
        }
    }

    fn tick_start(&mut self, phase: u8) {
        match phase {
            0 => {
                self.sda.release();
                self.state = I2cState::Start(1);
            }
            1 => self.clock_high(I2cState::Start(2)),
            2 => {
                self.sda.drive_low();
                self.state = I2cState::Start(3);
            }
            _ => {
                self.scl.drive_low();
                self.sending_address = true;
                self.send_byte(address_byte(self.address, self.direction));
            }
        }
    }

    fn tick_send_bit(&mut self, bit: u8, phase: u8) {
        match phase {
            0 => {
                if self.byte & (0x80 >> bit) != 0 {
                    self.sda.release();
                } else {
                    self.sda.drive_low();
                }
                self.state = I2cState::SendBit { bit, phase: 1 };
            }
            1 => self.clock_high(I2cState::SendBit { bit, phase: 2 }),
            2 => self.state = I2cState::SendBit { bit, phase: 3 },
            _ => {
                self.scl.drive_low();
                self.state = if bit < 7 {
                    I2cState::SendBit {
                        bit: bit + 1,
                        phase: 0,
                    }
                } else {
                    I2cState::RecvAck(0)
                };
            }
        }
    }

    fn tick_recv_ack(&mut self, phase: u8) {
        match phase {
            0 => {
                self.sda.release();
                self.state = I2cState::RecvAck(1);
            }
            1 => self.clock_high(I2cState::RecvAck(2)),
            2 => {
                self.acked = self.sda.is_low();
                self.state = I2cState::RecvAck(3);
            }
            _ => {
                self.scl.drive_low();
                self.after_ack();
            }
        }
    }

    fn tick_recv_bit(&mut self, bit: u8, phase: u8) {
        match phase {
            0 => {
                if bit == 0 {
                    self.sda.release();
                }
                self.state = I2cState::RecvBit { bit, phase: 1 };
            }
            1 => self.clock_high(I2cState::RecvBit { bit, phase: 2 }),
            2 => {
                if self.sda.is_high() {
                    self.byte |= 0x80 >> bit;
                }
                self.state = I2cState::RecvBit { bit, phase: 3 };
            }
            _ => {
                self.scl.drive_low();
                if bit < 7 {
                    self.state = I2cState::RecvBit {
                        bit: bit + 1,
                        phase: 0,
                    };
                } else {
                    self.channel.receive(self.byte);
                    self.read_remaining = self.read_remaining.saturating_sub(1);
                    self.state = I2cState::SendAck(0);
                }
            }
        }
    }

    fn tick_send_ack(&mut self, phase: u8) {
        match phase {
            0 => {
                // ACK every byte but the last
                if self.read_remaining > 0 {
                    self.sda.drive_low();
                } else {
                    self.sda.release();
                }
                self.state = I2cState::SendAck(1);
            }
            1 => self.clock_high(I2cState::SendAck(2)),
            2 => self.state = I2cState::SendAck(3),
            _ => {
                self.scl.drive_low();
                if self.read_remaining > 0 {
                    self.receive_byte();
                } else {
                    self.state = I2cState::Stop(0);
                }
            }
        }
    }

    fn tick_stop(&mut self, phase: u8) {
        match phase {
            0 => {
                self.sda.drive_low();
                self.state = I2cState::Stop(1);
            }
            1 => match self.release_clock() {
                Clock::High => self.state = I2cState::Stop(2),
                Clock::Held => {}
                Clock::TimedOut => {
                    // Nothing left to abandon; free SDA regardless
                    self.error.get_or_insert(FrameErrorKind::ClockStretchTimeout);
                    self.state = I2cState::Stop(2);
                }
            },
            2 => {
                self.sda.release();
                self.state = I2cState::Stop(3);
            }
            _ => self.finish(),
        }
    }
}

impl<SCL, SDA, const TXN: usize, const RXN: usize> SoftSerial for SoftI2c<SCL, SDA, TXN, RXN>
where
    SCL: IoPin,
    SDA: IoPin,
{
    fn on_tick(&mut self) {
        match self.state {
            I2cState::Idle => {}
            I2cState::Start(phase) => self.tick_start(phase),
            I2cState::SendBit { bit, phase } => self.tick_send_bit(bit, phase),
            I2cState::RecvAck(phase) => self.tick_recv_ack(phase),
            I2cState::RecvBit { bit, phase } => self.tick_recv_bit(bit, phase),
            I2cState::SendAck(phase) => self.tick_send_ack(phase),
            I2cState::Stop(phase) => self.tick_stop(phase),
        }
    }

    /// Write `bytes` to the configured target address
    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.begin_write(self.config.address, bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.channel.read(buf)
    }

    fn available(&self) -> usize {
        self.channel.available()
    }

    fn is_idle(&self) -> bool {
        self.state == I2cState::Idle
    }

    /// Drop the transfer and release both lines without a STOP
    fn abort(&mut self) {
        self.channel.clear_tx();
        self.read_after_write = 0;
        self.read_remaining = 0;
        self.error = None;
        self.stretch = 0;
        self.sda.release();
        self.scl.release();
        self.state = I2cState::Idle;
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
    use crate::mock::{EventLog, MockLine, Trace};
    use cadence_core::serial::SerialEvent;

    type I2c = SoftI2c<MockLine, MockLine, 4, 4>;

    const TMP006: u8 = 0x40;

    #[derive(Debug, PartialEq)]
    enum Frame {
        Start,
        /// Eight bits as seen on SDA plus the ninth (acknowledge) bit
        Byte(u8, bool),
        Stop,
    }

    /// Decode the master's side of the bus from its write trace
    fn decode(trace: &Trace) -> Vec<Frame> {
        let mut frames = Vec::new();
        let (mut scl, mut sda) = (true, true);
        let mut bits: Vec<bool> = Vec::new();

        for &(line, level) in trace.borrow().iter() {
            match line {
                'C' => {
                    if level && !scl {
                        bits.push(sda);
                        if bits.len() == 9 {
                            let byte = bits[..8].iter().fold(0u8, |acc, &b| (acc << 1) | b as u8);
                            frames.push(Frame::Byte(byte, bits[8]));
                            bits.clear();
                        }
                    }
                    scl = level;
                }
                _ => {
                    if scl && level != sda {
                        frames.push(if level { Frame::Stop } else { Frame::Start });
                        bits.clear();
                    }
                    sda = level;
                }
            }
        }
        frames
    }

    struct Bus {
        scl: MockLine,
        sda: MockLine,
        trace: Trace,
    }

    fn bus(config: SoftI2cConfig) -> (I2c, Bus) {
        let trace = Trace::default();
        let scl = MockLine::traced('C', &trace);
        let sda = MockLine::traced('D', &trace);
        let i2c = I2c::new(scl.clone(), sda.clone(), config).unwrap();
        trace.borrow_mut().clear();
        (i2c, Bus { scl, sda, trace })
    }

    fn run(i2c: &mut I2c) -> usize {
        let mut ticks = 0;
        while !i2c.is_idle() {
            i2c.on_tick();
            ticks += 1;
            assert!(ticks < 10_000, "transfer never finished");
        }
        ticks
    }

    #[test]
    fn test_write_bytes() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        let events = EventLog::leak();
        i2c.set_handler(Some(events));

        bus.sda.script(&[false, false, false]);
        i2c.begin_transmit(&[0x02, 0x75]).unwrap();
        let ticks = run(&mut i2c);

        // start, three bytes with ack, stop
        assert_eq!(ticks as u32, TICKS_PER_BIT * (1 + 3 * 9 + 1));
        assert_eq!(
            decode(&bus.trace),
            vec![
                Frame::Start,
                Frame::Byte(0x80, true),
                Frame::Byte(0x02, true),
                Frame::Byte(0x75, true),
                Frame::Stop,
            ]
        );
        assert_eq!(events.take(), vec![SerialEvent::TxEmpty]);
        assert_eq!(i2c.take_outcome(), Some(Ok(())));
        assert_eq!(i2c.status().tx_frames, 2);
        assert!(bus.scl.level() && bus.sda.level());
    }

    #[test]
    fn test_nack_recovers() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        let events = EventLog::leak();
        i2c.set_handler(Some(events));

        // Nobody pulls SDA low: address NACK
        i2c.begin_transmit(&[0x01, 0x02]).unwrap();
        run(&mut i2c);

        assert_eq!(
            decode(&bus.trace),
            vec![Frame::Start, Frame::Byte(0x80, true), Frame::Stop]
        );
        assert_eq!(
            events.take(),
            vec![SerialEvent::FrameError(FrameErrorKind::Nack)]
        );
        assert_eq!(i2c.state(), I2cState::Idle);
        assert_eq!(i2c.status().frame_error, Some(FrameErrorKind::Nack));
        assert_eq!(i2c.take_outcome(), Some(Err(FrameErrorKind::Nack)));

        // Next transfer runs normally
        bus.trace.borrow_mut().clear();
        bus.sda.script(&[false, false]);
        assert_eq!(i2c.begin_transmit(&[0x03]), Ok(()));
        run(&mut i2c);
        assert_eq!(
            decode(&bus.trace),
            vec![
                Frame::Start,
                Frame::Byte(0x80, true),
                Frame::Byte(0x03, true),
                Frame::Stop,
            ]
        );
        assert_eq!(events.take(), vec![SerialEvent::TxEmpty]);
    }

    #[test]
    fn test_data_nack_discards_rest() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        // Address acked, first data byte refused
        bus.sda.script(&[false, true]);
        i2c.begin_transmit(&[0xAA, 0xBB, 0xCC]).unwrap();
        run(&mut i2c);

        assert_eq!(
            decode(&bus.trace),
            vec![
                Frame::Start,
                Frame::Byte(0x80, true),
                Frame::Byte(0xAA, true),
                Frame::Stop,
            ]
        );
        assert_eq!(i2c.take_outcome(), Some(Err(FrameErrorKind::Nack)));
        assert_eq!(i2c.status().tx_frames, 0);
    }

    #[test]
    fn test_read_acks_all_but_last() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        let events = EventLog::leak();
        i2c.set_handler(Some(events));

        bus.sda.script(&[false]);
        bus.sda.script_byte_msb(0x0C);
        bus.sda.script_byte_msb(0xA5);
        i2c.begin_read(TMP006, 2).unwrap();
        run(&mut i2c);

        assert_eq!(
            decode(&bus.trace),
            vec![
                Frame::Start,
                Frame::Byte(0x81, true),
                Frame::Byte(0xFF, false),
                Frame::Byte(0xFF, true),
                Frame::Stop,
            ]
        );
        let mut buf = [0u8; 4];
        assert_eq!(i2c.read(&mut buf), 2);
        assert_eq!(&buf[..2], &[0x0C, 0xA5]);
        assert_eq!(
            events.take(),
            vec![SerialEvent::RxReady, SerialEvent::RxReady, SerialEvent::TxEmpty]
        );
        assert_eq!(bus.sda.script_remaining(), 0);
    }

    #[test]
    fn test_write_read_repeated_start() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        bus.sda.script(&[false, false, false]);
        bus.sda.script_byte_msb(0x54);
        i2c.begin_write_read(TMP006, &[0xFE], 1).unwrap();
        run(&mut i2c);

        assert_eq!(
            decode(&bus.trace),
            vec![
                Frame::Start,
                Frame::Byte(0x80, true),
                Frame::Byte(0xFE, true),
                Frame::Start,
                Frame::Byte(0x81, true),
                Frame::Byte(0xFF, true),
                Frame::Stop,
            ]
        );
        assert_eq!(i2c.read_byte(), Some(0x54));
        assert_eq!(i2c.take_outcome(), Some(Ok(())));
    }

    #[test]
    fn test_probe() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        bus.sda.script(&[false]);
        i2c.probe(0x39).unwrap();
        run(&mut i2c);
        assert_eq!(i2c.take_outcome(), Some(Ok(())));
        assert_eq!(
            decode(&bus.trace),
            vec![Frame::Start, Frame::Byte(0x72, true), Frame::Stop]
        );

        i2c.probe(0x3A).unwrap();
        run(&mut i2c);
        assert_eq!(i2c.take_outcome(), Some(Err(FrameErrorKind::Nack)));
        assert_eq!(i2c.take_outcome(), None);
    }

    #[test]
    fn test_clock_stretch_waits() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        bus.sda.script(&[false]);
        // Slave holds SCL during the first address bit
        bus.scl.script(&[true, false, false, false]);
        i2c.probe(TMP006).unwrap();
        let ticks = run(&mut i2c);

        assert_eq!(ticks as u32, TICKS_PER_BIT * (1 + 9 + 1) + 3);
        assert_eq!(i2c.take_outcome(), Some(Ok(())));
        assert_eq!(bus.scl.script_remaining(), 0);
    }

    #[test]
    fn test_clock_stretch_timeout() {
        let config = SoftI2cConfig {
            stretch_limit: 3,
            ..SoftI2cConfig::new(TMP006)
        };
        let (mut i2c, bus) = bus(config);
        let events = EventLog::leak();
        i2c.set_handler(Some(events));

        // Held through the start and the stop
        bus.scl.script(&[false; 8]);
        i2c.begin_transmit(&[0x10]).unwrap();
        run(&mut i2c);

        assert_eq!(
            events.take(),
            vec![SerialEvent::FrameError(FrameErrorKind::ClockStretchTimeout)]
        );
        assert_eq!(bus.scl.script_remaining(), 0);
        assert!(bus.sda.level());
        assert!(i2c.is_idle());
    }

    #[test]
    fn test_clock_stretch_at_max_limit() {
        let config = SoftI2cConfig {
            stretch_limit: u16::MAX,
            ..SoftI2cConfig::new(TMP006)
        };
        let (mut i2c, bus) = bus(config);

        // Held for the whole allowance plus the read that gives up
        let held = usize::from(u16::MAX) + 1;
        bus.scl.script(&vec![false; held]);
        i2c.probe(TMP006).unwrap();

        let mut ticks = 0;
        while !i2c.is_idle() {
            i2c.on_tick();
            ticks += 1;
            assert!(ticks < held + 100, "transfer never finished");
        }

        assert_eq!(
            i2c.take_outcome(),
            Some(Err(FrameErrorKind::ClockStretchTimeout))
        );
        assert_eq!(bus.scl.script_remaining(), 0);
        assert!(bus.sda.level() && bus.scl.level());
    }

    #[test]
    fn test_read_counts_unread_bytes() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        let events = EventLog::leak();
        i2c.set_handler(Some(events));

        bus.sda.script(&[false]);
        for byte in [1, 2, 3] {
            bus.sda.script_byte_msb(byte);
        }
        i2c.begin_read(TMP006, 3).unwrap();
        run(&mut i2c);
        events.take();

        // Three bytes left unread, one slot free
        assert_eq!(i2c.begin_read(TMP006, 2), Err(Error::CapacityExceeded));
        assert_eq!(
            i2c.begin_write_read(TMP006, &[0x01], 2),
            Err(Error::CapacityExceeded)
        );
        assert!(i2c.is_idle());

        bus.sda.script(&[false]);
        bus.sda.script_byte_msb(4);
        i2c.begin_read(TMP006, 1).unwrap();
        run(&mut i2c);

        assert_eq!(
            events.take(),
            vec![SerialEvent::RxReady, SerialEvent::TxEmpty]
        );
        assert_eq!(i2c.take_outcome(), Some(Ok(())));
        assert!(!i2c.status().overrun);
        let mut buf = [0u8; 4];
        assert_eq!(i2c.read(&mut buf), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_busy_and_argument_errors() {
        let (mut i2c, _bus) = bus(SoftI2cConfig::new(TMP006));
        assert_eq!(i2c.begin_write(0x78, &[1]), Err(Error::InvalidAddress));
        assert_eq!(i2c.begin_read(0x03, 1), Err(Error::InvalidAddress));
        assert_eq!(i2c.begin_read(TMP006, 5), Err(Error::CapacityExceeded));
        assert_eq!(i2c.begin_read(TMP006, 0), Err(Error::InvalidConfig));
        assert_eq!(
            i2c.begin_write(TMP006, &[1, 2, 3, 4, 5]),
            Err(Error::CapacityExceeded)
        );
        assert!(i2c.is_idle());

        i2c.begin_write(TMP006, &[1]).unwrap();
        i2c.on_tick();
        assert_eq!(i2c.probe(TMP006), Err(Error::Busy));
        assert_eq!(i2c.begin_transmit(&[2]), Err(Error::Busy));
    }

    #[test]
    fn test_invalid_default_address() {
        assert!(matches!(
            I2c::new(MockLine::high(), MockLine::high(), SoftI2cConfig::new(0x7C)),
            Err(Error::InvalidAddress)
        ));
    }

    #[test]
    fn test_abort_frees_bus() {
        let (mut i2c, bus) = bus(SoftI2cConfig::new(TMP006));
        i2c.begin_write(TMP006, &[0x00]).unwrap();
        // Start plus one address bit; the second bit is a zero
        for _ in 0..9 {
            i2c.on_tick();
        }
        assert!(!bus.sda.level() && !bus.scl.level());

        i2c.abort();
        assert!(i2c.is_idle());
        assert!(bus.sda.level() && bus.scl.level());
        assert_eq!(i2c.take_outcome(), None);
        assert!(i2c.begin_write(TMP006, &[0x01]).is_ok());
    }
}
