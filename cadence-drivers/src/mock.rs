//! Recording pin mock shared by the engine tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;

use cadence_core::serial::{EventHandler, SerialEvent};
use cadence_hal::gpio::{InputPin, OutputPin};

/// Writes to several lines, in the order they happened
pub type Trace = Rc<RefCell<Vec<(char, bool)>>>;

#[derive(Default)]
struct LineState {
    level: bool,
    history: Vec<bool>,
    script: VecDeque<bool>,
    reads: usize,
    trace: Option<(char, Trace)>,
}

impl LineState {
    fn write(&mut self, high: bool) {
        self.level = high;
        self.history.push(high);
        if let Some((tag, trace)) = &self.trace {
            trace.borrow_mut().push((*tag, high));
        }
    }
}

/// A single wire
///
/// Clones share the wire, so a test can hand one clone to an engine and keep
/// another to inspect it, or give the same wire to a transmitter and a
/// receiver for loopback. Every `set_*` call is appended to the history.
/// Reads consume the script first and fall back to the current level.
#[derive(Clone, Default)]
pub struct MockLine(Rc<RefCell<LineState>>);

impl MockLine {
    /// Line resting high, like a UART idle or a pulled-up bus
    pub fn high() -> Self {
        let line = Self::default();
        line.0.borrow_mut().level = true;
        line
    }

    pub fn low() -> Self {
        Self::default()
    }

    /// High line whose writes are also appended to `trace` under `tag`
    pub fn traced(tag: char, trace: &Trace) -> Self {
        let line = Self::high();
        line.0.borrow_mut().trace = Some((tag, trace.clone()));
        line
    }

    /// Queue levels to be returned by the next reads
    pub fn script(&self, levels: &[bool]) {
        self.0.borrow_mut().script.extend(levels.iter().copied());
    }

    /// Queue the bits of `byte`, most significant first
    pub fn script_byte_msb(&self, byte: u8) {
        let bits: Vec<bool> = (0..8).rev().map(|i| byte & (1 << i) != 0).collect();
        self.script(&bits);
    }

    /// Every level written so far, oldest first
    pub fn history(&self) -> Vec<bool> {
        self.0.borrow().history.clone()
    }

    pub fn clear_history(&self) {
        self.0.borrow_mut().history.clear();
    }

    pub fn level(&self) -> bool {
        self.0.borrow().level
    }

    pub fn reads(&self) -> usize {
        self.0.borrow().reads
    }

    pub fn script_remaining(&self) -> usize {
        self.0.borrow().script.len()
    }
}

impl OutputPin for MockLine {
    fn set_high(&mut self) {
        self.0.borrow_mut().write(true);
    }

    fn set_low(&mut self) {
        self.0.borrow_mut().write(false);
    }

    fn is_set_high(&self) -> bool {
        self.0.borrow().level
    }
}

impl InputPin for MockLine {
    fn is_high(&self) -> bool {
        let mut state = self.0.borrow_mut();
        state.reads += 1;
        match state.script.pop_front() {
            Some(level) => level,
            None => state.level,
        }
    }
}

/// Event handler that keeps every event it sees
pub struct EventLog(Mutex<Vec<SerialEvent>>);

impl EventLog {
    pub fn leak() -> &'static Self {
        Box::leak(Box::new(Self(Mutex::new(Vec::new()))))
    }

    pub fn take(&self) -> Vec<SerialEvent> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl EventHandler for EventLog {
    fn on_event(&self, event: SerialEvent) {
        self.0.lock().unwrap().push(event);
    }
}
