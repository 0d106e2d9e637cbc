//! Task descriptors and handles

/// Task entry point: takes the opaque parameter, returns nothing, never blocks
pub type TaskFn<P> = fn(P);

/// One entry of the task table
#[derive(Debug, Clone, Copy)]
pub struct SchedulerTask<P> {
    pub(crate) function: TaskFn<P>,
    pub(crate) param: P,
    /// Dispatch period in ticks (>= 1)
    pub(crate) period: u32,
    /// Ticks until the next dispatch, always in `0..=period`
    pub(crate) remaining: u32,
    pub(crate) active: bool,
    pub(crate) runs: u32,
}

impl<P> SchedulerTask<P> {
    /// Describe a task that runs `function(param)` every `period` ticks
    ///
    /// The countdown starts full, so the first dispatch happens `period`
    /// ticks after registration.
    pub const fn new(function: TaskFn<P>, param: P, period: u32) -> Self {
        Self {
            function,
            param,
            period,
            remaining: period,
            active: true,
            runs: 0,
        }
    }

    /// Register the task paused; it will not run until enabled
    pub const fn paused(mut self) -> Self {
        self.active = false;
        self
    }

    /// Dispatch period in ticks
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks left before the next dispatch
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the task is eligible for dispatch
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of times the task has been dispatched
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Count down one tick; returns true when the task is due
    pub(crate) fn step(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.period;
            self.runs = self.runs.wrapping_add(1);
            true
        } else {
            false
        }
    }
}

/// Reference to a registered task
///
/// Carries the generation of the slot it was issued for, so a handle kept
/// after its task was unregistered cannot address whatever task reuses the
/// slot later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle {
    pub(crate) slot: u16,
    pub(crate) generation: u16,
}

impl TaskHandle {
    /// Slot index in the task table, which is also the dispatch order
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}
