//! Fixed-capacity cooperative scheduler

use crate::config::TaskConfig;
use crate::error::Error;

use super::task::{SchedulerTask, TaskHandle};

#[derive(Debug, Clone, Copy)]
struct Slot<P> {
    task: Option<SchedulerTask<P>>,
    generation: u16,
}

impl<P: Copy> Slot<P> {
    const EMPTY: Self = Self {
        task: None,
        generation: 0,
    };
}

/// Cooperative task scheduler with `N` slots
///
/// [`tick`](Self::tick) is called once per timer interrupt. It walks the
/// table in slot order, counts every active task down by one and runs the
/// ones that reach zero. Lower slots run first when several tasks are due on
/// the same tick, and a freed slot is reused by the next registration.
///
/// The table never allocates; `tick` costs one pass over `N` slots.
#[derive(Debug)]
pub struct Scheduler<P: Copy, const N: usize> {
    slots: [Slot<P>; N],
    tick_count: u32,
}

impl<P: Copy, const N: usize> Default for Scheduler<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Most slots a [`TaskHandle`] can address
pub const MAX_SLOTS: usize = u16::MAX as usize + 1;

impl<P: Copy, const N: usize> Scheduler<P, N> {
    const SLOTS_FIT: () = assert!(N <= MAX_SLOTS, "task table larger than a handle can address");

    /// Create an empty scheduler
    pub const fn new() -> Self {
        let () = Self::SLOTS_FIT;
        Self {
            slots: [Slot::EMPTY; N],
            tick_count: 0,
        }
    }

    /// Build a scheduler from a static task list
    ///
    /// Tasks are registered in list order, so list order is dispatch order.
    /// Entries with `enabled: false` are registered paused.
    pub fn from_config(tasks: &[TaskConfig<P>]) -> Result<Self, Error> {
        let mut scheduler = Self::new();
        for config in tasks {
            let mut task = SchedulerTask::new(config.function, config.param, config.period_ticks);
            if !config.enabled {
                task = task.paused();
            }
            scheduler.register(task)?;
        }
        Ok(scheduler)
    }

    /// Insert a task into the first free slot
    ///
    /// The task becomes eligible from the next tick.
    pub fn register(&mut self, task: SchedulerTask<P>) -> Result<TaskHandle, Error> {
        if task.period == 0 {
            return Err(Error::InvalidPeriod);
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.task.is_none())
            .ok_or(Error::CapacityExceeded)?;

        slot.task = Some(task);
        log_debug!("task registered in slot {}", index);

        // index < N <= MAX_SLOTS
        Ok(TaskHandle {
            slot: index as u16,
            generation: slot.generation,
        })
    }

    /// Free the slot held by `handle`
    ///
    /// A second call with the same handle returns [`Error::NotFound`] and
    /// leaves every other task untouched.
    pub fn unregister(&mut self, handle: TaskHandle) -> Result<(), Error> {
        let slot = self.slot_mut(handle)?;
        slot.task = None;
        slot.generation = slot.generation.wrapping_add(1);
        log_debug!("task unregistered from slot {}", handle.slot);
        Ok(())
    }

    /// Resume a paused task
    ///
    /// With `run_now` the task is dispatched on the next tick; otherwise it
    /// continues its countdown from where it was paused.
    pub fn enable(&mut self, handle: TaskHandle, run_now: bool) -> Result<(), Error> {
        let task = self.task_mut(handle)?;
        task.active = true;
        if run_now {
            task.remaining = 1;
        }
        Ok(())
    }

    /// Pause a task without freeing its slot
    pub fn disable(&mut self, handle: TaskHandle) -> Result<(), Error> {
        self.task_mut(handle)?.active = false;
        Ok(())
    }

    /// Change a task's period
    ///
    /// The countdown is clamped so the task is never further than `period`
    /// ticks from its next dispatch.
    pub fn set_period(&mut self, handle: TaskHandle, period: u32) -> Result<(), Error> {
        if period == 0 {
            return Err(Error::InvalidPeriod);
        }
        let task = self.task_mut(handle)?;
        task.period = period;
        task.remaining = task.remaining.clamp(1, period);
        Ok(())
    }

    /// Advance one tick and dispatch every task that became due
    ///
    /// Returns the number of tasks run. Task functions execute in the
    /// caller's context; they must not block and must not touch this
    /// scheduler.
    pub fn tick(&mut self) -> usize {
        self.tick_count = self.tick_count.wrapping_add(1);

        let mut dispatched = 0;
        for slot in self.slots.iter_mut() {
            if let Some(task) = slot.task.as_mut() {
                if task.step() {
                    (task.function)(task.param);
                    dispatched += 1;
                }
            }
        }
        dispatched
    }

    /// Ticks since creation, wrapping at `u32::MAX`
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Ticks elapsed since an earlier [`tick_count`](Self::tick_count)
    pub fn elapsed_ticks(&self, since: u32) -> u32 {
        ticks_between(since, self.tick_count)
    }

    /// Look up a registered task
    pub fn task(&self, handle: TaskHandle) -> Result<&SchedulerTask<P>, Error> {
        self.slots
            .get(handle.slot())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.task.as_ref())
            .ok_or(Error::NotFound)
    }

    /// Number of times a task has been dispatched
    pub fn run_count(&self, handle: TaskHandle) -> Result<u32, Error> {
        self.task(handle).map(SchedulerTask::runs)
    }

    /// Handle for the task currently in `index`, if any
    pub fn handle_at(&self, index: usize) -> Option<TaskHandle> {
        let slot = self.slots.get(index)?;
        slot.task.as_ref()?;
        Some(TaskHandle {
            slot: index as u16,
            generation: slot.generation,
        })
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.task.is_some()).count()
    }

    /// Number of active (not paused) tasks
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.task.is_some_and(|task| task.active))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    fn slot_mut(&mut self, handle: TaskHandle) -> Result<&mut Slot<P>, Error> {
        self.slots
            .get_mut(handle.slot())
            .filter(|slot| slot.generation == handle.generation && slot.task.is_some())
            .ok_or(Error::NotFound)
    }

    fn task_mut(&mut self, handle: TaskHandle) -> Result<&mut SchedulerTask<P>, Error> {
        self.slot_mut(handle)?.task.as_mut().ok_or(Error::NotFound)
    }
}

/// Ticks from `start` to `end`, correct across one wrap of the counter
pub const fn ticks_between(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start)
}
