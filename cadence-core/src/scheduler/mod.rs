//! Cooperative tick scheduler
//!
//! A fixed table of periodic tasks, stepped by one timer tick. No task is
//! ever preempted by another; each runs to completion inside `tick()`.

mod table;
mod task;

pub use table::{ticks_between, Scheduler, MAX_SLOTS};
pub use task::{SchedulerTask, TaskFn, TaskHandle};
