//! Static task lists

use crate::scheduler::TaskFn;

/// One entry of a static task list for [`Scheduler::from_config`]
///
/// [`Scheduler::from_config`]: crate::scheduler::Scheduler::from_config
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig<P> {
    /// Entry point
    pub function: TaskFn<P>,
    /// Opaque parameter passed on every dispatch
    pub param: P,
    /// Period in ticks, see [`TickConfig::period_ticks`](super::TickConfig::period_ticks)
    pub period_ticks: u32,
    /// Register paused when false
    pub enabled: bool,
}

impl<P> TaskConfig<P> {
    /// Enabled task running every `period_ticks`
    pub const fn new(function: TaskFn<P>, param: P, period_ticks: u32) -> Self {
        Self {
            function,
            param,
            period_ticks,
            enabled: true,
        }
    }
}
