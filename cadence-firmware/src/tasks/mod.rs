//! Embassy async tasks and scheduler jobs
//!
//! The tick task owns the timing. Everything else either waits on a signal
//! or runs as a scheduler job inside the tick.

pub mod echo;
pub mod jobs;
pub mod scan;
pub mod tick;

pub use echo::echo_task;
pub use scan::scan_task;
pub use tick::tick_task;
