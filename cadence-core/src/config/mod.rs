//! Configuration types
//!
//! Tick-rate arithmetic and static task lists. Engine configurations live
//! next to their engines in `cadence-drivers`.

mod task;
mod tick;

pub use task::TaskConfig;
pub use tick::{ConfigError, TickConfig, TickDivider};
