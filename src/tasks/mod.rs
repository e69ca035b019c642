//! Background Tasks Module
//!
//! Scheduled maintenance work that runs independently of request traffic.

mod sweep;

pub use sweep::spawn_sweep_task;
