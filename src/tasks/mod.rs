//! Background Tasks Module
//!
//! Optional periodic work alongside the cache backends.
//!
//! # Tasks
//! - Expiry sweep: purges expired in-process entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
