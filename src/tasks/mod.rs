//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Removes expired entries from every registered cache

mod cleanup;

pub use cleanup::spawn_cleanup_task;
