//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: Reclaims expired entries of the in-process cache

mod cleanup;

pub use cleanup::spawn_cleanup_task;
