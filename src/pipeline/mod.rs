//! The order fulfillment pipeline: live collection, transitions, partitions
//! and per-stage aggregates. Synchronous and single-owner; the actor in
//! [`crate::actors`] is what confines it to one task.

pub mod aggregate;
pub mod clock;
pub mod controller;

pub use aggregate::*;
pub use clock::{Clock, SystemClock};
pub use controller::*;
