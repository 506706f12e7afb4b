//! Interrupt priority controller
//!
//! Split the way the hardware splits it: a [`PriorityPolicy`] that is written
//! once during initialization, and an [`Arbiter`] that applies it to the set
//! of pending flags every time the CPU could take an interrupt.

pub mod arbiter;
pub mod policy;

pub use arbiter::{Arbiter, PendingSet};
pub use policy::PriorityPolicy;
