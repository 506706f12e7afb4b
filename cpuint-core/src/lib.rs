//! Board-agnostic interrupt priority model
//!
//! This crate contains the logic of the demo that does not depend on a
//! specific chip:
//!
//! - Event sources and priority levels
//! - Priority policy and the runtime arbiter (elevated slot, round-robin pool)
//! - The shared output state written by the timer handlers
//! - The three interrupt handlers
//! - The dispatch engine that nests handlers when a higher level preempts
//!
//! ```text
//!   main ──idle──► Cpu::cycle ──► Board::elapse ──► Arbiter::select
//!                      ▲                                  │
//!                      │                                  ▼
//!               Cpu::delay ◄─────── handler ◄──── VectorTable
//! ```
//!
//! Every time unit spent anywhere (idle loop or a handler's busy wait) goes
//! through [`cpu::Cpu::cycle`], which is where a pending higher-level source
//! gets to run. Nesting is the call stack, exactly like hardware interrupts.

#![no_std]
#![deny(unsafe_code)]

// proptest's assertion macros need std's format!
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod board;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod handlers;
pub mod output;
pub mod source;
pub mod trace;
pub mod vectors;

#[cfg(test)]
mod mock;

pub use board::Board;
pub use config::{ConfigError, TimingConfig};
pub use controller::{Arbiter, PendingSet, PriorityPolicy};
pub use cpu::{Cpu, CpuStats};
pub use output::SharedOutputState;
pub use source::{PriorityLevel, SourceId, TimerChannel};
pub use trace::{TraceEvent, TraceRecord};
pub use vectors::{Isr, VectorTable};
