//! cpuint Hardware Abstraction Layer
//!
//! Traits for the peripherals that feed the interrupt priority model. The
//! core crate only ever talks to hardware through these, so the same
//! dispatch logic runs against the host simulator and against a real board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cpuint-core (arbiter, handlers, cpu)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cpuint-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  cpuint-hal-  │       │  cpuint-hal-  │
//! │      sim      │       │    rp2040     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Actuator output
//! - [`uart::SerialPort`] - Register-level serial receive/transmit
//! - [`timer::PeriodicTimer`] - Periodic counter with a latched flag
//! - [`cpuint::LevelConfig`] - Interrupt level configuration registers

#![no_std]
#![deny(unsafe_code)]

pub mod cpuint;
pub mod gpio;
pub mod timer;
pub mod uart;

pub use cpuint::LevelConfig;
pub use gpio::{Level, OutputPin};
pub use timer::PeriodicTimer;
pub use uart::{SerialPort, UartConfig};
