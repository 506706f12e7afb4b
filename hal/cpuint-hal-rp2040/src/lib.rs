//! RP2040 port of the cpuint demo board
//!
//! The dispatch engine runs in software on core 0. This crate supplies the
//! peripherals it polls:
//! - Periodic timers derived from the embassy time driver
//! - UART0 through the buffered embassy driver, with a latched receive
//!   register in front of it
//! - The on-board LED
//! - A software copy of the interrupt level registers
//!
//! One time unit is a blocking delay of a build-time number of
//! microseconds, after which every peripheral is sampled.

#![no_std]

pub mod board;
pub mod gpio;
pub mod levels;
pub mod timer;
pub mod uart;

pub use board::PicoBoard;
pub use gpio::LedPin;
pub use levels::SoftLevels;
pub use timer::TickTimer;
pub use uart::{uart_config, UartPort};
