//! Board abstraction
//!
//! Bundles the peripherals the model needs and the notion of time passing.

use cpuint_hal::{LevelConfig, OutputPin, PeriodicTimer, SerialPort};

use crate::source::TimerChannel;
use crate::trace::TraceRecord;

/// A board running the demo
///
/// The actuator pin is not owned by the board: it is handed to the
/// [`crate::output::SharedOutputState`] so that the timer handlers are the
/// only writers.
pub trait Board {
    type Serial: SerialPort;
    type Timer: PeriodicTimer;
    type Pin: OutputPin;
    type Levels: LevelConfig;

    /// Serial port
    fn serial(&mut self) -> &mut Self::Serial;

    /// One of the two periodic timers
    fn timer(&mut self, channel: TimerChannel) -> &mut Self::Timer;

    /// Interrupt level configuration registers
    fn levels(&mut self) -> &mut Self::Levels;

    /// Let one time unit pass
    ///
    /// Peripherals advance and latch their flags. Must not block on
    /// anything but the passage of time.
    fn elapse(&mut self);

    /// Trace sink, no-op by default
    fn trace(&mut self, _record: TraceRecord) {}
}
