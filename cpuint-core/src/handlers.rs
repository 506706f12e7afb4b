//! Interrupt handlers
//!
//! The three handlers of the demo. They are plain functions over the
//! [`Cpu`] context and get registered in a [`crate::vectors::VectorTable`].
//!
//! Both pulse handlers busy-wait far longer than either timer period. The
//! timer flags therefore get re-raised while the wait is still running, and
//! the two handlers end up running back to back, each holding the output in
//! its own state for the full pulse. Which one runs next is up to the
//! round-robin pointer. The order inside each handler matters: flag first,
//! then output, then the wait.

use crate::board::Board;
use crate::cpu::Cpu;
use crate::source::TimerChannel;

/// Serial receive: echo the byte back
///
/// Reading the data register consumes the event. The transmit wait spins
/// until the data register is empty; it never gives up.
pub fn echo<B: Board>(cpu: &mut Cpu<B>) {
    let byte = cpu.receive_byte();
    cpu.send_byte(byte);
}

/// Timer A: switch the output active and hold it
pub fn pulse_start<B: Board>(cpu: &mut Cpu<B>) {
    pulse(cpu, TimerChannel::A, true);
}

/// Timer B: switch the output inactive and hold it
pub fn pulse_stop<B: Board>(cpu: &mut Cpu<B>) {
    pulse(cpu, TimerChannel::B, false);
}

fn pulse<B: Board>(cpu: &mut Cpu<B>, channel: TimerChannel, active: bool) {
    // Cleared before the wait: wraps during the wait latch again and
    // collapse into a single further invocation.
    cpu.clear_pending(channel);
    cpu.set_output(active);

    let units = cpu.timing().pulse_units;
    cpu.delay(units);
}
