//! Simulated board
//!
//! One time unit is one tick of the peripheral clock. Per unit the board
//! advances both timers, the transmitter, and delivers any byte scheduled
//! for that unit to the receiver.

use std::collections::BTreeMap;

use cpuint_core::{Board, TimerChannel, TraceRecord};

use crate::cpuint::SimLevels;
use crate::gpio::SimPin;
use crate::timer::SimTimer;
use crate::uart::{SimSerial, DEFAULT_CLOCK_HZ};

#[derive(Debug, Clone)]
pub struct SimBoard {
    now: u64,
    timers: [SimTimer; 2],
    serial: SimSerial,
    levels: SimLevels,
    /// Bytes waiting on the line, keyed by arrival unit
    arrivals: BTreeMap<u64, Vec<u8>>,
    trace: Vec<TraceRecord>,
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBoard {
    /// Board clocked like the reference part (4 MHz)
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_CLOCK_HZ)
    }

    pub fn with_clock(clock_hz: u32) -> Self {
        Self {
            now: 0,
            timers: [SimTimer::new(), SimTimer::new()],
            serial: SimSerial::new(clock_hz),
            levels: SimLevels::new(),
            arrivals: BTreeMap::new(),
            trace: Vec::new(),
        }
    }

    /// Deliver `byte` to the receiver at unit `at`
    ///
    /// Units already past are delivered on the next tick.
    pub fn schedule_rx(&mut self, at: u64, byte: u8) {
        let at = at.max(self.now + 1);
        self.arrivals.entry(at).or_default().push(byte);
    }

    /// Units elapsed
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn timer_state(&self, channel: TimerChannel) -> &SimTimer {
        &self.timers[channel.index()]
    }

    pub fn serial_state(&self) -> &SimSerial {
        &self.serial
    }

    pub fn level_state(&self) -> &SimLevels {
        &self.levels
    }

    /// Recorded trace
    pub fn records(&self) -> &[TraceRecord] {
        &self.trace
    }

    /// Drop the recorded trace, e.g. after a warm-up phase
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Bytes still waiting to arrive
    pub fn arrivals_pending(&self) -> usize {
        self.arrivals.values().map(Vec::len).sum()
    }
}

impl Board for SimBoard {
    type Serial = SimSerial;
    type Timer = SimTimer;
    type Pin = SimPin;
    type Levels = SimLevels;

    fn serial(&mut self) -> &mut SimSerial {
        &mut self.serial
    }

    fn timer(&mut self, channel: TimerChannel) -> &mut SimTimer {
        &mut self.timers[channel.index()]
    }

    fn levels(&mut self) -> &mut SimLevels {
        &mut self.levels
    }

    fn elapse(&mut self) {
        self.now += 1;

        for timer in &mut self.timers {
            timer.tick();
        }
        self.serial.tick();

        if let Some(bytes) = self.arrivals.remove(&self.now) {
            for byte in bytes {
                self.serial.receive(byte);
            }
        }
    }

    fn trace(&mut self, record: TraceRecord) {
        self.trace.push(record);
    }
}
