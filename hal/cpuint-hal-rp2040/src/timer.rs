//! Periodic timers on top of the embassy time driver

use embassy_time::{Duration, Instant};

use cpuint_hal::timer::period_ticks;
use cpuint_hal::PeriodicTimer;

/// Periodic timer counting in board time units
///
/// The flag is raised when the wall clock passes the next match time.
/// Matches passed while the flag is still set are absorbed by it.
pub struct TickTimer {
    unit: Duration,
    period: Option<Duration>,
    next: Instant,
    pending: bool,
}

impl TickTimer {
    pub fn new(unit: Duration) -> Self {
        Self {
            unit,
            period: None,
            next: Instant::MAX,
            pending: false,
        }
    }

    /// Latch the flag for every match time passed
    pub fn poll(&mut self, now: Instant) {
        let Some(period) = self.period else {
            return;
        };

        while now >= self.next {
            self.pending = true;
            self.next += period;
        }
    }
}

impl PeriodicTimer for TickTimer {
    fn arm_periodic(&mut self, top: u16) {
        let period = self.unit * period_ticks(top);
        self.period = Some(period);
        self.next = Instant::now() + period;
        self.pending = false;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }

    fn clear_pending(&mut self) {
        self.pending = false;
    }
}
