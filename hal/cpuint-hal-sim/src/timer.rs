//! Simulated periodic timer

use cpuint_hal::PeriodicTimer;

/// 16-bit counter in periodic mode, one count per time unit
#[derive(Debug, Clone, Default)]
pub struct SimTimer {
    top: Option<u16>,
    count: u16,
    pending: bool,
    wraps: u64,
}

impl SimTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter by one tick
    pub fn tick(&mut self) {
        let Some(top) = self.top else {
            return;
        };

        if self.count >= top {
            self.count = 0;
            self.pending = true;
            self.wraps += 1;
        } else {
            self.count += 1;
        }
    }

    /// TOP value, if armed
    pub fn top(&self) -> Option<u16> {
        self.top
    }

    /// Counter matches since arming, including ones lost to coalescing
    pub fn wraps(&self) -> u64 {
        self.wraps
    }
}

impl PeriodicTimer for SimTimer {
    fn arm_periodic(&mut self, top: u16) {
        self.top = Some(top);
        self.count = 0;
        self.pending = false;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }

    fn clear_pending(&mut self) {
        self.pending = false;
    }
}
