//! Simulated output pin

use cpuint_hal::OutputPin;

/// Output pin that counts its level changes
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    high: bool,
    edges: u32,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level changes seen so far (repeated writes of the same level excluded)
    pub fn edges(&self) -> u32 {
        self.edges
    }

    fn drive(&mut self, high: bool) {
        if self.high != high {
            self.edges += 1;
        }
        self.high = high;
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
