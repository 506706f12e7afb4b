//! Interrupt level registers
//!
//! The RP2040's NVIC has no single elevated slot or round-robin pool, so
//! arbitration stays in `cpuint-core`. This keeps the written configuration
//! for inspection over the debug probe.

#[cfg(feature = "defmt")]
use defmt::*;

use cpuint_hal::cpuint::VectorNumber;
use cpuint_hal::LevelConfig;

#[derive(Debug, Default)]
pub struct SoftLevels {
    elevated: Option<VectorNumber>,
    nmi: Option<VectorNumber>,
    round_robin: bool,
    global: bool,
}

impl SoftLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elevated(&self) -> Option<VectorNumber> {
        self.elevated
    }

    pub fn nmi(&self) -> Option<VectorNumber> {
        self.nmi
    }

    pub fn round_robin(&self) -> bool {
        self.round_robin
    }

    pub fn global_enabled(&self) -> bool {
        self.global
    }
}

impl LevelConfig for SoftLevels {
    fn set_elevated_slot(&mut self, vector: Option<VectorNumber>) {
        #[cfg(feature = "defmt")]
        debug!("LVL1VEC = {:?}", vector);
        self.elevated = vector;
    }

    fn set_nmi_slot(&mut self, vector: Option<VectorNumber>) {
        #[cfg(feature = "defmt")]
        debug!("NMI vector = {:?}", vector);
        self.nmi = vector;
    }

    fn set_round_robin(&mut self, enabled: bool) {
        #[cfg(feature = "defmt")]
        debug!("LVL0RR = {}", enabled);
        self.round_robin = enabled;
    }

    fn enable_global(&mut self) {
        self.global = true;
    }

    fn disable_global(&mut self) {
        self.global = false;
    }
}
