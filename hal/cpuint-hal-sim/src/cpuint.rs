//! Simulated interrupt controller registers

use cpuint_hal::cpuint::VectorNumber;
use cpuint_hal::LevelConfig;

/// Register writes, for inspection by tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelWrite {
    ElevatedSlot(Option<VectorNumber>),
    NmiSlot(Option<VectorNumber>),
    RoundRobin(bool),
    GlobalEnable(bool),
}

/// Controller configuration as last written
#[derive(Debug, Clone, Default)]
pub struct SimLevels {
    elevated: Option<VectorNumber>,
    nmi: Option<VectorNumber>,
    round_robin: bool,
    global: bool,
    writes: Vec<LevelWrite>,
}

impl SimLevels {
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

    /// Every register write in order
    pub fn writes(&self) -> &[LevelWrite] {
        &self.writes
    }
}

impl LevelConfig for SimLevels {
    fn set_elevated_slot(&mut self, vector: Option<VectorNumber>) {
        self.elevated = vector;
        self.writes.push(LevelWrite::ElevatedSlot(vector));
    }

    fn set_nmi_slot(&mut self, vector: Option<VectorNumber>) {
        self.nmi = vector;
        self.writes.push(LevelWrite::NmiSlot(vector));
    }

    fn set_round_robin(&mut self, enabled: bool) {
        self.round_robin = enabled;
        self.writes.push(LevelWrite::RoundRobin(enabled));
    }

    fn enable_global(&mut self) {
        self.global = true;
        self.writes.push(LevelWrite::GlobalEnable(true));
    }

    fn disable_global(&mut self) {
        self.global = false;
        self.writes.push(LevelWrite::GlobalEnable(false));
    }
}
