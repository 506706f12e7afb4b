//! Static priority assignment

use cpuint_hal::LevelConfig;

use crate::source::{PriorityLevel, SourceId};

/// Static priority configuration
///
/// Mirrors the controller registers: one elevated vector slot, one
/// non-maskable slot, and a round-robin enable for everything left at the
/// normal level. The policy is built before the [`crate::cpu::Cpu`] starts
/// and handed over by value, so it cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PriorityPolicy {
    elevated: Option<SourceId>,
    non_maskable: Option<SourceId>,
    round_robin: bool,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityPolicy {
    /// Reset state: every source at the normal level, static priority
    pub const fn new() -> Self {
        Self {
            elevated: None,
            non_maskable: None,
            round_robin: false,
        }
    }

    /// Reference wiring: serial receive elevated, timers round-robin
    pub fn reference() -> Self {
        let mut policy = Self::new();
        policy.set_round_robin(true);
        policy.assign(SourceId::Serial, PriorityLevel::Elevated);
        policy
    }

    /// Assign a source to a priority level
    ///
    /// The elevated and non-maskable levels have a single slot each. Taking
    /// an occupied slot moves it: the previous holder falls back to the
    /// normal level and is returned.
    pub fn assign(&mut self, source: SourceId, level: PriorityLevel) -> Option<SourceId> {
        if self.elevated == Some(source) {
            self.elevated = None;
        }
        if self.non_maskable == Some(source) {
            self.non_maskable = None;
        }

        match level {
            PriorityLevel::Normal => None,
            PriorityLevel::Elevated => self.elevated.replace(source),
            PriorityLevel::NonMaskable => self.non_maskable.replace(source),
        }
    }

    /// Enable or disable round-robin among normal-level sources
    pub fn set_round_robin(&mut self, enabled: bool) {
        self.round_robin = enabled;
    }

    /// Level currently assigned to a source
    pub fn level(&self, source: SourceId) -> PriorityLevel {
        if self.non_maskable == Some(source) {
            PriorityLevel::NonMaskable
        } else if self.elevated == Some(source) {
            PriorityLevel::Elevated
        } else {
            PriorityLevel::Normal
        }
    }

    /// Source holding the elevated slot
    pub fn elevated(&self) -> Option<SourceId> {
        self.elevated
    }

    /// Source holding the non-maskable slot
    pub fn non_maskable(&self) -> Option<SourceId> {
        self.non_maskable
    }

    /// Round-robin enabled for the normal level
    pub fn round_robin(&self) -> bool {
        self.round_robin
    }

    /// Write this policy to the controller registers
    pub fn apply<L: LevelConfig>(&self, levels: &mut L) {
        levels.set_round_robin(self.round_robin);
        levels.set_elevated_slot(self.elevated.map(SourceId::vector));
        levels.set_nmi_slot(self.non_maskable.map(SourceId::vector));
    }
}
