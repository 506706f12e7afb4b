//! Runtime arbitration
//!
//! Decides which pending source the CPU takes next, given the level of the
//! handler it is currently executing (if any).
//!
//! Rules:
//! 1. A source may only start if its level is strictly above the running
//!    handler's level. The main program sits below every level.
//! 2. The highest eligible level wins.
//! 3. Inside the normal level, search order is the vector order. With
//!    round-robin enabled the search starts just after the last
//!    acknowledged normal vector, so the most recently serviced source is
//!    always tried last.
//!
//! Rule 1 alone gives the two structural guarantees the demo relies on: two
//! normal-level handlers never overlap, and no handler re-enters itself.

use crate::source::{PriorityLevel, SourceId};

use super::policy::PriorityPolicy;

/// Set of sources with their pending flag raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingSet(u8);

impl PendingSet {
    /// No flag raised
    pub const EMPTY: Self = Self(0);

    /// Raise a source's flag
    pub fn insert(&mut self, source: SourceId) {
        self.0 |= 1 << source.index();
    }

    /// Clear a source's flag
    pub fn remove(&mut self, source: SourceId) {
        self.0 &= !(1 << source.index());
    }

    /// Check a source's flag
    pub fn contains(&self, source: SourceId) -> bool {
        self.0 & (1 << source.index()) != 0
    }

    /// No flag raised
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pending sources in vector order
    pub fn iter(&self) -> impl Iterator<Item = SourceId> + '_ {
        SourceId::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<SourceId> for PendingSet {
    fn from_iter<I: IntoIterator<Item = SourceId>>(iter: I) -> Self {
        let mut set = PendingSet::EMPTY;
        for source in iter {
            set.insert(source);
        }
        set
    }
}

/// Priority arbiter
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Arbiter {
    policy: PriorityPolicy,
    /// Last acknowledged normal-level vector (LVL0PRI)
    last_normal: Option<SourceId>,
}

impl Arbiter {
    /// Create an arbiter for a fixed policy
    pub fn new(policy: PriorityPolicy) -> Self {
        Self {
            policy,
            last_normal: None,
        }
    }

    /// The policy being enforced
    pub fn policy(&self) -> &PriorityPolicy {
        &self.policy
    }

    /// Last acknowledged normal-level source (round-robin pointer)
    pub fn last_normal(&self) -> Option<SourceId> {
        self.last_normal
    }

    /// Pick the next source to service
    ///
    /// `running` is the level of the innermost handler in progress, or
    /// `None` when the main program is executing.
    pub fn select(&self, pending: PendingSet, running: Option<PriorityLevel>) -> Option<SourceId> {
        let mut best: Option<(PriorityLevel, SourceId)> = None;

        for source in self.search_order() {
            if !pending.contains(source) {
                continue;
            }

            let level = self.policy.level(source);
            if running.is_some_and(|r| level <= r) {
                continue;
            }

            // First hit at a level keeps it; only a strictly higher level replaces
            if best.map_or(true, |(l, _)| level > l) {
                best = Some((level, source));
            }
        }

        best.map(|(_, source)| source)
    }

    /// Record that the CPU has taken a source
    ///
    /// Moves the round-robin pointer when a normal-level source is taken and
    /// round-robin is enabled.
    pub fn acknowledge(&mut self, source: SourceId) {
        if self.policy.round_robin() && self.policy.level(source) == PriorityLevel::Normal {
            self.last_normal = Some(source);
        }
    }

    /// Vector search order for the normal level
    fn search_order(&self) -> [SourceId; SourceId::COUNT] {
        let start = match (self.policy.round_robin(), self.last_normal) {
            (true, Some(last)) => last.index() + 1,
            _ => 0,
        };

        let mut order = SourceId::ALL;
        for (i, slot) in order.iter_mut().enumerate() {
            *slot = SourceId::ALL[(start + i) % SourceId::COUNT];
        }
        order
    }
}
