//! Event sources and priority levels

use cpuint_hal::cpuint::VectorNumber;

/// Hardware event sources, in vector table order
///
/// The discriminant is the vector number. With round-robin disabled the
/// lowest vector number wins among normal-level sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceId {
    /// Short-period timer (TCB0 capture)
    TimerA = 0,
    /// Long-period timer (TCB1 capture)
    TimerB = 1,
    /// Serial receive complete (USART0 RXC)
    Serial = 2,
}

impl SourceId {
    /// Number of event sources
    pub const COUNT: usize = 3;

    /// All sources in vector order
    pub const ALL: [SourceId; Self::COUNT] = [SourceId::TimerA, SourceId::TimerB, SourceId::Serial];

    /// Vector number of this source
    pub const fn vector(self) -> VectorNumber {
        self as VectorNumber
    }

    /// Index into per-source tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a source by vector number
    pub const fn from_vector(vector: VectorNumber) -> Option<Self> {
        match vector {
            0 => Some(SourceId::TimerA),
            1 => Some(SourceId::TimerB),
            2 => Some(SourceId::Serial),
            _ => None,
        }
    }

    /// Timer channel behind this source, if it is a timer
    pub const fn timer(self) -> Option<TimerChannel> {
        match self {
            SourceId::TimerA => Some(TimerChannel::A),
            SourceId::TimerB => Some(TimerChannel::B),
            SourceId::Serial => None,
        }
    }
}

/// The two periodic timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerChannel {
    A,
    B,
}

impl TimerChannel {
    /// Event source raised by this timer
    pub const fn source(self) -> SourceId {
        match self {
            TimerChannel::A => SourceId::TimerA,
            TimerChannel::B => SourceId::TimerB,
        }
    }

    /// Index into per-timer tables
    pub const fn index(self) -> usize {
        match self {
            TimerChannel::A => 0,
            TimerChannel::B => 1,
        }
    }
}

/// Interrupt priority levels, lowest first
///
/// A handler can only be preempted by a source at a strictly higher level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PriorityLevel {
    /// Level 0: the default pool, optionally round-robin
    Normal,
    /// Level 1: single vector slot, preempts the normal pool
    Elevated,
    /// Non-maskable: single slot above everything else
    NonMaskable,
}
