//! Dispatch trace events
//!
//! Emitted by the CPU to the board's trace sink. The simulator records
//! them for analysis, the firmware prints them over RTT.

use crate::source::SourceId;

/// Something observable happened inside the dispatch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceEvent {
    /// A handler was entered
    Enter {
        source: SourceId,
        /// Handler that was interrupted, or `None` from the main program
        preempted: Option<SourceId>,
    },
    /// A handler returned
    Exit { source: SourceId },
    /// The shared output was written
    Output { active: bool },
    /// A byte was read from the receive data register
    Receive { byte: u8 },
    /// A byte was written to the transmit data register
    Transmit { byte: u8 },
}

impl TraceEvent {
    /// Check if this event delimits a handler body
    pub fn is_handler_boundary(&self) -> bool {
        matches!(self, TraceEvent::Enter { .. } | TraceEvent::Exit { .. })
    }
}

/// Trace event stamped with the elapsed time unit count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TraceRecord {
    pub at: u64,
    pub event: TraceEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_boundaries() {
        let enter = TraceEvent::Enter {
            source: SourceId::TimerA,
            preempted: None,
        };
        assert!(enter.is_handler_boundary());
        assert!(TraceEvent::Exit {
            source: SourceId::TimerA
        }
        .is_handler_boundary());
        assert!(!TraceEvent::Output { active: true }.is_handler_boundary());
        assert!(!TraceEvent::Transmit { byte: 0x41 }.is_handler_boundary());
    }
}
