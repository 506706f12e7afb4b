//! Trace analysis
//!
//! Turns a flat list of trace records back into handler runs. Containment
//! is decided on record order, not timestamps: a handler entered on the
//! same unit as the one it interrupts is still nested inside it.

use cpuint_core::{SourceId, TraceEvent, TraceRecord};

/// One completed handler run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSpan {
    pub source: SourceId,
    /// Handler interrupted by this run, `None` if entered from main
    pub preempted: Option<SourceId>,
    /// Unit of entry
    pub enter: u64,
    /// Unit of return
    pub exit: u64,
    /// Nesting depth, 1 for a run entered from main
    pub depth: usize,
    enter_seq: usize,
    exit_seq: usize,
}

impl HandlerSpan {
    /// Units spent between entry and return, nested runs included
    pub fn duration(&self) -> u64 {
        self.exit - self.enter
    }

    /// Check if `other` ran entirely inside this run
    pub fn contains(&self, other: &HandlerSpan) -> bool {
        self.enter_seq < other.enter_seq && other.exit_seq < self.exit_seq
    }

    /// Check if the two runs were in progress at the same time
    pub fn overlaps(&self, other: &HandlerSpan) -> bool {
        self.enter_seq < other.exit_seq && other.enter_seq < self.exit_seq
    }
}

/// Completed handler runs, ordered by entry
pub fn handler_spans(trace: &[TraceRecord]) -> Vec<HandlerSpan> {
    let mut open: Vec<(SourceId, Option<SourceId>, u64, usize)> = Vec::new();
    let mut spans = Vec::new();

    for (seq, record) in trace.iter().enumerate() {
        match record.event {
            TraceEvent::Enter { source, preempted } => {
                open.push((source, preempted, record.at, seq));
            }
            TraceEvent::Exit { source } => {
                let Some((entered, preempted, enter, enter_seq)) = open.pop() else {
                    continue;
                };
                debug_assert_eq!(entered, source);
                spans.push(HandlerSpan {
                    source,
                    preempted,
                    enter,
                    exit: record.at,
                    depth: open.len() + 1,
                    enter_seq,
                    exit_seq: seq,
                });
            }
            _ => {}
        }
    }

    spans.sort_by_key(|span| span.enter_seq);
    spans
}

/// A write to the shared output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputWrite {
    pub at: u64,
    pub active: bool,
    /// Innermost handler in progress at the time
    pub by: Option<SourceId>,
}

/// Every output write with the handler that made it
pub fn output_writes(trace: &[TraceRecord]) -> Vec<OutputWrite> {
    let mut running: Vec<SourceId> = Vec::new();
    let mut writes = Vec::new();

    for record in trace {
        match record.event {
            TraceEvent::Enter { source, .. } => running.push(source),
            TraceEvent::Exit { .. } => {
                running.pop();
            }
            TraceEvent::Output { active } => writes.push(OutputWrite {
                at: record.at,
                active,
                by: running.last().copied(),
            }),
            _ => {}
        }
    }

    writes
}

/// Output writes that changed the state
pub fn output_transitions(trace: &[TraceRecord]) -> Vec<OutputWrite> {
    let mut state = None;
    output_writes(trace)
        .into_iter()
        .filter(|write| {
            let changed = state != Some(write.active);
            state = Some(write.active);
            changed
        })
        .collect()
}

/// Bytes written to the transmitter, in order
pub fn transmitted(trace: &[TraceRecord]) -> Vec<u8> {
    trace
        .iter()
        .filter_map(|record| match record.event {
            TraceEvent::Transmit { byte } => Some(byte),
            _ => None,
        })
        .collect()
}

/// Bytes read from the receiver, in order
pub fn received(trace: &[TraceRecord]) -> Vec<u8> {
    trace
        .iter()
        .filter_map(|record| match record.event {
            TraceEvent::Receive { byte } => Some(byte),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(at: u64, event: TraceEvent) -> TraceRecord {
        TraceRecord { at, event }
    }

    fn nested_trace() -> Vec<TraceRecord> {
        vec![
            record(
                5,
                TraceEvent::Enter {
                    source: SourceId::TimerA,
                    preempted: None,
                },
            ),
            record(5, TraceEvent::Output { active: true }),
            record(
                9,
                TraceEvent::Enter {
                    source: SourceId::Serial,
                    preempted: Some(SourceId::TimerA),
                },
            ),
            record(9, TraceEvent::Receive { byte: 0x41 }),
            record(9, TraceEvent::Transmit { byte: 0x41 }),
            record(
                9,
                TraceEvent::Exit {
                    source: SourceId::Serial,
                },
            ),
            record(
                20,
                TraceEvent::Exit {
                    source: SourceId::TimerA,
                },
            ),
            record(
                20,
                TraceEvent::Enter {
                    source: SourceId::TimerB,
                    preempted: None,
                },
            ),
            record(20, TraceEvent::Output { active: false }),
        ]
    }

    #[test]
    fn test_spans_follow_nesting() {
        let spans = handler_spans(&nested_trace());

        // TimerB never returned, so only two completed runs
        assert_eq!(spans.len(), 2);
        let (outer, inner) = (spans[0], spans[1]);
        assert_eq!(outer.source, SourceId::TimerA);
        assert_eq!(outer.duration(), 15);
        assert_eq!(inner.depth, 2);
        assert_eq!(inner.duration(), 0);
        assert!(outer.contains(&inner));
        assert!(outer.overlaps(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_output_writes_attributed() {
        let writes = output_writes(&nested_trace());
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].by, Some(SourceId::TimerA));
        assert!(writes[0].active);
        assert_eq!(writes[1].by, Some(SourceId::TimerB));
        assert!(!writes[1].active);
    }

    #[test]
    fn test_serial_bytes() {
        let trace = nested_trace();
        assert_eq!(received(&trace), vec![0x41]);
        assert_eq!(transmitted(&trace), vec![0x41]);
    }
}
