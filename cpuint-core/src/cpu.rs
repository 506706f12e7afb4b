//! Dispatch engine
//!
//! A small model of a CPU core in front of an interrupt controller. There
//! is no separate scheduler thread: the code that is running (main program
//! or a handler) lets time pass through [`Cpu::cycle`], and every call is a
//! point where a pending source of a higher level gets dispatched. A
//! preempting handler runs to completion inside that call, so nesting is
//! simply the call stack.

use heapless::Vec;

use cpuint_hal::{LevelConfig, PeriodicTimer, SerialPort};

use crate::board::Board;
use crate::config::{ConfigError, TimingConfig};
use crate::controller::{Arbiter, PendingSet, PriorityPolicy};
use crate::output::SharedOutputState;
use crate::source::{PriorityLevel, SourceId, TimerChannel};
use crate::trace::{TraceEvent, TraceRecord};
use crate::vectors::VectorTable;

/// Deepest possible handler nesting, one handler per priority level
pub const MAX_NESTING: usize = 3;

/// Counters kept by the dispatch engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CpuStats {
    /// Time units elapsed since start
    pub elapsed: u64,
    /// Handler invocations per source, indexed by vector, wrapping
    pub serviced: [u32; SourceId::COUNT],
    /// Invocations that interrupted another handler
    pub preemptions: u32,
    /// Deepest handler nesting seen
    pub max_depth: u8,
}

impl CpuStats {
    /// Handler invocations for one source
    pub fn serviced(&self, source: SourceId) -> u32 {
        self.serviced[source.index()]
    }
}

/// CPU core with its interrupt controller
pub struct Cpu<B: Board> {
    board: B,
    output: SharedOutputState<B::Pin>,
    arbiter: Arbiter,
    timing: TimingConfig,
    vectors: VectorTable<B>,
    /// Handlers in progress, innermost last
    nesting: Vec<SourceId, MAX_NESTING>,
    interrupts_enabled: bool,
    /// Main program stops taking handlers once this unit has passed
    horizon: Option<u64>,
    stats: CpuStats,
}

impl<B: Board> Cpu<B> {
    /// Bring up peripherals and the interrupt controller
    ///
    /// Order: serial port, timer A, timer B, output, priority levels,
    /// global interrupt enable. Nothing is dispatched before the last step.
    pub fn new(
        mut board: B,
        mut output: SharedOutputState<B::Pin>,
        policy: PriorityPolicy,
        timing: TimingConfig,
        vectors: VectorTable<B>,
    ) -> Result<Self, ConfigError> {
        timing.validate()?;

        board.serial().configure(timing.uart);
        board.timer(TimerChannel::A).arm_periodic(timing.timer_a_top);
        board.timer(TimerChannel::B).arm_periodic(timing.timer_b_top);
        output.set_active(false);
        policy.apply(board.levels());

        let mut cpu = Self {
            board,
            output,
            arbiter: Arbiter::new(policy),
            timing,
            vectors,
            nesting: Vec::new(),
            interrupts_enabled: false,
            horizon: None,
            stats: CpuStats::default(),
        };
        cpu.enable_interrupts();

        Ok(cpu)
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn output(&self) -> &SharedOutputState<B::Pin> {
        &self.output
    }

    pub fn policy(&self) -> &PriorityPolicy {
        self.arbiter.policy()
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn stats(&self) -> &CpuStats {
        &self.stats
    }

    /// Time units elapsed since start
    pub fn now(&self) -> u64 {
        self.stats.elapsed
    }

    /// Innermost handler in progress, `None` in the main program
    pub fn running(&self) -> Option<SourceId> {
        self.nesting.last().copied()
    }

    /// Number of handlers in progress
    pub fn depth(&self) -> usize {
        self.nesting.len()
    }

    /// Global interrupt enable state
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// Output state as last written
    pub fn output_active(&self) -> bool {
        self.output.is_active()
    }

    /// Let one time unit pass, then dispatch whatever became eligible
    pub fn cycle(&mut self) {
        self.board.elapse();
        self.stats.elapsed += 1;
        self.arbitrate();
    }

    /// Busy-wait for a number of time units
    ///
    /// Higher-level sources keep getting dispatched during the wait.
    pub fn delay(&mut self, units: u32) {
        for _ in 0..units {
            self.cycle();
        }
    }

    /// Run the main program for a number of time units
    ///
    /// Sources pending up to the last unit are still taken. When handlers
    /// keep the main program starved, this returns at the first point it
    /// regains control after the deadline, so the clock may overshoot by up
    /// to one handler run.
    pub fn run_for(&mut self, units: u64) {
        let deadline = self.now() + units;
        let previous = self.horizon.replace(deadline);
        while self.now() < deadline {
            self.cycle();
        }
        self.horizon = previous;
    }

    /// Run until `done` holds, for at most `limit` time units
    ///
    /// The condition is checked from the main program, between handler
    /// runs. Returns whether it was met.
    pub fn run_until<F>(&mut self, limit: u64, mut done: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        let deadline = self.now() + limit;
        let previous = self.horizon.replace(deadline);
        while !done(self) && self.now() < deadline {
            self.cycle();
        }
        self.horizon = previous;
        done(self)
    }

    /// Main program idle loop, never returns
    pub fn idle(&mut self) -> ! {
        loop {
            self.cycle();
        }
    }

    /// Set the global interrupt enable
    pub fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
        self.board.levels().enable_global();
    }

    /// Clear the global interrupt enable
    ///
    /// Sources keep latching their flags. Only a non-maskable source is
    /// still dispatched.
    pub fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
        self.board.levels().disable_global();
    }

    /// Run `f` with maskable interrupts disabled
    ///
    /// Events raised meanwhile stay latched and are dispatched as soon as
    /// the previous enable state is restored.
    pub fn critical_section<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_enabled = self.interrupts_enabled;
        if was_enabled {
            self.disable_interrupts();
        }

        let result = f(self);

        if was_enabled {
            self.enable_interrupts();
            self.arbitrate();
        }
        result
    }

    /// Clear a timer's pending flag
    pub fn clear_pending(&mut self, channel: TimerChannel) {
        self.board.timer(channel).clear_pending();
    }

    /// Write the shared output
    pub fn set_output(&mut self, active: bool) {
        self.output.set_active(active);
        self.trace(TraceEvent::Output { active });
    }

    /// Read the receive data register
    pub fn receive_byte(&mut self) -> u8 {
        let byte = self.board.serial().read_data();
        self.trace(TraceEvent::Receive { byte });
        byte
    }

    /// Wait for the transmit data register to empty, then write `byte`
    pub fn send_byte(&mut self, byte: u8) {
        while !self.board.serial().is_tx_ready() {
            self.cycle();
        }
        self.board.serial().write_data(byte);
        self.trace(TraceEvent::Transmit { byte });
    }

    /// Sample every source's pending flag
    pub fn pending(&mut self) -> PendingSet {
        let mut pending = PendingSet::EMPTY;
        for channel in [TimerChannel::A, TimerChannel::B] {
            if self.board.timer(channel).is_pending() {
                pending.insert(channel.source());
            }
        }
        if self.board.serial().is_rx_pending() {
            pending.insert(SourceId::Serial);
        }
        pending
    }

    /// Dispatch until nothing eligible is pending
    fn arbitrate(&mut self) {
        loop {
            if self.nesting.is_empty() && self.horizon.is_some_and(|h| self.now() > h) {
                break;
            }

            let mut pending = self.pending();
            if !self.interrupts_enabled {
                for source in SourceId::ALL {
                    if self.policy().level(source) != PriorityLevel::NonMaskable {
                        pending.remove(source);
                    }
                }
            }

            let running = self.running().map(|s| self.policy().level(s));
            match self.arbiter.select(pending, running) {
                Some(source) => self.service(source),
                None => break,
            }
        }
    }

    /// Run one handler to completion
    fn service(&mut self, source: SourceId) {
        let preempted = self.running();
        if preempted.is_some() {
            self.stats.preemptions = self.stats.preemptions.wrapping_add(1);
        }

        self.arbiter.acknowledge(source);
        // Each nested handler is strictly above the one it interrupts, so
        // the depth never exceeds the number of levels.
        let _ = self.nesting.push(source);
        self.stats.max_depth = self.stats.max_depth.max(self.nesting.len() as u8);
        let serviced = &mut self.stats.serviced[source.index()];
        *serviced = serviced.wrapping_add(1);
        self.trace(TraceEvent::Enter { source, preempted });

        let isr = self.vectors.handler(source);
        isr(self);

        self.nesting.pop();
        self.trace(TraceEvent::Exit { source });
    }

    fn trace(&mut self, event: TraceEvent) {
        let record = TraceRecord {
            at: self.stats.elapsed,
            event,
        };
        self.board.trace(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBoard, MockPin};

    fn timing(a: u16, b: u16, pulse: u32) -> TimingConfig {
        TimingConfig {
            timer_a_top: a,
            timer_b_top: b,
            pulse_units: pulse,
            ..Default::default()
        }
    }

    fn cpu_with(board: MockBoard, policy: PriorityPolicy, timing: TimingConfig) -> Cpu<MockBoard> {
        let output = SharedOutputState::new_active_high(MockPin::new());
        Cpu::new(board, output, policy, timing, VectorTable::reference()).unwrap()
    }

    fn enter_index(trace: &[TraceRecord], source: SourceId, nth: usize) -> usize {
        trace
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r.event, TraceEvent::Enter { source: s, .. } if s == source))
            .nth(nth)
            .map(|(i, _)| i)
            .unwrap()
    }

    fn exit_index(trace: &[TraceRecord], source: SourceId, nth: usize) -> usize {
        trace
            .iter()
            .enumerate()
            .filter(|(_, r)| r.event == TraceEvent::Exit { source })
            .nth(nth)
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_init_programs_peripherals() {
        let cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), TimingConfig::default());
        let board = cpu.board();

        assert_eq!(board.serial.config, Some(TimingConfig::default().uart));
        assert_eq!(board.timers[0].top, Some(10));
        assert_eq!(board.timers[1].top, Some(20));
        assert_eq!(board.levels.elevated, Some(SourceId::Serial.vector()));
        assert!(board.levels.round_robin);
        assert!(board.levels.global);
        assert!(cpu.interrupts_enabled());
        assert!(!cpu.output_active());
        assert!(!cpu.output().is_active_low());
        assert!(!cpu.output().pin().high);
        assert_eq!(cpu.running(), None);
        assert_eq!(cpu.depth(), 0);
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let output = SharedOutputState::new_active_high(MockPin::new());
        let result = Cpu::new(
            MockBoard::new(),
            output,
            PriorityPolicy::reference(),
            timing(0, 20, 10),
            VectorTable::reference(),
        );
        assert!(matches!(result, Err(ConfigError::ZeroTop(TimerChannel::A))));
    }

    #[test]
    fn test_timer_handler_holds_output() {
        // B never fires inside the horizon
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 60000, 20));

        // A wraps at unit 5 and the handler holds the output for 20 units
        cpu.run_for(5);
        assert!(cpu.output_active());
        assert_eq!(cpu.stats().serviced(SourceId::TimerA), 1);
        assert_eq!(cpu.now(), 25);

        let trace = &cpu.board().trace;
        let enter = enter_index(trace, SourceId::TimerA, 0);
        let exit = exit_index(trace, SourceId::TimerA, 0);
        assert_eq!(trace[exit].at - trace[enter].at, 20);
    }

    #[test]
    fn test_serial_preempts_pulse() {
        let mut board = MockBoard::new();
        board.schedule_rx(10, 0x41);
        let mut cpu = cpu_with(board, PriorityPolicy::reference(), timing(4, 60000, 50));

        cpu.run_for(5);

        let trace = &cpu.board().trace;
        let enter_a = enter_index(trace, SourceId::TimerA, 0);
        let exit_a = exit_index(trace, SourceId::TimerA, 0);
        let enter_rx = enter_index(trace, SourceId::Serial, 0);
        let exit_rx = exit_index(trace, SourceId::Serial, 0);

        assert!(enter_a < enter_rx && exit_rx < exit_a);
        assert_eq!(
            trace[enter_rx].event,
            TraceEvent::Enter {
                source: SourceId::Serial,
                preempted: Some(SourceId::TimerA)
            }
        );
        assert_eq!(trace[enter_rx].at, 10);
        assert_eq!(cpu.board().serial.tx.as_slice(), &[0x41]);
        assert_eq!(cpu.stats().preemptions, 1);
        assert_eq!(cpu.stats().max_depth, 2);
    }

    #[test]
    fn test_normal_sources_never_nest() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 6, 30));
        cpu.run_for(300);

        let mut depth = 0i32;
        for record in &cpu.board().trace {
            match record.event {
                TraceEvent::Enter { preempted, .. } => {
                    assert_eq!(preempted, None);
                    depth += 1;
                    assert_eq!(depth, 1);
                }
                TraceEvent::Exit { .. } => depth -= 1,
                _ => {}
            }
        }
        assert_eq!(cpu.stats().preemptions, 0);
        assert_eq!(cpu.stats().max_depth, 1);
    }

    #[test]
    fn test_round_robin_alternates_pulses() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 6, 30));
        cpu.run_for(300);

        let order: std::vec::Vec<SourceId> = cpu
            .board()
            .trace
            .iter()
            .filter_map(|r| match r.event {
                TraceEvent::Enter { source, .. } => Some(source),
                _ => None,
            })
            .collect();

        assert!(order.len() >= 4);
        for pair in order.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(cpu.arbiter().last_normal(), order.last().copied());
    }

    #[test]
    fn test_static_priority_starves_timer_b() {
        let mut policy = PriorityPolicy::reference();
        policy.set_round_robin(false);
        let mut cpu = cpu_with(MockBoard::new(), policy, timing(4, 6, 30));
        cpu.run_for(300);

        assert!(cpu.stats().serviced(SourceId::TimerA) > 5);
        assert_eq!(cpu.stats().serviced(SourceId::TimerB), 0);
        assert!(cpu.output_active());
    }

    #[test]
    fn test_elevated_repeat_latches_until_return() {
        let mut board = MockBoard::new();
        // Each echo waits 5 units for the transmitter
        board.serial.frame_units = 5;
        // Transmitter still busy when the first byte arrives
        board.serial.tx_busy = 5;
        board.schedule_rx(3, 0x10);
        board.schedule_rx(4, 0x20);
        let mut cpu = cpu_with(board, PriorityPolicy::reference(), timing(60000, 60000, 0));

        cpu.run_for(20);

        let trace = &cpu.board().trace;
        let exit_first = exit_index(trace, SourceId::Serial, 0);
        let enter_second = enter_index(trace, SourceId::Serial, 1);
        assert!(exit_first < enter_second);
        assert_eq!(cpu.board().serial.tx.as_slice(), &[0x10, 0x20]);
        assert_eq!(cpu.stats().max_depth, 1);
    }

    #[test]
    fn test_critical_section_defers_dispatch() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 60000, 0));

        cpu.critical_section(|cpu| {
            cpu.run_for(12);
            assert_eq!(cpu.stats().serviced(SourceId::TimerA), 0);
            assert!(!cpu.board().levels.global);
        });

        // Latched flag taken once on exit: wraps coalesced into one run
        assert_eq!(cpu.stats().serviced(SourceId::TimerA), 1);
        assert!(cpu.board().levels.global);
        assert_eq!(cpu.board().timers[0].wraps, 2);
    }

    #[test]
    fn test_non_maskable_ignores_global_disable() {
        let mut board = MockBoard::new();
        board.schedule_rx(2, 0x55);
        let mut policy = PriorityPolicy::reference();
        policy.assign(SourceId::Serial, PriorityLevel::NonMaskable);
        let mut cpu = cpu_with(board, policy, timing(60000, 60000, 0));

        cpu.critical_section(|cpu| cpu.run_for(5));
        assert_eq!(cpu.board().serial.tx.as_slice(), &[0x55]);
    }

    #[test]
    fn test_timer_flags_coalesce_during_pulse() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 60000, 100));

        // One run spanning 20 further wraps leaves a single flag behind
        cpu.run_for(5);
        assert_eq!(cpu.stats().serviced(SourceId::TimerA), 1);
        assert_eq!(cpu.now(), 105);
        assert_eq!(cpu.board().timers[0].wraps, 21);
        assert!(cpu.board().timers[0].pending);

        cpu.run_for(1);
        assert_eq!(cpu.stats().serviced(SourceId::TimerA), 2);
        assert_eq!(cpu.running(), None);
    }

    #[test]
    fn test_custom_vector_binding() {
        fn count_only(cpu: &mut Cpu<MockBoard>) {
            cpu.clear_pending(TimerChannel::B);
        }

        let mut vectors = VectorTable::reference();
        vectors.bind(SourceId::TimerB, count_only);
        let output = SharedOutputState::new_active_high(MockPin::new());
        let mut cpu = Cpu::new(
            MockBoard::new(),
            output,
            PriorityPolicy::reference(),
            timing(60000, 4, 0),
            vectors,
        )
        .unwrap();

        cpu.run_for(20);
        assert_eq!(cpu.stats().serviced(SourceId::TimerB), 4);
        assert!(!cpu
            .board()
            .trace
            .iter()
            .any(|r| matches!(r.event, TraceEvent::Output { .. })));
    }

    #[test]
    fn test_handler_sees_its_own_nesting() {
        fn echo_at_depth_one(cpu: &mut Cpu<MockBoard>) {
            assert_eq!(cpu.depth(), 1);
            assert_eq!(cpu.running(), Some(SourceId::Serial));
            let byte = cpu.receive_byte();
            cpu.send_byte(byte);
        }

        let mut vectors = VectorTable::reference();
        vectors.bind(SourceId::Serial, echo_at_depth_one);
        let output = SharedOutputState::new_active_high(MockPin::new());
        let mut cpu = Cpu::new(
            MockBoard::new(),
            output,
            PriorityPolicy::reference(),
            timing(60000, 60000, 0),
            vectors,
        )
        .unwrap();

        // Arrivals can still be scripted after bring-up
        cpu.board_mut().schedule_rx(3, 0x7e);
        cpu.run_for(5);

        assert_eq!(cpu.board().serial.tx.as_slice(), &[0x7e]);
        assert_eq!(cpu.stats().serviced(SourceId::Serial), 1);
        assert_eq!(cpu.depth(), 0);
    }

    #[test]
    fn test_service_counter_wraps() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(1, 60000, 0));
        cpu.stats.serviced[SourceId::TimerA.index()] = u32::MAX;

        // Period 2: A is taken at units 2 and 4
        cpu.run_for(4);
        assert_eq!(cpu.stats().serviced(SourceId::TimerA), 1);
    }

    #[test]
    fn test_preemption_counter_wraps() {
        let mut board = MockBoard::new();
        board.schedule_rx(10, 0x41);
        let mut cpu = cpu_with(board, PriorityPolicy::reference(), timing(4, 60000, 50));
        cpu.stats.preemptions = u32::MAX;

        cpu.run_for(5);
        assert_eq!(cpu.stats().preemptions, 0);
        assert_eq!(cpu.board().serial.tx.as_slice(), &[0x41]);
    }

    #[test]
    fn test_run_until_stops_on_condition() {
        let mut cpu = cpu_with(MockBoard::new(), PriorityPolicy::reference(), timing(4, 60000, 0));
        assert!(cpu.run_until(100, |cpu| cpu.output_active()));
        assert_eq!(cpu.now(), 5);
        assert!(!cpu.run_until(3, |cpu| cpu.stats().serviced(SourceId::Serial) > 0));
    }
}
