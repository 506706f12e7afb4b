//! Test doubles for the peripherals

use heapless::{Deque, Vec};

use cpuint_hal::cpuint::VectorNumber;
use cpuint_hal::{LevelConfig, OutputPin, PeriodicTimer, SerialPort, UartConfig};

use crate::board::Board;
use crate::source::TimerChannel;
use crate::trace::TraceRecord;

pub struct MockPin {
    pub high: bool,
    pub writes: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            high: false,
            writes: 0,
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.writes += 1;
    }

    fn set_low(&mut self) {
        self.high = false;
        self.writes += 1;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[derive(Default)]
pub struct MockTimer {
    pub top: Option<u16>,
    count: u16,
    pub pending: bool,
    pub wraps: u32,
}

impl MockTimer {
    fn tick(&mut self) {
        let Some(top) = self.top else {
            return;
        };
        if self.count == top {
            self.count = 0;
            self.pending = true;
            self.wraps += 1;
        } else {
            self.count += 1;
        }
    }
}

impl PeriodicTimer for MockTimer {
    fn arm_periodic(&mut self, top: u16) {
        self.top = Some(top);
        self.count = 0;
    }

    fn is_pending(&self) -> bool {
        self.pending
    }

    fn clear_pending(&mut self) {
        self.pending = false;
    }
}

#[derive(Default)]
pub struct MockSerial {
    pub config: Option<UartConfig>,
    pub rx: Deque<u8, 4>,
    last: u8,
    pub tx: Vec<u8, 16>,
    /// Units until the transmit data register is empty again
    pub tx_busy: u32,
    /// Units one character occupies the transmitter
    pub frame_units: u32,
}

impl SerialPort for MockSerial {
    fn configure(&mut self, config: UartConfig) {
        self.config = Some(config);
    }

    fn is_rx_pending(&self) -> bool {
        !self.rx.is_empty()
    }

    fn read_data(&mut self) -> u8 {
        if let Some(byte) = self.rx.pop_front() {
            self.last = byte;
        }
        self.last
    }

    fn is_tx_ready(&self) -> bool {
        self.tx_busy == 0
    }

    fn write_data(&mut self, byte: u8) {
        let _ = self.tx.push(byte);
        self.tx_busy = self.frame_units;
    }
}

#[derive(Default)]
pub struct MockLevels {
    pub elevated: Option<VectorNumber>,
    pub nmi: Option<VectorNumber>,
    pub round_robin: bool,
    pub global: bool,
}

impl LevelConfig for MockLevels {
    fn set_elevated_slot(&mut self, vector: Option<VectorNumber>) {
        self.elevated = vector;
    }

    fn set_nmi_slot(&mut self, vector: Option<VectorNumber>) {
        self.nmi = vector;
    }

    fn set_round_robin(&mut self, enabled: bool) {
        self.round_robin = enabled;
    }

    fn enable_global(&mut self) {
        self.global = true;
    }

    fn disable_global(&mut self) {
        self.global = false;
    }
}

/// Board with scripted serial arrivals and a recorded trace
#[derive(Default)]
pub struct MockBoard {
    pub serial: MockSerial,
    pub timers: [MockTimer; 2],
    pub levels: MockLevels,
    pub now: u64,
    arrivals: Vec<(u64, u8), 8>,
    pub trace: Vec<TraceRecord, 256>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `byte` to the receiver at unit `at`
    pub fn schedule_rx(&mut self, at: u64, byte: u8) {
        let _ = self.arrivals.push((at, byte));
    }
}

impl Board for MockBoard {
    type Serial = MockSerial;
    type Timer = MockTimer;
    type Pin = MockPin;
    type Levels = MockLevels;

    fn serial(&mut self) -> &mut MockSerial {
        &mut self.serial
    }

    fn timer(&mut self, channel: TimerChannel) -> &mut MockTimer {
        &mut self.timers[channel.index()]
    }

    fn levels(&mut self) -> &mut MockLevels {
        &mut self.levels
    }

    fn elapse(&mut self) {
        self.now += 1;
        for timer in &mut self.timers {
            timer.tick();
        }
        self.serial.tx_busy = self.serial.tx_busy.saturating_sub(1);

        let now = self.now;
        for &(_, byte) in self.arrivals.iter().filter(|(at, _)| *at == now) {
            let _ = self.serial.rx.push_back(byte);
        }
    }

    fn trace(&mut self, record: TraceRecord) {
        let _ = self.trace.push(record);
    }
}
