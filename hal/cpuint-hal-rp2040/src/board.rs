//! Pico board

#[cfg(feature = "defmt")]
use defmt::*;
use embassy_time::{Delay, Duration, Instant};
use embedded_hal::delay::DelayNs;

use cpuint_core::{Board, TimerChannel, TraceRecord};

use crate::gpio::LedPin;
use crate::levels::SoftLevels;
use crate::timer::TickTimer;
use crate::uart::UartPort;

pub struct PicoBoard {
    serial: UartPort,
    timers: [TickTimer; 2],
    levels: SoftLevels,
    unit_us: u32,
    delay: Delay,
}

impl PicoBoard {
    /// Board with a time unit of `unit_us` microseconds
    pub fn new(serial: UartPort, unit_us: u32) -> Self {
        let unit = Duration::from_micros(unit_us as u64);
        Self {
            serial,
            timers: [TickTimer::new(unit), TickTimer::new(unit)],
            levels: SoftLevels::new(),
            unit_us,
            delay: Delay,
        }
    }
}

impl Board for PicoBoard {
    type Serial = UartPort;
    type Timer = TickTimer;
    type Pin = LedPin;
    type Levels = SoftLevels;

    fn serial(&mut self) -> &mut UartPort {
        &mut self.serial
    }

    fn timer(&mut self, channel: TimerChannel) -> &mut TickTimer {
        &mut self.timers[channel.index()]
    }

    fn levels(&mut self) -> &mut SoftLevels {
        &mut self.levels
    }

    fn elapse(&mut self) {
        self.delay.delay_us(self.unit_us);

        let now = Instant::now();
        for timer in &mut self.timers {
            timer.poll(now);
        }
        self.serial.poll();
    }

    fn trace(&mut self, _record: TraceRecord) {
        #[cfg(feature = "defmt")]
        trace!("{}", _record);
    }
}
