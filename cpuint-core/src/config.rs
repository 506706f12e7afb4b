//! Timing configuration
//!
//! All durations are in time units of the board clock. On the simulator a
//! unit is one timer counter tick; on the RP2040 port the unit length is a
//! build-time setting.

use cpuint_hal::UartConfig;

use crate::source::TimerChannel;

/// Reference TOP for timer A
pub const TIMER_A_TOP: u16 = 10;

/// Reference TOP for timer B
pub const TIMER_B_TOP: u16 = 20;

/// Reference busy-wait length of the pulse handlers
pub const PULSE_UNITS: u32 = 1000;

/// Configuration errors, caught before the CPU starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timer TOP of zero would raise the flag on every tick
    ZeroTop(TimerChannel),
    /// Serial port baud rate of zero
    ZeroBaudrate,
}

/// Timer periods, pulse length and serial settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Counter TOP for timer A (period = top + 1 units)
    pub timer_a_top: u16,
    /// Counter TOP for timer B (period = top + 1 units)
    pub timer_b_top: u16,
    /// Busy-wait length inside the pulse handlers
    pub pulse_units: u32,
    /// Serial port frame format
    pub uart: UartConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timer_a_top: TIMER_A_TOP,
            timer_b_top: TIMER_B_TOP,
            pulse_units: PULSE_UNITS,
            uart: UartConfig::default(),
        }
    }
}

impl TimingConfig {
    /// Counter TOP for a timer
    pub fn top(&self, channel: TimerChannel) -> u16 {
        match channel {
            TimerChannel::A => self.timer_a_top,
            TimerChannel::B => self.timer_b_top,
        }
    }

    /// Check the configuration
    ///
    /// A zero-length pulse is allowed: the handlers then return right
    /// after writing the output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_a_top == 0 {
            return Err(ConfigError::ZeroTop(TimerChannel::A));
        }
        if self.timer_b_top == 0 {
            return Err(ConfigError::ZeroTop(TimerChannel::B));
        }
        if self.uart.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }
        Ok(())
    }
}
