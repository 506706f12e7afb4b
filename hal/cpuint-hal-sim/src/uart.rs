//! Simulated USART
//!
//! Receive side: a two-level FIFO in front of the data register. Reading the
//! data register pops the oldest byte, and the receive-complete flag stays
//! set while anything is left. A byte arriving on a full FIFO is dropped
//! and counted as an overrun.
//!
//! Transmit side: a one-byte data register in front of a shift register.
//! A byte written while the shifter is idle moves straight in, leaving the
//! data register empty again. Shifting a frame takes
//! [`UartConfig::ticks_per_frame`] units; the byte shows up in
//! [`SimSerial::wire`] once its stop bit is out.

use std::collections::VecDeque;

use cpuint_hal::{SerialPort, UartConfig};

/// Depth of the receive FIFO
pub const RX_FIFO_DEPTH: usize = 2;

/// Peripheral clock of the reference board, one tick per time unit
pub const DEFAULT_CLOCK_HZ: u32 = 4_000_000;

#[derive(Debug, Clone)]
pub struct SimSerial {
    clock_hz: u32,
    config: Option<UartConfig>,
    frame_ticks: u32,
    rx_fifo: VecDeque<u8>,
    last_read: u8,
    overruns: u32,
    holding: Option<u8>,
    /// Byte being shifted out and ticks left
    shifting: Option<(u8, u32)>,
    wire: Vec<u8>,
}

impl Default for SimSerial {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_HZ)
    }
}

impl SimSerial {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            config: None,
            frame_ticks: 0,
            rx_fifo: VecDeque::with_capacity(RX_FIFO_DEPTH),
            last_read: 0,
            overruns: 0,
            holding: None,
            shifting: None,
            wire: Vec::new(),
        }
    }

    /// A byte arrives from the line
    ///
    /// Ignored until the port is configured.
    pub fn receive(&mut self, byte: u8) {
        if self.config.is_none() {
            return;
        }
        if self.rx_fifo.len() >= RX_FIFO_DEPTH {
            self.overruns += 1;
            return;
        }
        self.rx_fifo.push_back(byte);
    }

    /// Advance the transmitter by one tick
    pub fn tick(&mut self) {
        if let Some((byte, left)) = self.shifting.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                self.wire.push(*byte);
                self.shifting = None;
            }
        }

        if self.shifting.is_none() {
            if let Some(byte) = self.holding.take() {
                self.start_shift(byte);
            }
        }
    }

    fn start_shift(&mut self, byte: u8) {
        if self.frame_ticks == 0 {
            self.wire.push(byte);
        } else {
            self.shifting = Some((byte, self.frame_ticks));
        }
    }

    /// Active configuration
    pub fn config(&self) -> Option<UartConfig> {
        self.config
    }

    /// Ticks to shift out one frame at the configured rate
    pub fn frame_ticks(&self) -> u32 {
        self.frame_ticks
    }

    /// Bytes fully transmitted, in order
    pub fn wire(&self) -> &[u8] {
        &self.wire
    }

    /// Bytes dropped because the receive FIFO was full
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Transmitter completely idle
    pub fn is_tx_idle(&self) -> bool {
        self.holding.is_none() && self.shifting.is_none()
    }
}

impl SerialPort for SimSerial {
    fn configure(&mut self, config: UartConfig) {
        self.frame_ticks = config.ticks_per_frame(self.clock_hz);
        self.config = Some(config);
    }

    fn is_rx_pending(&self) -> bool {
        !self.rx_fifo.is_empty()
    }

    fn read_data(&mut self) -> u8 {
        if let Some(byte) = self.rx_fifo.pop_front() {
            self.last_read = byte;
        }
        self.last_read
    }

    fn is_tx_ready(&self) -> bool {
        self.holding.is_none()
    }

    fn write_data(&mut self, byte: u8) {
        if self.shifting.is_none() {
            self.start_shift(byte);
        } else {
            self.holding = Some(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SimSerial {
        let mut serial = SimSerial::default();
        serial.configure(UartConfig::default());
        serial
    }

    #[test]
    fn test_frame_time_at_reference_clock() {
        let serial = configured();
        // 10 bits at 115200 baud from a 4 MHz clock
        assert_eq!(serial.frame_ticks(), 348);
    }

    #[test]
    fn test_read_clears_flag_when_drained() {
        let mut serial = configured();
        serial.receive(0x41);
        serial.receive(0x42);
        assert!(serial.is_rx_pending());

        assert_eq!(serial.read_data(), 0x41);
        assert!(serial.is_rx_pending());
        assert_eq!(serial.read_data(), 0x42);
        assert!(!serial.is_rx_pending());

        // Empty register keeps its last value
        assert_eq!(serial.read_data(), 0x42);
    }

    #[test]
    fn test_overrun_drops_third_byte() {
        let mut serial = configured();
        serial.receive(1);
        serial.receive(2);
        serial.receive(3);
        assert_eq!(serial.overruns(), 1);
        assert_eq!(serial.read_data(), 1);
        assert_eq!(serial.read_data(), 2);
        assert!(!serial.is_rx_pending());
    }

    #[test]
    fn test_unconfigured_port_ignores_line() {
        let mut serial = SimSerial::default();
        serial.receive(0x41);
        assert!(!serial.is_rx_pending());
    }

    #[test]
    fn test_transmit_timing() {
        let mut serial = configured();
        let frame = serial.frame_ticks();

        serial.write_data(0x41);
        // Moved to the shifter, data register free again
        assert!(serial.is_tx_ready());

        serial.write_data(0x42);
        assert!(!serial.is_tx_ready());

        for _ in 0..frame {
            serial.tick();
        }
        assert_eq!(serial.wire(), &[0x41]);
        assert!(serial.is_tx_ready());

        for _ in 0..frame {
            serial.tick();
        }
        assert_eq!(serial.wire(), &[0x41, 0x42]);
        assert!(serial.is_tx_idle());
    }
}
