//! Serial port abstraction
//!
//! Register-level view of a USART: a receive data register whose read
//! clears the receive-complete flag, and a transmit data register with a
//! "data register empty" status bit that callers poll before writing.

/// Serial port (USART) registers
///
/// None of these operations can fail. A transmitter that never becomes
/// ready is a condition to wait on, not an error.
pub trait SerialPort {
    /// Apply frame format and baud rate, enable RX and TX
    fn configure(&mut self, config: UartConfig);

    /// Receive-complete flag (RXCIF): at least one byte is waiting
    fn is_rx_pending(&self) -> bool;

    /// Read the receive data register
    ///
    /// Consumes the oldest received byte. When no further byte is buffered
    /// this clears the receive-complete flag. Reading with nothing pending
    /// returns the last value left in the register.
    fn read_data(&mut self) -> u8;

    /// Data register empty flag (DREIF): a write will be accepted
    fn is_tx_ready(&self) -> bool;

    /// Write the transmit data register
    ///
    /// Callers must only write when [`SerialPort::is_tx_ready`] is true.
    fn write_data(&mut self, byte: u8);
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Bits on the wire per character, start bit included
    pub const fn frame_bits(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Clock ticks needed to shift out one character, rounded up
    ///
    /// Returns 0 for a zero baud rate.
    pub const fn ticks_per_frame(&self, clock_hz: u32) -> u32 {
        if self.baudrate == 0 {
            return 0;
        }
        let bits = clock_hz as u64 * self.frame_bits() as u64;
        let baud = self.baudrate as u64;
        ((bits + baud - 1) / baud) as u32
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
