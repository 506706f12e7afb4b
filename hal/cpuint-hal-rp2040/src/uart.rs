//! UART0 as a register-level serial port
//!
//! The buffered embassy driver fills its ring buffer from the UART
//! interrupt. [`UartPort::poll`] moves bytes from there into a two-deep
//! latch that plays the part of the receive FIFO, so the receive flag
//! behaves the way the dispatch engine expects: set while a byte is
//! latched, cleared by reading the last one.

#[cfg(feature = "defmt")]
use defmt::*;
use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embedded_io::{Read, ReadReady, Write};
use heapless::Deque;

use cpuint_hal::uart::{DataBits, Parity, StopBits};
use cpuint_hal::{SerialPort, UartConfig};

/// Depth of the receive latch
const RX_LATCH_DEPTH: usize = 2;

/// Driver configuration for a frame format
///
/// Returns `None` for formats the RP2040 UART cannot produce (nine data
/// bits).
pub fn uart_config(config: &UartConfig) -> Option<uart::Config> {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => return None,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    Some(cfg)
}

pub struct UartPort {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
    latch: Deque<u8, RX_LATCH_DEPTH>,
    last_read: u8,
}

impl UartPort {
    /// Wrap an already configured buffered UART
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx) -> Self {
        Self {
            tx,
            rx,
            latch: Deque::new(),
            last_read: 0,
        }
    }

    /// Move received bytes into the latch
    pub fn poll(&mut self) {
        while !self.latch.is_full() {
            match self.rx.read_ready() {
                Ok(true) => {}
                Ok(false) => return,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    warn!("UART RX error: {:?}", _e);
                    return;
                }
            }

            let mut byte = [0u8; 1];
            match self.rx.read(&mut byte) {
                Ok(1) => {
                    let _ = self.latch.push_back(byte[0]);
                }
                Ok(_) => return,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    warn!("UART RX error: {:?}", _e);
                    return;
                }
            }
        }

        // Latch full: a further byte is lost, as with a full receive FIFO
        if matches!(self.rx.read_ready(), Ok(true)) {
            let mut byte = [0u8; 1];
            if let Ok(1) = self.rx.read(&mut byte) {
                #[cfg(feature = "defmt")]
                warn!("RX latch overrun, dropped {=u8:#x}", byte[0]);
            }
        }
    }
}

impl SerialPort for UartPort {
    fn configure(&mut self, config: UartConfig) {
        // The driver is configured at construction; this only reports the
        // format the core expects.
        #[cfg(feature = "defmt")]
        info!(
            "UART0 {} baud, {} bits per frame",
            config.baudrate,
            config.frame_bits()
        );
        #[cfg(not(feature = "defmt"))]
        let _ = config;
        self.latch.clear();
    }

    fn is_rx_pending(&self) -> bool {
        !self.latch.is_empty()
    }

    fn read_data(&mut self) -> u8 {
        if let Some(byte) = self.latch.pop_front() {
            self.last_read = byte;
        }
        self.last_read
    }

    fn is_tx_ready(&self) -> bool {
        // The driver queues into its ring buffer and blocks when full
        true
    }

    fn write_data(&mut self, byte: u8) {
        if let Err(_e) = self.tx.write_all(&[byte]) {
            #[cfg(feature = "defmt")]
            warn!("UART TX error: {:?}", _e);
        }
    }
}
