//! cpuint - interrupt priority demo firmware
//!
//! Runs the three-source priority demo on a Raspberry Pi Pico:
//! - Timer A switches the LED on and holds it for a full pulse
//! - Timer B switches it off and holds it the same way
//! - Bytes received on UART0 (GP0 TX, GP1 RX) are echoed back, preempting
//!   whichever pulse is in progress
//!
//! With round-robin enabled the LED blinks with a period of two pulses.
//! Timing and priority wiring come from timing.toml.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cpuint_core::{Cpu, SharedOutputState, VectorTable};
use cpuint_hal_rp2040::{uart_config, LedPin, PicoBoard, UartPort};

mod config;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("cpuint demo starting...");

    let p = embassy_rp::init(Default::default());

    let timing = config::timing();
    let policy = config::policy();
    info!(
        "Timing: A top={}, B top={}, pulse={} units of {}us",
        timing.timer_a_top,
        timing.timer_b_top,
        timing.pulse_units,
        config::UNIT_US
    );
    info!("Policy: {}", policy);

    // UART0 on GP0/GP1
    let uart_cfg = match uart_config(&timing.uart) {
        Some(cfg) => cfg,
        None => {
            warn!("Frame format not supported by UART0, using 115200 8N1");
            Default::default()
        }
    };
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_cfg);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    let board = PicoBoard::new(UartPort::new(tx, rx), config::UNIT_US);

    // On-board LED (GP25)
    let led = LedPin::new(Output::new(p.PIN_25, Level::Low));
    let output = SharedOutputState::new(led, config::LED_ACTIVE_LOW);

    let mut cpu = match Cpu::new(board, output, policy, timing, VectorTable::reference()) {
        Ok(cpu) => cpu,
        Err(e) => {
            error!("Invalid timing configuration: {}", e);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    info!("Interrupts enabled, entering idle loop");
    cpu.idle()
}
