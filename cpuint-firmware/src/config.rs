//! Build-time configuration
//!
//! Constants come from timing.toml, checked and converted by build.rs.

use cpuint_core::{PriorityLevel, PriorityPolicy, SourceId, TimingConfig};
use cpuint_hal::uart::{DataBits, Parity, StopBits};
use cpuint_hal::UartConfig;

include!(concat!(env!("OUT_DIR"), "/timing.rs"));

/// Timer periods, pulse length and frame format
pub fn timing() -> TimingConfig {
    TimingConfig {
        timer_a_top: TIMER_A_TOP,
        timer_b_top: TIMER_B_TOP,
        pulse_units: PULSE_UNITS,
        uart: UartConfig {
            baudrate: BAUDRATE,
            data_bits: DATA_BITS,
            parity: PARITY,
            stop_bits: STOP_BITS,
        },
    }
}

/// Priority wiring
pub fn policy() -> PriorityPolicy {
    let mut policy = PriorityPolicy::new();
    policy.set_round_robin(ROUND_ROBIN);
    if let Some(source) = ELEVATED {
        policy.assign(source, PriorityLevel::Elevated);
    }
    policy
}
