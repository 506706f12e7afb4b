//! Host simulation of the cpuint demo board
//!
//! Implements the `cpuint-hal` traits with plain in-memory peripherals and
//! bundles them into a [`SimBoard`] for `cpuint-core`'s dispatch engine.
//! Time only moves when the CPU asks for it, so runs are deterministic and
//! every handler entry, return and output write ends up in the recorded
//! trace.
//!
//! ```
//! use cpuint_hal_sim::{analysis, reference_cpu, SimBoard};
//!
//! let mut board = SimBoard::new();
//! board.schedule_rx(500, b'A');
//!
//! let mut cpu = reference_cpu(board).unwrap();
//! cpu.run_for(5_000);
//!
//! assert_eq!(analysis::transmitted(cpu.board().records()), vec![b'A']);
//! ```

pub mod analysis;
pub mod board;
pub mod cpuint;
pub mod gpio;
pub mod timer;
pub mod uart;

pub use board::SimBoard;
pub use cpuint::{LevelWrite, SimLevels};
pub use gpio::SimPin;
pub use timer::SimTimer;
pub use uart::SimSerial;

use cpuint_core::{ConfigError, Cpu, PriorityPolicy, SharedOutputState, TimingConfig, VectorTable};

/// CPU over a simulated board with the given policy and timing
///
/// The output is wired active-low, like the reference LED.
pub fn build_cpu(
    board: SimBoard,
    policy: PriorityPolicy,
    timing: TimingConfig,
) -> Result<Cpu<SimBoard>, ConfigError> {
    let output = SharedOutputState::new_active_low(SimPin::new());
    Cpu::new(board, output, policy, timing, VectorTable::reference())
}

/// CPU over a simulated board with the reference policy and timing
pub fn reference_cpu(board: SimBoard) -> Result<Cpu<SimBoard>, ConfigError> {
    build_cpu(board, PriorityPolicy::reference(), TimingConfig::default())
}
