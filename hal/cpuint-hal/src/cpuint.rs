//! Interrupt controller configuration registers
//!
//! The controller exposes one elevated-level vector slot, one non-maskable
//! slot, a round-robin enable for the normal level and the global interrupt
//! enable bit. Arbitration itself lives in `cpuint-core`; implementations
//! of this trait only mirror the chosen configuration onto hardware.

/// Vector number as found in the device's interrupt vector table
pub type VectorNumber = u8;

/// Interrupt level configuration
pub trait LevelConfig {
    /// Write the level 1 vector register (LVL1VEC)
    ///
    /// `None` leaves every vector at the normal level.
    fn set_elevated_slot(&mut self, vector: Option<VectorNumber>);

    /// Route a vector to the non-maskable level
    fn set_nmi_slot(&mut self, vector: Option<VectorNumber>);

    /// Enable or disable round-robin scheduling of normal-level vectors
    fn set_round_robin(&mut self, enabled: bool);

    /// Set the global interrupt enable bit (SEI)
    fn enable_global(&mut self);

    /// Clear the global interrupt enable bit (CLI)
    fn disable_global(&mut self);
}
