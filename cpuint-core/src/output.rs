//! Shared output state
//!
//! The one piece of mutable state touched by more than one handler. Timer A
//! switches it active, timer B switches it inactive. There is no lock: both
//! writers run at the normal level, and the arbiter never lets two
//! normal-level handlers overlap.

use cpuint_hal::{Level, OutputPin};

/// Binary actuator state, mapped 1:1 onto an output pin
pub struct SharedOutputState<P> {
    pin: P,
    /// If true, active = pin LOW
    active_low: bool,
}

impl<P: OutputPin> SharedOutputState<P> {
    /// Wrap a pin and drive it to the inactive level
    ///
    /// # Arguments
    /// - `pin`: The actuator pin
    /// - `active_low`: If true, the actuator is active when the pin is LOW
    ///   (LED wired between the pin and the supply)
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut output = Self { pin, active_low };
        output.set_active(false);
        output
    }

    /// Actuator active when the pin is high
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Actuator active when the pin is low
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Switch the actuator
    pub fn set_active(&mut self, active: bool) {
        self.pin.set_level(Level::from(active != self.active_low));
    }

    /// Current actuator state, read back from the pin
    pub fn is_active(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }

    /// Check if the actuator is active when the pin is low
    pub fn is_active_low(&self) -> bool {
        self.active_low
    }

    /// The underlying pin, for external observers
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Release the pin
    pub fn into_pin(self) -> P {
        self.pin
    }
}
