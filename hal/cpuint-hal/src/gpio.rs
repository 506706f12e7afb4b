//! GPIO output abstraction
//!
//! The demo drives a single actuator pin. Polarity (active-high or
//! active-low wiring) is handled one layer up, so implementations only deal
//! in electrical levels.

/// Electrical level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (OUTSET)
    fn set_high(&mut self);

    /// Drive the pin low (OUTCLR)
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Drive the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Current driven level
    fn level(&self) -> Level {
        Level::from(self.is_set_high())
    }
}
