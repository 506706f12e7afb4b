//! Periodic timer abstraction
//!
//! Models a 16-bit counter in periodic interrupt mode: it counts from 0 up
//! to a TOP value, sets its capture flag on the match and restarts. The flag
//! is a single latched bit, so several matches before the flag is cleared
//! are indistinguishable from one.

/// Periodic timer with a latched interrupt flag
pub trait PeriodicTimer {
    /// Load TOP, enable the capture interrupt and start counting
    fn arm_periodic(&mut self, top: u16);

    /// Capture flag (CAPT) is set
    fn is_pending(&self) -> bool;

    /// Clear the capture flag
    fn clear_pending(&mut self);
}

/// Number of counter ticks between two flag assertions for a given TOP
///
/// The counter visits every value from 0 to TOP inclusive.
pub const fn period_ticks(top: u16) -> u32 {
    top as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_ticks() {
        assert_eq!(period_ticks(0), 1);
        assert_eq!(period_ticks(10), 11);
        assert_eq!(period_ticks(20), 21);
        assert_eq!(period_ticks(u16::MAX), 65536);
    }
}
