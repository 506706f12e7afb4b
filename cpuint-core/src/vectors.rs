//! Interrupt vector table

use crate::board::Board;
use crate::cpu::Cpu;
use crate::handlers;
use crate::source::SourceId;

/// Interrupt service routine
pub type Isr<B> = fn(&mut Cpu<B>);

/// Handler per event source, indexed by vector number
pub struct VectorTable<B: Board> {
    handlers: [Isr<B>; SourceId::COUNT],
}

impl<B: Board> VectorTable<B> {
    /// Reference wiring: A starts the pulse, B stops it, serial echoes
    pub fn reference() -> Self {
        Self {
            handlers: [
                handlers::pulse_start::<B> as Isr<B>,
                handlers::pulse_stop::<B>,
                handlers::echo::<B>,
            ],
        }
    }

    /// Install a handler, returning the one it replaces
    ///
    /// A handler must clear its source's pending flag (or read the data
    /// register for the serial source). Otherwise it is taken again as soon
    /// as it returns.
    pub fn bind(&mut self, source: SourceId, isr: Isr<B>) -> Isr<B> {
        core::mem::replace(&mut self.handlers[source.index()], isr)
    }

    /// Handler for a source
    pub fn handler(&self, source: SourceId) -> Isr<B> {
        self.handlers[source.index()]
    }
}

impl<B: Board> Default for VectorTable<B> {
    fn default() -> Self {
        Self::reference()
    }
}

impl<B: Board> Clone for VectorTable<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Board> Copy for VectorTable<B> {}
