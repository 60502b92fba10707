//! CPU core trait.

use crate::Bus;

/// A pulse-driven CPU core.
///
/// One `tick()` models one clock pulse, not one instruction. The bus is
/// passed in rather than owned so other clocked components can share the
/// same memory between pulses.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// The error a pulse can report to the host.
    type Error;

    /// Advance the CPU by one clock pulse.
    fn tick<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the next pulse will fetch a new instruction.
    fn is_idle(&self) -> bool;

    /// Returns true if the CPU stopped on a fatal condition.
    fn is_halted(&self) -> bool;

    /// Return the CPU to its power-on state.
    fn reset(&mut self);
}
