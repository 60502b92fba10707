//! Core traits and types for pulse-stepped emulation.
//!
//! A CPU advances one clock pulse per `tick()`. Memory is owned by the host
//! and reached only through the [`Bus`] trait, so the same core can run
//! against a bare byte array or a full memory-mapped system.

mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, BusError, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
