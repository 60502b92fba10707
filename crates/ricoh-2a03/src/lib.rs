//! Pulse-stepped Ricoh 2A03 CPU core.
//!
//! The 2A03 is the NES's 6502 without decimal mode. Each `pulse()` models
//! one clock pulse: an idle CPU fetches, resolves and executes a whole
//! instruction on the first pulse, then counts down the instruction's
//! remaining cycles so it stays in step with other clocked hardware.
//!
//! ```
//! use emu_core::SimpleBus;
//! use ricoh_2a03::Ricoh2A03;
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0x0000, &[0xA9, 0x70, 0x0A]).unwrap(); // LDA #$70; ASL A
//!
//! let mut cpu = Ricoh2A03::new();
//! cpu.step(&mut bus).unwrap();
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.regs.a, 0xE0);
//! assert_eq!(cpu.regs.pc, 3);
//! ```

mod addressing;
mod config;
mod cpu;
mod dump;
mod error;
mod execute;
pub mod flags;
mod opcodes;
mod registers;

pub use addressing::Operand;
pub use config::{CpuConfig, Quirks, UndefinedOpcodePolicy};
pub use cpu::{Fetch, Ricoh2A03};
pub use dump::{StateDump, TraceLine};
pub use error::CpuError;
pub use flags::Status;
pub use opcodes::{AddressingMode, Instruction, Opcode, OpcodeTable};
pub use registers::Registers;
