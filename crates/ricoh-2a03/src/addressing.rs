//! Addressing-mode resolvers.
//!
//! Each resolver reads the operand bytes following the opcode at PC,
//! computes where the instruction operates, stores it in the effective
//! address register and reports whether indexing crossed a page.
//!
//! Wraparound rules:
//! - Zero Page,X/Y and the (zp,X) pointer wrap within page zero.
//! - The (zp),Y pointer's high byte is read from page zero as well.
//! - JMP ($xxFF) fetches its high byte from $xx00 (NMOS page quirk).
//! - Everything else wraps at 16 bits.

use std::fmt;

use emu_core::{Bus, BusError};

use crate::Ricoh2A03;
use crate::opcodes::AddressingMode;

/// Where the current instruction operates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    #[default]
    Implied,
    /// The A register.
    Accumulator,
    /// A memory location. For Immediate mode this is the operand byte.
    Address(u16),
}

impl Operand {
    #[must_use]
    pub const fn address(self) -> Option<u16> {
        match self {
            Self::Address(addr) => Some(addr),
            Self::Implied | Self::Accumulator => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implied => f.write_str("-"),
            Self::Accumulator => f.write_str("A"),
            Self::Address(addr) => write!(f, "${addr:04X}"),
        }
    }
}

/// True if `a` and `b` are on different 256-byte pages.
#[must_use]
pub(crate) const fn page_crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

/// Read a 16-bit word (little-endian).
pub(crate) fn read_word<B: Bus + ?Sized>(bus: &mut B, addr: u16) -> Result<u16, BusError> {
    let low = bus.read(addr)?;
    let high = bus.read(addr.wrapping_add(1))?;
    Ok(u16::from_le_bytes([low, high]))
}

/// Read a word whose high byte comes from the same page as the low byte.
fn read_word_in_page<B: Bus + ?Sized>(bus: &mut B, addr: u16) -> Result<u16, BusError> {
    let low = bus.read(addr)?;
    let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let high = bus.read(high_addr)?;
    Ok(u16::from_le_bytes([low, high]))
}

/// Read a pointer from page zero; the high byte wraps to $00.
fn read_zero_page_word<B: Bus + ?Sized>(bus: &mut B, ptr: u8) -> Result<u16, BusError> {
    let low = bus.read(u16::from(ptr))?;
    let high = bus.read(u16::from(ptr.wrapping_add(1)))?;
    Ok(u16::from_le_bytes([low, high]))
}

/// Add an index register, noting a carry out of the low byte.
fn indexed(base: u16, index: u8) -> (Operand, bool) {
    let addr = base.wrapping_add(u16::from(index));
    (Operand::Address(addr), page_crossed(base, addr))
}

impl Ricoh2A03 {
    /// Resolve the operand of the instruction at PC.
    ///
    /// Returns the extra cycle owed for a page crossing: 1 only when the
    /// mode indexes across a page and `page_penalty` is set, else 0.
    pub(crate) fn resolve<B: Bus + ?Sized>(
        &mut self,
        mode: AddressingMode,
        bus: &mut B,
        page_penalty: bool,
    ) -> Result<u8, BusError> {
        let pc = self.regs.pc;
        let operand = pc.wrapping_add(1);

        let (target, crossed) = match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => (Operand::Address(operand), false),
            AddressingMode::ZeroPage => {
                let zp = bus.read(operand)?;
                (Operand::Address(u16::from(zp)), false)
            }
            AddressingMode::ZeroPageX => {
                let zp = bus.read(operand)?.wrapping_add(self.regs.x);
                (Operand::Address(u16::from(zp)), false)
            }
            AddressingMode::ZeroPageY => {
                let zp = bus.read(operand)?.wrapping_add(self.regs.y);
                (Operand::Address(u16::from(zp)), false)
            }
            AddressingMode::Absolute => (Operand::Address(read_word(bus, operand)?), false),
            AddressingMode::AbsoluteX => indexed(read_word(bus, operand)?, self.regs.x),
            AddressingMode::AbsoluteY => indexed(read_word(bus, operand)?, self.regs.y),
            AddressingMode::Indirect => {
                let ptr = read_word(bus, operand)?;
                (Operand::Address(read_word_in_page(bus, ptr)?), false)
            }
            AddressingMode::IndirectX => {
                let ptr = bus.read(operand)?.wrapping_add(self.regs.x);
                (Operand::Address(read_zero_page_word(bus, ptr)?), false)
            }
            AddressingMode::IndirectY => {
                let ptr = bus.read(operand)?;
                indexed(read_zero_page_word(bus, ptr)?, self.regs.y)
            }
            AddressingMode::Relative => {
                // Offset counts from the instruction following the branch.
                let offset = bus.read(operand)? as i8;
                let next = pc.wrapping_add(2);
                (
                    Operand::Address(next.wrapping_add_signed(i16::from(offset))),
                    false,
                )
            }
        };

        self.effective_address = target;
        Ok(u8::from(page_penalty && crossed))
    }
}
