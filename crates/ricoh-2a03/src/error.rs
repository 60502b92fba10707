//! Conditions a pulse reports to the host.

use std::fmt;

use emu_core::BusError;

/// Why a pulse could not complete.
///
/// All variants are fatal: the CPU halts and every later pulse reports
/// [`CpuError::Halted`] until [`reset`](crate::Ricoh2A03::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// Fetched an opcode with no documented instruction.
    UndefinedOpcode { opcode: u8, pc: u16 },
    /// A resolver or executor reached outside the host's memory image.
    Bus(BusError),
    /// The CPU stopped on an earlier error.
    Halted { pc: u16 },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedOpcode { opcode, pc } => {
                write!(f, "undefined opcode ${opcode:02X} at ${pc:04X}")
            }
            Self::Bus(err) => write!(f, "bus fault: {err}"),
            Self::Halted { pc } => write!(f, "CPU is halted at ${pc:04X}"),
        }
    }
}

impl std::error::Error for CpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bus(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BusError> for CpuError {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}
