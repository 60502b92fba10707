//! Diagnostic views of CPU state.
//!
//! Hosts build these from a `&Ricoh2A03` between pulses. Nothing here is
//! called from the fetch path.

use std::fmt;

use crate::Ricoh2A03;

/// Multi-line register dump.
///
/// ```text
/// A:$70 X:$00 Y:$00
/// PC:$0002 SP:$00
/// cycles remaining: 1
/// effective address: $0001
/// NV-BDIZC
/// 00000000
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StateDump<'a>(pub &'a Ricoh2A03);

impl fmt::Display for StateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpu = self.0;
        let regs = &cpu.regs;
        writeln!(f, "A:${:02X} X:${:02X} Y:${:02X}", regs.a, regs.x, regs.y)?;
        writeln!(f, "PC:${:04X} SP:${:02X}", regs.pc, regs.s)?;
        writeln!(f, "cycles remaining: {}", cpu.cycles_remaining())?;
        writeln!(f, "effective address: {}", cpu.effective_address())?;
        writeln!(f, "NV-BDIZC")?;
        write!(f, "{:08b}", regs.p.bits())
    }
}

/// One trace line for the instruction just fetched.
///
/// ```text
/// $0000  A9  LDA $0001      A:70 X:00 Y:00 P:nv-bdizc SP:00 CYC:1
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TraceLine<'a>(pub &'a Ricoh2A03);

impl fmt::Display for TraceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpu = self.0;
        let regs = &cpu.regs;
        match cpu.last_fetch() {
            Some(fetch) => {
                let decoded = format!("{} {}", fetch.instruction(), cpu.effective_address());
                write!(f, "${:04X}  {:02X}  {decoded:<14}", fetch.pc, fetch.code)?;
            }
            None => write!(f, "{:<25}", "(no fetch)")?,
        }
        write!(
            f,
            " A:{:02X} X:{:02X} Y:{:02X} P:{} SP:{:02X} CYC:{}",
            regs.a,
            regs.x,
            regs.y,
            regs.p,
            regs.s,
            cpu.total_cycles()
        )
    }
}
