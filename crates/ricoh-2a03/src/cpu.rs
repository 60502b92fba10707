//! Clock/dispatch engine.
//!
//! Each `pulse()` models one clock pulse. When the CPU is idle, the pulse
//! fetches, resolves and executes a whole instruction at once and loads the
//! cycle countdown with its cost; the following pulses only count down.
//! Work is atomic, timing is spread out.

use emu_core::{Bus, Cpu, Observable, Ticks, Value};
use log::{debug, warn};

use crate::addressing::Operand;
use crate::config::{CpuConfig, UndefinedOpcodePolicy};
use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::{AddressingMode, Instruction, Opcode, OpcodeTable};
use crate::{CpuError, Registers};

/// Cycle cost of an undefined opcode run under [`UndefinedOpcodePolicy::Nop`].
const UNDEFINED_NOP_CYCLES: i32 = 2;

/// The most recent instruction fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetch {
    /// Address the opcode was read from.
    pub pc: u16,
    /// Opcode byte.
    pub code: u8,
    /// Descriptor it decoded to.
    pub opcode: Opcode,
}

/// The Ricoh 2A03 CPU core.
///
/// Owns its opcode table and configuration; memory is borrowed per pulse.
#[derive(Debug, Clone)]
pub struct Ricoh2A03 {
    /// CPU registers.
    pub regs: Registers,

    /// Pulses left before the next fetch. Idle at zero or below.
    cycles_remaining: i32,

    /// Operand resolved for the instruction in flight.
    pub(crate) effective_address: Operand,

    /// Last fetch, for observers.
    last_fetch: Option<Fetch>,

    /// Set by a fatal error; cleared by `reset()`.
    halted: bool,

    /// Total pulses executed.
    total_cycles: Ticks,

    pub(crate) config: CpuConfig,
    table: OpcodeTable,
}

impl Default for Ricoh2A03 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ricoh2A03 {
    /// Create a CPU in power-on state with the documented opcode table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CpuConfig) -> Self {
        Self::with_table(OpcodeTable::new(), config)
    }

    /// Create a CPU that decodes through `table`.
    #[must_use]
    pub fn with_table(table: OpcodeTable, config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            cycles_remaining: 0,
            effective_address: Operand::Implied,
            last_fetch: None,
            halted: false,
            total_cycles: Ticks::ZERO,
            config,
            table,
        }
    }

    /// Advance one clock pulse.
    pub fn pulse<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        if self.halted {
            return Err(CpuError::Halted { pc: self.regs.pc });
        }

        if self.cycles_remaining <= 0 {
            if let Err(err) = self.dispatch(bus) {
                debug!("2A03 halted: {err}");
                self.halted = true;
                return Err(err);
            }
        }

        self.cycles_remaining -= 1;
        self.total_cycles += Ticks::new(1);
        Ok(())
    }

    /// Pulse until the current (or next) instruction completes.
    ///
    /// Returns the number of pulses consumed.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        let mut pulses = 0;
        loop {
            self.pulse(bus)?;
            pulses += 1;
            if self.is_idle() {
                return Ok(pulses);
            }
        }
    }

    /// Fetch, decode, resolve and execute the instruction at PC.
    fn dispatch<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let pc = self.regs.pc;
        let code = bus.read(pc)?;
        let opcode = *self.table.lookup(code);
        self.last_fetch = Some(Fetch { pc, code, opcode });

        if !opcode.is_defined() {
            return match self.config.undefined_opcode {
                UndefinedOpcodePolicy::Halt => Err(CpuError::UndefinedOpcode { opcode: code, pc }),
                UndefinedOpcodePolicy::Nop => {
                    warn!("undefined opcode ${code:02X} at ${pc:04X} executed as NOP");
                    self.effective_address = Operand::Implied;
                    self.cycles_remaining = UNDEFINED_NOP_CYCLES;
                    self.regs.pc = pc.wrapping_add(1);
                    Ok(())
                }
            };
        }

        self.cycles_remaining = i32::from(opcode.base_cycles);
        let extra = self.resolve(opcode.mode, bus, opcode.page_penalty)?;
        if opcode.page_penalty {
            self.cycles_remaining += i32::from(extra);
        }

        self.regs.pc = pc.wrapping_add(u16::from(opcode.length));
        let extra = self.execute(opcode.instruction, bus)?;
        self.cycles_remaining += i32::from(extra);
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Pulses left before the next fetch.
    #[must_use]
    pub const fn cycles_remaining(&self) -> i32 {
        self.cycles_remaining
    }

    /// Operand of the most recent instruction.
    #[must_use]
    pub const fn effective_address(&self) -> Operand {
        self.effective_address
    }

    #[must_use]
    pub const fn last_fetch(&self) -> Option<Fetch> {
        self.last_fetch
    }

    #[must_use]
    pub const fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    #[must_use]
    pub const fn table(&self) -> &OpcodeTable {
        &self.table
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl Cpu for Ricoh2A03 {
    type Registers = Registers;
    type Error = CpuError;

    fn tick<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.pulse(bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_idle(&self) -> bool {
        self.cycles_remaining <= 0
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    /// Power-on state. The opcode table and configuration are kept.
    fn reset(&mut self) {
        self.regs = Registers::new();
        self.cycles_remaining = 0;
        self.effective_address = Operand::Implied;
        self.last_fetch = None;
        self.halted = false;
        self.total_cycles = Ticks::ZERO;
    }
}

impl Observable for Ricoh2A03 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.bits().into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycles_remaining" => Some(self.cycles_remaining.into()),
            "effective_address" => Some(self.effective_address.to_string().into()),
            "opcode" => self.last_fetch.map(|fetch| fetch.code.into()),
            "mnemonic" => self
                .last_fetch
                .map(|fetch| fetch.opcode.instruction.mnemonic().into()),
            "cycle" => Some(self.total_cycles.get().into()),
            "halted" => Some(self.halted.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.n",
            "flags.v",
            "flags.d",
            "flags.i",
            "flags.z",
            "flags.c",
            "cycles_remaining",
            "effective_address",
            "opcode",
            "mnemonic",
            "cycle",
            "halted",
        ]
    }
}

impl Fetch {
    /// True for the one-byte placeholder run in place of an undefined opcode.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        !self.opcode.is_defined()
    }

    #[must_use]
    pub const fn instruction(&self) -> Instruction {
        self.opcode.instruction
    }

    #[must_use]
    pub const fn mode(&self) -> AddressingMode {
        self.opcode.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    #[test]
    fn power_on_state_is_all_zero() {
        let cpu = Ricoh2A03::new();
        assert_eq!(cpu.registers(), Registers::default());
        assert_eq!(cpu.cycles_remaining(), 0);
        assert_eq!(cpu.total_cycles(), Ticks::ZERO);
        assert_eq!(cpu.effective_address(), Operand::Implied);
        assert!(cpu.is_idle());
        assert!(!cpu.is_halted());
        assert_eq!(cpu.last_fetch(), None);
    }

    #[test]
    fn test_lda_immediate() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();

        // LDA #$42
        bus.load(0x0000, &[0xA9, 0x42]).expect("fits");

        // Pulse 1: fetch, resolve, execute
        cpu.tick(&mut bus).expect("pulse");
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0002);
        assert!(!cpu.is_idle());

        // Pulse 2: count down
        cpu.tick(&mut bus).expect("pulse");
        assert!(cpu.is_idle());
        assert_eq!(cpu.total_cycles(), Ticks::new(2));
    }

    #[test]
    fn test_sta_zeropage() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();

        cpu.regs.a = 0x55;
        // STA $10
        bus.load(0x0000, &[0x85, 0x10]).expect("fits");

        assert_eq!(cpu.step(&mut bus), Ok(3));
        assert_eq!(bus.peek(0x0010), 0x55);
    }

    #[test]
    fn test_jmp_absolute() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();

        // JMP $1234
        bus.load(0x0000, &[0x4C, 0x34, 0x12]).expect("fits");

        assert_eq!(cpu.step(&mut bus), Ok(3));
        assert_eq!(cpu.regs.pc, 0x1234);
    }

    #[test]
    fn step_finishes_instruction_in_flight() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();
        // ASL $10 (5 cycles)
        bus.load(0x0000, &[0x06, 0x10]).expect("fits");

        cpu.pulse(&mut bus).expect("pulse");
        cpu.pulse(&mut bus).expect("pulse");
        assert_eq!(cpu.step(&mut bus), Ok(3));
        assert!(cpu.is_idle());
    }

    #[test]
    fn last_fetch_records_decode() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();
        bus.load(0x0300, &[0xBD, 0x00, 0x20]).expect("fits");
        cpu.regs.pc = 0x0300;
        cpu.pulse(&mut bus).expect("pulse");

        let fetch = cpu.last_fetch().expect("fetched");
        assert_eq!(fetch.pc, 0x0300);
        assert_eq!(fetch.code, 0xBD);
        assert_eq!(fetch.instruction(), Instruction::Lda);
        assert_eq!(fetch.mode(), AddressingMode::AbsoluteX);
        assert!(!fetch.is_undefined());
    }

    #[test]
    fn custom_table_is_used_for_decode() {
        let nop = *OpcodeTable::new().lookup(0xEA);
        let table = OpcodeTable::empty().with(0xA9, nop);
        let mut cpu = Ricoh2A03::with_table(table, CpuConfig::default());
        let mut bus = SimpleBus::new();
        bus.load(0x0000, &[0xA9, 0x42]).expect("fits");

        cpu.step(&mut bus).expect("runs as NOP");
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.pc, 0x0001);
    }

    #[test]
    fn reset_clears_halt_and_keeps_config() {
        let config = CpuConfig::new().with_undefined_opcode(UndefinedOpcodePolicy::Halt);
        let mut cpu = Ricoh2A03::with_config(config);
        let mut bus = SimpleBus::new();
        bus.load(0x0000, &[0x02]).expect("fits");

        assert!(cpu.pulse(&mut bus).is_err());
        assert!(cpu.is_halted());
        assert_eq!(cpu.pulse(&mut bus), Err(CpuError::Halted { pc: 0x0000 }));

        cpu.regs.a = 0x99;
        cpu.reset();
        assert!(!cpu.is_halted());
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(*cpu.config(), config);
        assert_eq!(cpu.table().defined().count(), 151);
    }

    #[test]
    fn observable_paths_resolve() {
        let mut cpu = Ricoh2A03::new();
        let mut bus = SimpleBus::new();
        bus.load(0x0000, &[0xA9, 0x80]).expect("fits");
        cpu.pulse(&mut bus).expect("pulse");

        assert_eq!(cpu.query("a"), Some(Value::U8(0x80)));
        assert_eq!(cpu.query("flags.n"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("flags.z"), Some(Value::Bool(false)));
        assert_eq!(cpu.query("mnemonic"), Some(Value::String("LDA".into())));
        assert_eq!(
            cpu.query("effective_address"),
            Some(Value::String("$0001".into()))
        );
        assert_eq!(cpu.query("cycles_remaining"), Some(Value::I32(1)));
        assert_eq!(cpu.query("cycle"), Some(Value::U64(1)));
        assert_eq!(cpu.query("bogus"), None);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
    }
}
