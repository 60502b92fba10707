//! Opcode table.
//!
//! Maps every opcode byte to a descriptor: length, base cycle cost, whether
//! the page-cross penalty applies, and the addressing mode and instruction
//! to dispatch to. The table is total; undocumented slots hold
//! [`Opcode::UNDEFINED`].

use std::fmt;

/// How an instruction finds its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand (CLC, RTS, ...).
    Implied,
    /// Operates on A (ASL A, ...).
    Accumulator,
    /// `#$nn` - the operand byte itself.
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`, wraps within page zero.
    ZeroPageX,
    /// `$nn,Y`, wraps within page zero.
    ZeroPageY,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nnnn)` - JMP only.
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
    /// Signed branch offset.
    Relative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// Whether indexing can carry into the high byte.
    #[must_use]
    pub const fn can_cross_page(self) -> bool {
        matches!(self, Self::AbsoluteX | Self::AbsoluteY | Self::IndirectY)
    }
}

/// Documented instructions, plus a marker for empty table slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// No documented instruction has this encoding.
    Undefined,
}

impl Instruction {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
            Self::Undefined => "???",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Static description of one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Instruction length in bytes, opcode included.
    pub length: u8,
    /// Cycle cost before any page-cross or branch penalty.
    pub base_cycles: u8,
    /// Whether crossing a page while indexing costs one more cycle.
    pub page_penalty: bool,
    pub mode: AddressingMode,
    pub instruction: Instruction,
}

impl Opcode {
    /// Zero-effect descriptor for slots with no documented instruction.
    pub const UNDEFINED: Self = Self {
        length: 0,
        base_cycles: 0,
        page_penalty: false,
        mode: AddressingMode::Implied,
        instruction: Instruction::Undefined,
    };

    const fn row(
        instruction: Instruction,
        mode: AddressingMode,
        base_cycles: u8,
        page_penalty: bool,
    ) -> Self {
        Self {
            length: 1 + mode.operand_len(),
            base_cycles,
            page_penalty,
            mode,
            instruction,
        }
    }

    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !matches!(self.instruction, Instruction::Undefined)
    }
}

use AddressingMode::{
    Absolute as Abs, AbsoluteX as Abx, AbsoluteY as Aby, Accumulator as Acc, Immediate as Imm,
    Implied as Imp, Indirect as Ind, IndirectX as Izx, IndirectY as Izy, Relative as Rel,
    ZeroPage as Zp, ZeroPageX as Zpx, ZeroPageY as Zpy,
};
use Instruction::{
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx,
    Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla,
    Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

/// `(opcode, instruction, mode, base cycles, page penalty)`.
///
/// Timings from the MOS programming manual. A `true` in the last column is
/// the "+1 if page boundary crossed" footnote; stores and read-modify-write
/// instructions always pay the fixed indexed cost instead.
const DOCUMENTED: [(u8, Instruction, AddressingMode, u8, bool); 151] = [
    // ADC - Affects N V Z C
    (0x69, Adc, Imm, 2, false),
    (0x65, Adc, Zp, 3, false),
    (0x75, Adc, Zpx, 4, false),
    (0x6D, Adc, Abs, 4, false),
    (0x7D, Adc, Abx, 4, true),
    (0x79, Adc, Aby, 4, true),
    (0x61, Adc, Izx, 6, false),
    (0x71, Adc, Izy, 5, true),
    // AND - Affects N Z
    (0x29, And, Imm, 2, false),
    (0x25, And, Zp, 3, false),
    (0x35, And, Zpx, 4, false),
    (0x2D, And, Abs, 4, false),
    (0x3D, And, Abx, 4, true),
    (0x39, And, Aby, 4, true),
    (0x21, And, Izx, 6, false),
    (0x31, And, Izy, 5, true),
    // ASL - Affects N Z C
    (0x0A, Asl, Acc, 2, false),
    (0x06, Asl, Zp, 5, false),
    (0x16, Asl, Zpx, 6, false),
    (0x0E, Asl, Abs, 6, false),
    (0x1E, Asl, Abx, 7, false),
    // Branches - +1 if taken, +1 more if the target is on another page
    (0x90, Bcc, Rel, 2, false),
    (0xB0, Bcs, Rel, 2, false),
    (0xF0, Beq, Rel, 2, false),
    (0x30, Bmi, Rel, 2, false),
    (0xD0, Bne, Rel, 2, false),
    (0x10, Bpl, Rel, 2, false),
    (0x50, Bvc, Rel, 2, false),
    (0x70, Bvs, Rel, 2, false),
    // BIT - Affects N V Z
    (0x24, Bit, Zp, 3, false),
    (0x2C, Bit, Abs, 4, false),
    // BRK - Affects B I
    (0x00, Brk, Imp, 7, false),
    // Flag instructions
    (0x18, Clc, Imp, 2, false),
    (0xD8, Cld, Imp, 2, false),
    (0x58, Cli, Imp, 2, false),
    (0xB8, Clv, Imp, 2, false),
    (0x38, Sec, Imp, 2, false),
    (0xF8, Sed, Imp, 2, false),
    (0x78, Sei, Imp, 2, false),
    // CMP - Affects N Z C
    (0xC9, Cmp, Imm, 2, false),
    (0xC5, Cmp, Zp, 3, false),
    (0xD5, Cmp, Zpx, 4, false),
    (0xCD, Cmp, Abs, 4, false),
    (0xDD, Cmp, Abx, 4, true),
    (0xD9, Cmp, Aby, 4, true),
    (0xC1, Cmp, Izx, 6, false),
    (0xD1, Cmp, Izy, 5, true),
    // CPX, CPY - Affects N Z C
    (0xE0, Cpx, Imm, 2, false),
    (0xE4, Cpx, Zp, 3, false),
    (0xEC, Cpx, Abs, 4, false),
    (0xC0, Cpy, Imm, 2, false),
    (0xC4, Cpy, Zp, 3, false),
    (0xCC, Cpy, Abs, 4, false),
    // DEC - Affects N Z
    (0xC6, Dec, Zp, 5, false),
    (0xD6, Dec, Zpx, 6, false),
    (0xCE, Dec, Abs, 6, false),
    (0xDE, Dec, Abx, 7, false),
    // EOR - Affects N Z
    (0x49, Eor, Imm, 2, false),
    (0x45, Eor, Zp, 3, false),
    (0x55, Eor, Zpx, 4, false),
    (0x4D, Eor, Abs, 4, false),
    (0x5D, Eor, Abx, 4, true),
    (0x59, Eor, Aby, 4, true),
    (0x41, Eor, Izx, 6, false),
    (0x51, Eor, Izy, 5, true),
    // INC - Affects N Z
    (0xE6, Inc, Zp, 5, false),
    (0xF6, Inc, Zpx, 6, false),
    (0xEE, Inc, Abs, 6, false),
    (0xFE, Inc, Abx, 7, false),
    // JMP, JSR
    (0x4C, Jmp, Abs, 3, false),
    (0x6C, Jmp, Ind, 5, false),
    (0x20, Jsr, Abs, 6, false),
    // LDA - Affects N Z
    (0xA9, Lda, Imm, 2, false),
    (0xA5, Lda, Zp, 3, false),
    (0xB5, Lda, Zpx, 4, false),
    (0xAD, Lda, Abs, 4, false),
    (0xBD, Lda, Abx, 4, true),
    (0xB9, Lda, Aby, 4, true),
    (0xA1, Lda, Izx, 6, false),
    (0xB1, Lda, Izy, 5, true),
    // LDX - Affects N Z
    (0xA2, Ldx, Imm, 2, false),
    (0xA6, Ldx, Zp, 3, false),
    (0xB6, Ldx, Zpy, 4, false),
    (0xAE, Ldx, Abs, 4, false),
    (0xBE, Ldx, Aby, 4, true),
    // LDY - Affects N Z
    (0xA0, Ldy, Imm, 2, false),
    (0xA4, Ldy, Zp, 3, false),
    (0xB4, Ldy, Zpx, 4, false),
    (0xAC, Ldy, Abs, 4, false),
    (0xBC, Ldy, Abx, 4, true),
    // LSR - Affects N Z C
    (0x4A, Lsr, Acc, 2, false),
    (0x46, Lsr, Zp, 5, false),
    (0x56, Lsr, Zpx, 6, false),
    (0x4E, Lsr, Abs, 6, false),
    (0x5E, Lsr, Abx, 7, false),
    // NOP
    (0xEA, Nop, Imp, 2, false),
    // ORA - Affects N Z
    (0x09, Ora, Imm, 2, false),
    (0x05, Ora, Zp, 3, false),
    (0x15, Ora, Zpx, 4, false),
    (0x0D, Ora, Abs, 4, false),
    (0x1D, Ora, Abx, 4, true),
    (0x19, Ora, Aby, 4, true),
    (0x01, Ora, Izx, 6, false),
    (0x11, Ora, Izy, 5, true),
    // Register instructions - Affect N Z
    (0xAA, Tax, Imp, 2, false),
    (0x8A, Txa, Imp, 2, false),
    (0xCA, Dex, Imp, 2, false),
    (0xE8, Inx, Imp, 2, false),
    (0xA8, Tay, Imp, 2, false),
    (0x98, Tya, Imp, 2, false),
    (0x88, Dey, Imp, 2, false),
    (0xC8, Iny, Imp, 2, false),
    // ROL - Affects N Z C
    (0x2A, Rol, Acc, 2, false),
    (0x26, Rol, Zp, 5, false),
    (0x36, Rol, Zpx, 6, false),
    (0x2E, Rol, Abs, 6, false),
    (0x3E, Rol, Abx, 7, false),
    // ROR - Affects N Z C
    (0x6A, Ror, Acc, 2, false),
    (0x66, Ror, Zp, 5, false),
    (0x76, Ror, Zpx, 6, false),
    (0x6E, Ror, Abs, 6, false),
    (0x7E, Ror, Abx, 7, false),
    // RTI, RTS
    (0x40, Rti, Imp, 6, false),
    (0x60, Rts, Imp, 6, false),
    // SBC - Affects N V Z C
    (0xE9, Sbc, Imm, 2, false),
    (0xE5, Sbc, Zp, 3, false),
    (0xF5, Sbc, Zpx, 4, false),
    (0xED, Sbc, Abs, 4, false),
    (0xFD, Sbc, Abx, 4, true),
    (0xF9, Sbc, Aby, 4, true),
    (0xE1, Sbc, Izx, 6, false),
    (0xF1, Sbc, Izy, 5, true),
    // STA - Affects none
    (0x85, Sta, Zp, 3, false),
    (0x95, Sta, Zpx, 4, false),
    (0x8D, Sta, Abs, 4, false),
    (0x9D, Sta, Abx, 5, false),
    (0x99, Sta, Aby, 5, false),
    (0x81, Sta, Izx, 6, false),
    (0x91, Sta, Izy, 6, false),
    // Stack instructions
    (0x9A, Txs, Imp, 2, false),
    (0xBA, Tsx, Imp, 2, false),
    (0x48, Pha, Imp, 3, false),
    (0x68, Pla, Imp, 4, false),
    (0x08, Php, Imp, 3, false),
    (0x28, Plp, Imp, 4, false),
    // STX, STY - Affects none
    (0x86, Stx, Zp, 3, false),
    (0x96, Stx, Zpy, 4, false),
    (0x8E, Stx, Abs, 4, false),
    (0x84, Sty, Zp, 3, false),
    (0x94, Sty, Zpx, 4, false),
    (0x8C, Sty, Abs, 4, false),
];

/// The 256-entry decode table.
///
/// Built once and read-only afterwards. Each CPU owns a copy; it is small
/// enough that sharing buys nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeTable {
    entries: [Opcode; 256],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTable {
    /// Table of the 151 documented NMOS opcodes.
    #[must_use]
    pub const fn new() -> Self {
        let mut entries = [Opcode::UNDEFINED; 256];
        let mut i = 0;
        while i < DOCUMENTED.len() {
            let (code, instruction, mode, cycles, page_penalty) = DOCUMENTED[i];
            entries[code as usize] = Opcode::row(instruction, mode, cycles, page_penalty);
            i += 1;
        }
        Self { entries }
    }

    /// A table with no instructions at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: [Opcode::UNDEFINED; 256],
        }
    }

    /// Replace one slot.
    #[must_use]
    pub const fn with(mut self, code: u8, opcode: Opcode) -> Self {
        self.entries[code as usize] = opcode;
        self
    }

    #[must_use]
    pub const fn lookup(&self, code: u8) -> &Opcode {
        &self.entries[code as usize]
    }

    /// Populated slots, in opcode order.
    pub fn defined(&self) -> impl Iterator<Item = (u8, &Opcode)> + '_ {
        (0..=u8::MAX)
            .map(|code| (code, self.lookup(code)))
            .filter(|(_, op)| op.is_defined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total_and_documented_count_matches() {
        let table = OpcodeTable::new();
        assert_eq!(table.defined().count(), 151);
        for code in 0..=u8::MAX {
            let op = table.lookup(code);
            if !op.is_defined() {
                assert_eq!(*op, Opcode::UNDEFINED, "slot ${code:02X}");
            }
        }
    }

    #[test]
    fn no_opcode_is_listed_twice() {
        let mut seen = [false; 256];
        for (code, ..) in DOCUMENTED {
            assert!(!seen[code as usize], "duplicate row for ${code:02X}");
            seen[code as usize] = true;
        }
    }

    #[test]
    fn length_follows_addressing_mode() {
        let table = OpcodeTable::new();
        for (code, op) in table.defined() {
            assert_eq!(
                op.length,
                1 + op.mode.operand_len(),
                "${code:02X} {}",
                op.instruction
            );
            assert!((1..=3).contains(&op.length));
            assert!((2..=7).contains(&op.base_cycles), "${code:02X}");
        }
    }

    #[test]
    fn penalty_only_on_indexed_reads() {
        let table = OpcodeTable::new();
        for (code, op) in table.defined() {
            if op.page_penalty {
                assert!(op.mode.can_cross_page(), "${code:02X}");
                assert!(
                    !matches!(
                        op.instruction,
                        Instruction::Sta | Instruction::Asl | Instruction::Inc
                    ),
                    "${code:02X} must pay a fixed cost"
                );
            }
        }
    }

    #[test]
    fn distilled_core_rows() {
        let table = OpcodeTable::new();
        let check = |code: u8, ins, mode, len, cycles, penalty| {
            let op = table.lookup(code);
            assert_eq!(op.instruction, ins, "${code:02X}");
            assert_eq!(op.mode, mode, "${code:02X}");
            assert_eq!(op.length, len, "${code:02X}");
            assert_eq!(op.base_cycles, cycles, "${code:02X}");
            assert_eq!(op.page_penalty, penalty, "${code:02X}");
        };

        check(0x69, Adc, Imm, 2, 2, false);
        check(0x71, Adc, Izy, 2, 5, true);
        check(0xA9, Lda, Imm, 2, 2, false);
        check(0xBD, Lda, Abx, 3, 4, true);
        check(0xB9, Lda, Aby, 3, 4, true);
        check(0xA1, Lda, Izx, 2, 6, false);
        check(0x9D, Sta, Abx, 3, 5, false);
        check(0x91, Sta, Izy, 2, 6, false);
        check(0x3D, And, Abx, 3, 4, true);
        check(0x0A, Asl, Acc, 1, 2, false);
        check(0x1E, Asl, Abx, 3, 7, false);
        check(0x6C, Jmp, Ind, 3, 5, false);
        check(0x00, Brk, Imp, 1, 7, false);
    }

    #[test]
    fn undefined_slots_are_zero_effect() {
        let table = OpcodeTable::new();
        for code in [0x02, 0x03, 0x1A, 0x80, 0xFF] {
            let op = table.lookup(code);
            assert!(!op.is_defined());
            assert_eq!(op.length, 0);
            assert_eq!(op.base_cycles, 0);
            assert_eq!(op.instruction.mnemonic(), "???");
        }
    }

    #[test]
    fn table_can_be_customised() {
        let table = OpcodeTable::empty().with(0xEA, OpcodeTable::new().lookup(0xEA).to_owned());
        assert_eq!(table.defined().count(), 1);
        assert_eq!(table.lookup(0xEA).instruction, Nop);
    }
}
