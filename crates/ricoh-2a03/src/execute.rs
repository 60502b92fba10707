//! Instruction executors.
//!
//! Executors run after the resolver has set the effective address and after
//! PC has moved past the instruction, so control-flow instructions simply
//! overwrite PC.

use emu_core::{Bus, BusError};

use crate::Ricoh2A03;
use crate::addressing::{Operand, page_crossed, read_word};
use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::Instruction;

/// BRK loads PC from here.
const IRQ_VECTOR: u16 = 0xFFFE;

impl Ricoh2A03 {
    /// Execute `instruction` against the resolved operand.
    ///
    /// Returns extra cycles beyond the descriptor's cost (taken branches).
    pub(crate) fn execute<B: Bus + ?Sized>(
        &mut self,
        instruction: Instruction,
        bus: &mut B,
    ) -> Result<u8, BusError> {
        match instruction {
            // Loads
            Instruction::Lda => {
                self.regs.a = self.load(bus)?;
                self.update_nz(self.regs.a);
            }
            Instruction::Ldx => {
                self.regs.x = self.load(bus)?;
                self.update_nz(self.regs.x);
            }
            Instruction::Ldy => {
                self.regs.y = self.load(bus)?;
                self.update_nz(self.regs.y);
            }

            // Stores
            Instruction::Sta => self.store(bus, self.regs.a)?,
            Instruction::Stx => self.store(bus, self.regs.x)?,
            Instruction::Sty => self.store(bus, self.regs.y)?,

            // Arithmetic and logic
            Instruction::Adc => {
                let value = self.load(bus)?;
                self.do_adc(value);
            }
            Instruction::Sbc => {
                let value = self.load(bus)?;
                self.add_with_carry(!value);
            }
            Instruction::And => {
                let value = self.load(bus)?;
                self.regs.a &= value;
                self.update_nz(self.regs.a);
            }
            Instruction::Ora => {
                let value = self.load(bus)?;
                self.regs.a |= value;
                self.update_nz(self.regs.a);
            }
            Instruction::Eor => {
                let value = self.load(bus)?;
                self.regs.a ^= value;
                self.update_nz(self.regs.a);
            }
            Instruction::Bit => {
                let value = self.load(bus)?;
                self.assign(Z, self.regs.a & value == 0);
                self.assign(N, value & 0x80 != 0);
                self.assign(V, value & 0x40 != 0);
            }
            Instruction::Cmp => {
                let value = self.load(bus)?;
                self.compare(self.regs.a, value);
            }
            Instruction::Cpx => {
                let value = self.load(bus)?;
                self.compare(self.regs.x, value);
            }
            Instruction::Cpy => {
                let value = self.load(bus)?;
                self.compare(self.regs.y, value);
            }

            // Read-modify-write
            Instruction::Asl => {
                if self.config.quirks.shift_into_accumulator {
                    let value = self.load(bus)?;
                    self.regs.a = self.do_asl(value);
                } else {
                    self.modify(bus, Self::do_asl)?;
                }
            }
            Instruction::Lsr => self.modify(bus, Self::do_lsr)?,
            Instruction::Rol => self.modify(bus, Self::do_rol)?,
            Instruction::Ror => self.modify(bus, Self::do_ror)?,
            Instruction::Inc => self.modify(bus, Self::do_inc)?,
            Instruction::Dec => self.modify(bus, Self::do_dec)?,

            // Register increments and transfers
            Instruction::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.update_nz(self.regs.x);
            }
            Instruction::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.update_nz(self.regs.y);
            }
            Instruction::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.update_nz(self.regs.x);
            }
            Instruction::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.update_nz(self.regs.y);
            }
            Instruction::Tax => {
                self.regs.x = self.regs.a;
                self.update_nz(self.regs.x);
            }
            Instruction::Tay => {
                self.regs.y = self.regs.a;
                self.update_nz(self.regs.y);
            }
            Instruction::Txa => {
                self.regs.a = self.regs.x;
                self.update_nz(self.regs.a);
            }
            Instruction::Tya => {
                self.regs.a = self.regs.y;
                self.update_nz(self.regs.a);
            }
            Instruction::Tsx => {
                self.regs.x = self.regs.s;
                self.update_nz(self.regs.x);
            }
            // TXS does not affect flags
            Instruction::Txs => self.regs.s = self.regs.x,

            // Stack
            Instruction::Pha => self.push(bus, self.regs.a)?,
            Instruction::Php => self.push(bus, self.regs.p.to_pushed())?,
            Instruction::Pla => {
                self.regs.a = self.pull(bus)?;
                self.update_nz(self.regs.a);
            }
            Instruction::Plp => {
                let value = self.pull(bus)?;
                self.regs.p = self.regs.p.from_pulled(value);
            }

            // Control flow
            Instruction::Jmp => {
                if let Some(target) = self.effective_address.address() {
                    self.regs.pc = target;
                }
            }
            Instruction::Jsr => {
                // Pushes the address of the JSR's last byte.
                let ret = self.regs.pc.wrapping_sub(1);
                self.push_word(bus, ret)?;
                if let Some(target) = self.effective_address.address() {
                    self.regs.pc = target;
                }
            }
            Instruction::Rts => {
                self.regs.pc = self.pull_word(bus)?.wrapping_add(1);
            }
            Instruction::Brk => {
                // Skips the padding byte after the opcode.
                let ret = self.regs.pc.wrapping_add(1);
                self.push_word(bus, ret)?;
                self.push(bus, self.regs.p.to_pushed())?;
                self.regs.p.set(I);
                self.regs.pc = read_word(bus, IRQ_VECTOR)?;
            }
            Instruction::Rti => {
                let value = self.pull(bus)?;
                self.regs.p = self.regs.p.from_pulled(value);
                self.regs.pc = self.pull_word(bus)?;
            }

            // Branches
            Instruction::Bcc => return Ok(self.branch(!self.regs.p.is_set(C))),
            Instruction::Bcs => return Ok(self.branch(self.regs.p.is_set(C))),
            Instruction::Bne => return Ok(self.branch(!self.regs.p.is_set(Z))),
            Instruction::Beq => return Ok(self.branch(self.regs.p.is_set(Z))),
            Instruction::Bpl => return Ok(self.branch(!self.regs.p.is_set(N))),
            Instruction::Bmi => return Ok(self.branch(self.regs.p.is_set(N))),
            Instruction::Bvc => return Ok(self.branch(!self.regs.p.is_set(V))),
            Instruction::Bvs => return Ok(self.branch(self.regs.p.is_set(V))),

            // Flags are written directly, even with sticky flags.
            Instruction::Clc => self.regs.p.clear(C),
            Instruction::Cld => self.regs.p.clear(D),
            Instruction::Cli => self.regs.p.clear(I),
            Instruction::Clv => self.regs.p.clear(V),
            Instruction::Sec => self.regs.p.set(C),
            Instruction::Sed => self.regs.p.set(D),
            Instruction::Sei => self.regs.p.set(I),

            Instruction::Nop | Instruction::Undefined => {}
        }
        Ok(0)
    }

    // =========================================================================
    // Operand access
    // =========================================================================

    /// Read the operand. Register-only operands read A.
    fn load<B: Bus + ?Sized>(&self, bus: &mut B) -> Result<u8, BusError> {
        match self.effective_address {
            Operand::Address(addr) => bus.read(addr),
            Operand::Accumulator | Operand::Implied => Ok(self.regs.a),
        }
    }

    /// Write back to wherever the operand came from.
    fn store<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) -> Result<(), BusError> {
        match self.effective_address {
            Operand::Address(addr) => bus.write(addr, value),
            Operand::Accumulator | Operand::Implied => {
                self.regs.a = value;
                Ok(())
            }
        }
    }

    fn modify<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: fn(&mut Self, u8) -> u8,
    ) -> Result<(), BusError> {
        let value = self.load(bus)?;
        let result = op(self, value);
        self.store(bus, result)
    }

    fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) -> Result<(), BusError> {
        let addr = self.regs.push();
        bus.write(addr, value)
    }

    fn pull<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u8, BusError> {
        let addr = self.regs.pop();
        bus.read(addr)
    }

    /// Push high byte first, so the word reads little-endian on the stack.
    fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) -> Result<(), BusError> {
        let [low, high] = value.to_le_bytes();
        self.push(bus, high)?;
        self.push(bus, low)
    }

    fn pull_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u16, BusError> {
        let low = self.pull(bus)?;
        let high = self.pull(bus)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Set a flag on `condition`; clear it otherwise unless flags are sticky.
    fn assign(&mut self, flag: u8, condition: bool) {
        if condition {
            self.regs.p.set(flag);
        } else if !self.config.quirks.sticky_flags {
            self.regs.p.clear(flag);
        }
    }

    fn update_nz(&mut self, value: u8) {
        self.assign(N, value & 0x80 != 0);
        self.assign(Z, value == 0);
    }

    // =========================================================================
    // ALU operations
    // =========================================================================

    fn do_adc(&mut self, value: u8) {
        if self.config.quirks.adc_ignores_carry {
            self.add_without_carry(value);
        } else {
            self.add_with_carry(value);
        }
    }

    /// Binary add; the 2A03 has no decimal mode.
    fn add_with_carry(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(self.regs.p.is_set(C));
        let result = sum as u8;

        self.assign(C, sum > 0xFF);
        self.assign(V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.update_nz(result);
        self.regs.a = result;
    }

    fn add_without_carry(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value);
        let result = sum as u8;
        let same_sign = (a ^ value) & 0x80 == 0;

        self.assign(C, sum > 0xFF);
        self.assign(Z, result == 0);
        self.assign(V, same_sign && (a ^ result) & 0x80 != 0);
        self.assign(N, !same_sign && result & 0x80 != 0);
        self.regs.a = result;
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.assign(C, register >= value);
        self.update_nz(register.wrapping_sub(value));
    }

    fn do_asl(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.assign(C, value & 0x80 != 0);
        self.update_nz(result);
        result
    }

    fn do_lsr(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.assign(C, value & 0x01 != 0);
        self.update_nz(result);
        result
    }

    fn do_rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | u8::from(self.regs.p.is_set(C));
        self.assign(C, value & 0x80 != 0);
        self.update_nz(result);
        result
    }

    fn do_ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (u8::from(self.regs.p.is_set(C)) << 7);
        self.assign(C, value & 0x01 != 0);
        self.update_nz(result);
        result
    }

    fn do_inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.update_nz(result);
        result
    }

    fn do_dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.update_nz(result);
        result
    }

    /// Take the branch if `taken`: 1 extra cycle, 2 if the target is on a
    /// different page from the next instruction.
    fn branch(&mut self, taken: bool) -> u8 {
        let Operand::Address(target) = self.effective_address else {
            return 0;
        };
        if !taken {
            return 0;
        }
        let next = self.regs.pc;
        self.regs.pc = target;
        1 + u8::from(page_crossed(next, target))
    }
}
