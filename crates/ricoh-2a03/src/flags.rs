//! Processor status register (P).
//!
//! ```text
//! 7  bit  0
//! ---- ----
//! NVUB DIZC
//! ```
//!
//! Bits 4 and 5 have no CPU effect; they only matter in the copy of P that
//! BRK and PHP push.

use std::fmt;

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable.
pub const I: u8 = 0x04;

/// Decimal mode. Stored, but the 2A03 has no BCD unit.
pub const D: u8 = 0x08;

/// Break - only meaningful in a pushed copy of P.
pub const B: u8 = 0x10;

/// Unused bit - pushed as 1.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// Processor status register.
///
/// Power-on value is all zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Value pushed by BRK and PHP (break and unused both set).
    #[must_use]
    pub const fn to_pushed(self) -> u8 {
        self.0 | B | U
    }

    /// Load from a pulled byte. Bits 4 and 5 keep their register value.
    #[must_use]
    pub const fn from_pulled(self, value: u8) -> Self {
        Self((value & !(B | U)) | (self.0 & (B | U)))
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }
}

/// `NV-BDIZC`, upper case when set.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u8, char); 8] = [
            (N, 'N'),
            (V, 'V'),
            (U, '-'),
            (B, 'B'),
            (D, 'D'),
            (I, 'I'),
            (Z, 'Z'),
            (C, 'C'),
        ];
        for (flag, name) in NAMES {
            let shown = match (self.is_set(flag), flag) {
                (_, U) => '-',
                (true, _) => name,
                (false, _) => name.to_ascii_lowercase(),
            };
            write!(f, "{shown}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_copy_sets_break_and_unused() {
        let p = Status(C | N);
        assert_eq!(p.to_pushed(), 0xB1);
        assert_eq!(p.bits(), 0x81, "register itself is unchanged");
    }

    #[test]
    fn pulled_copy_ignores_bits_4_and_5() {
        let p = Status::new().from_pulled(0xFF);
        assert_eq!(p.bits(), 0xCF);
        let p = Status(U).from_pulled(0x00);
        assert_eq!(p.bits(), U);
    }

    #[test]
    fn display_marks_set_flags() {
        assert_eq!(Status(N | Z | C).to_string(), "Nv-bdiZC");
        assert_eq!(Status::new().to_string(), "nv-bdizc");
    }
}
