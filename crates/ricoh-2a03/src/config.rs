//! CPU configuration.

/// What the engine does when it fetches an opcode with no documented
/// instruction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedOpcodePolicy {
    /// Report [`CpuError::UndefinedOpcode`](crate::CpuError::UndefinedOpcode)
    /// and halt without advancing PC.
    #[default]
    Halt,
    /// Execute as a one-byte, two-cycle NOP.
    Nop,
}

/// Deviations from hardware behaviour, reproduced on request.
///
/// The default is a hardware-correct engine. [`Quirks::OBSERVED`] turns on
/// every deviation of the reference program this core was checked against,
/// for side-by-side comparison.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// Flag-affecting instructions only ever set flags, never clear them.
    /// Explicit clears (CLC, CLV, ...) and stack loads still write P.
    pub sticky_flags: bool,
    /// ADC adds without the carry-in, and sets N only when the operands'
    /// signs differ and the result is negative.
    pub adc_ignores_carry: bool,
    /// ASL always deposits its result in A, even for memory operands.
    pub shift_into_accumulator: bool,
}

impl Quirks {
    /// Hardware behaviour.
    pub const NONE: Self = Self {
        sticky_flags: false,
        adc_ignores_carry: false,
        shift_into_accumulator: false,
    };

    /// Every deviation of the reference program.
    pub const OBSERVED: Self = Self {
        sticky_flags: true,
        adc_ignores_carry: true,
        shift_into_accumulator: true,
    };
}

/// CPU configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    pub undefined_opcode: UndefinedOpcodePolicy,
    pub quirks: Quirks,
}

impl CpuConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undefined_opcode: UndefinedOpcodePolicy::Halt,
            quirks: Quirks::NONE,
        }
    }

    #[must_use]
    pub const fn with_undefined_opcode(mut self, policy: UndefinedOpcodePolicy) -> Self {
        self.undefined_opcode = policy;
        self
    }

    #[must_use]
    pub const fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hardware_behaviour() {
        let config = CpuConfig::default();
        assert_eq!(config, CpuConfig::new());
        assert_eq!(config.quirks, Quirks::NONE);
        assert_eq!(config.undefined_opcode, UndefinedOpcodePolicy::Halt);
    }

    #[test]
    fn builder_sets_fields() {
        let config = CpuConfig::new()
            .with_undefined_opcode(UndefinedOpcodePolicy::Nop)
            .with_quirks(Quirks::OBSERVED);
        assert_eq!(config.undefined_opcode, UndefinedOpcodePolicy::Nop);
        assert!(config.quirks.sticky_flags);
        assert!(config.quirks.adc_ignores_carry);
        assert!(config.quirks.shift_into_accumulator);
    }
}
