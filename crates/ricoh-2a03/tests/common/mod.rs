//! `SingleStepTests`-format test vectors.

use emu_core::SimpleBus;
use ricoh_2a03::flags::{B, U};
use ricoh_2a03::{Ricoh2A03, Status};
use serde::Deserialize;

/// JSON test case format.
#[derive(Deserialize)]
pub struct TestCase {
    pub name: String,
    pub initial: CpuState,
    #[serde(rename = "final")]
    pub final_state: CpuState,
    pub cycles: Vec<(u16, u8, String)>,
}

/// JSON CPU state format.
#[derive(Deserialize)]
pub struct CpuState {
    pub pc: u16,
    pub s: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub ram: Vec<(u16, u8)>,
}

/// Set up the CPU and bus from the initial test state.
pub fn setup(cpu: &mut Ricoh2A03, bus: &mut SimpleBus, state: &CpuState) {
    for &(addr, value) in &state.ram {
        bus.load(addr, &[value]).expect("64K image holds every address");
    }
    cpu.regs.pc = state.pc;
    cpu.regs.s = state.s;
    cpu.regs.a = state.a;
    cpu.regs.x = state.x;
    cpu.regs.y = state.y;
    cpu.regs.p = Status(state.p);
}

/// Run one test case, returning a list of mismatches.
pub fn run(test: &TestCase) -> Vec<String> {
    let mut cpu = Ricoh2A03::new();
    let mut bus = SimpleBus::new();
    setup(&mut cpu, &mut bus, &test.initial);

    let mut errors = Vec::new();
    match cpu.step(&mut bus) {
        Ok(pulses) if pulses as usize != test.cycles.len() => errors.push(format!(
            "cycles: got {pulses}, want {}",
            test.cycles.len()
        )),
        Ok(_) => {}
        Err(err) => {
            errors.push(format!("error: {err}"));
            return errors;
        }
    }

    errors.extend(compare(&cpu, &bus, &test.final_state));
    errors
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
pub fn compare(cpu: &Ricoh2A03, bus: &SimpleBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();

    if cpu.regs.pc != expected.pc {
        errors.push(format!(
            "PC: got ${:04X}, want ${:04X}",
            cpu.regs.pc, expected.pc
        ));
    }
    if cpu.regs.s != expected.s {
        errors.push(format!(
            "S: got ${:02X}, want ${:02X}",
            cpu.regs.s, expected.s
        ));
    }
    if cpu.regs.a != expected.a {
        errors.push(format!(
            "A: got ${:02X}, want ${:02X}",
            cpu.regs.a, expected.a
        ));
    }
    if cpu.regs.x != expected.x {
        errors.push(format!(
            "X: got ${:02X}, want ${:02X}",
            cpu.regs.x, expected.x
        ));
    }
    if cpu.regs.y != expected.y {
        errors.push(format!(
            "Y: got ${:02X}, want ${:02X}",
            cpu.regs.y, expected.y
        ));
    }

    // B and U only exist on the stack.
    let mask = !(B | U);
    let actual_p = cpu.regs.p.bits() & mask;
    let expected_p = expected.p & mask;
    if actual_p != expected_p {
        errors.push(format!(
            "P: got ${actual_p:02X} ({actual_p:08b}), want ${expected_p:02X} ({expected_p:08b})"
        ));
    }

    for &(addr, expected_val) in &expected.ram {
        let actual_val = bus.peek(addr);
        if actual_val != expected_val {
            errors.push(format!(
                "RAM[${addr:04X}]: got ${actual_val:02X}, want ${expected_val:02X}"
            ));
        }
    }

    errors
}
