//! A single run of a program image.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use emu_core::{Observable, SimpleBus, Ticks};
use log::{debug, info, trace};
use ricoh_2a03::{CpuError, Ricoh2A03, StateDump, TraceLine};

use crate::config::{ProgramSource, RunConfig};

/// Bytes per hex dump row.
const DUMP_ROW: usize = 16;

/// Error from loading or running a program.
#[derive(Debug)]
pub enum SessionError {
    Read { path: PathBuf, source: io::Error },
    EmptyProgram,
    ProgramTooLarge { origin: u16, len: usize, size: usize },
    Cpu(CpuError),
    Output(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::EmptyProgram => write!(f, "program image is empty"),
            Self::ProgramTooLarge { origin, len, size } => write!(
                f,
                "{len}-byte program at ${origin:04X} does not fit in {size} bytes of memory"
            ),
            Self::Cpu(err) => write!(f, "CPU error: {err}"),
            Self::Output(err) => write!(f, "output error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Output(source) => Some(source),
            Self::Cpu(err) => Some(err),
            Self::EmptyProgram | Self::ProgramTooLarge { .. } => None,
        }
    }
}

impl From<CpuError> for SessionError {
    fn from(err: CpuError) -> Self {
        Self::Cpu(err)
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ReachedPc(u16),
    EndOfImage(u16),
    InstructionLimit(u64),
    CycleBudget(Ticks),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReachedPc(pc) => write!(f, "reached ${pc:04X}"),
            Self::EndOfImage(pc) => write!(f, "end of image at ${pc:04X}"),
            Self::InstructionLimit(count) => write!(f, "{count} instructions executed"),
            Self::CycleBudget(ticks) => write!(f, "{ticks} cycle budget used"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub instructions: u64,
    pub cycles: Ticks,
}

/// CPU, memory and stop conditions for one run.
pub struct Session {
    cpu: Ricoh2A03,
    bus: SimpleBus,
    /// First address past the loaded image; `None` when the image runs to
    /// the top of the address space.
    image_end: Option<u16>,
    until_pc: Option<u16>,
    max_instructions: Option<u64>,
    cycle_budget: Option<Ticks>,
    stop_at_end: bool,
    trace: bool,
    instructions: u64,
}

impl Session {
    /// Load the configured program and place the CPU at its start address.
    pub fn new(config: &RunConfig) -> Result<Self, SessionError> {
        let image = read_program(&config.program)?;
        Self::with_image(config, &image)
    }

    /// As [`Session::new`], with the image already in memory.
    pub fn with_image(config: &RunConfig, image: &[u8]) -> Result<Self, SessionError> {
        if image.is_empty() {
            return Err(SessionError::EmptyProgram);
        }

        let mut bus = SimpleBus::with_size(config.memory_size);
        bus.load(config.origin, image)
            .map_err(|_| SessionError::ProgramTooLarge {
                origin: config.origin,
                len: image.len(),
                size: bus.len(),
            })?;

        let mut cpu = Ricoh2A03::with_config(config.cpu);
        cpu.regs.pc = config.start_pc();
        info!(
            "loaded {} bytes at ${:04X}, starting at ${:04X}",
            image.len(),
            config.origin,
            cpu.regs.pc
        );

        Ok(Self {
            cpu,
            bus,
            image_end: u16::try_from(usize::from(config.origin) + image.len()).ok(),
            until_pc: config.until_pc,
            max_instructions: config.max_instructions,
            cycle_budget: config.cycle_budget(),
            stop_at_end: config.stops_at_end_of_image(),
            trace: config.trace,
            instructions: 0,
        })
    }

    /// Run whole instructions until a stop condition holds.
    ///
    /// Trace lines go to `out`. A CPU error ends the run; the CPU is left
    /// halted for inspection.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<RunSummary, SessionError> {
        loop {
            if let Some(reason) = self.stop_reason() {
                let summary = RunSummary {
                    reason,
                    instructions: self.instructions,
                    cycles: self.cpu.total_cycles(),
                };
                debug!("stopped: {reason}");
                return Ok(summary);
            }

            self.cpu.step(&mut self.bus)?;
            self.instructions += 1;

            if self.trace {
                writeln!(out, "{}", TraceLine(&self.cpu))?;
            }
            trace!("{}", self.cpu.describe());
        }
    }

    /// Checked at instruction boundaries.
    fn stop_reason(&self) -> Option<StopReason> {
        let pc = self.cpu.regs.pc;
        if self.until_pc == Some(pc) {
            return Some(StopReason::ReachedPc(pc));
        }
        if let Some(limit) = self.max_instructions
            && self.instructions >= limit
        {
            return Some(StopReason::InstructionLimit(limit));
        }
        if let Some(budget) = self.cycle_budget
            && self.cpu.total_cycles() >= budget
        {
            return Some(StopReason::CycleBudget(budget));
        }
        if self.stop_at_end && self.image_end == Some(pc) {
            return Some(StopReason::EndOfImage(pc));
        }
        None
    }

    /// Registers, then `rows` rows of memory from `$0000`.
    pub fn write_dump<W: Write + ?Sized>(&self, out: &mut W, rows: usize) -> io::Result<()> {
        writeln!(out, "{}", StateDump(&self.cpu))?;
        write_hex_dump(out, self.bus.as_slice(), rows)
    }

    #[must_use]
    pub const fn cpu(&self) -> &Ricoh2A03 {
        &self.cpu
    }

    #[must_use]
    pub const fn bus(&self) -> &SimpleBus {
        &self.bus
    }

    #[must_use]
    pub const fn instructions(&self) -> u64 {
        self.instructions
    }
}

fn read_program(source: &ProgramSource) -> Result<Vec<u8>, SessionError> {
    match source {
        ProgramSource::Bytes(bytes) => Ok(bytes.clone()),
        ProgramSource::File(path) => fs::read(path).map_err(|source| SessionError::Read {
            path: path.clone(),
            source,
        }),
    }
}

/// `$0000: A9 70 0A ...`, 16 bytes per row.
fn write_hex_dump<W: Write + ?Sized>(out: &mut W, memory: &[u8], rows: usize) -> io::Result<()> {
    for (row, chunk) in memory.chunks(DUMP_ROW).take(rows).enumerate() {
        write!(out, "${:04X}:", row * DUMP_ROW)?;
        for byte in chunk {
            write!(out, " {byte:02X}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
