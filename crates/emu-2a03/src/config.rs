//! Run configuration and command-line parsing.

use std::fmt;
use std::path::PathBuf;

use emu_core::{MasterClock, Ticks};
use ricoh_2a03::{CpuConfig, Quirks, UndefinedOpcodePolicy};

/// Largest memory image the host will allocate.
pub const MAX_MEMORY: usize = 0x1_0000;

pub const USAGE: &str = "\
Usage: emu-2a03 [OPTIONS] (--program <file> | --bytes <hex>)

Program:
  --program <file>      Raw binary image to load
  --bytes <hex>         Image as hex bytes, e.g. \"a9 70 0a\"
  --origin <hex>        Load address [default: 0000]
  --pc <hex>            Start address [default: origin]
  --memory <bytes>      Memory size in bytes [default: 65536]

Stop conditions (default: PC reaches the end of the image):
  --until-pc <hex>      Stop when PC reaches this address
  --instructions <n>    Stop after n instructions
  --frames <n>          Stop after n video frames of CPU time
  --region <ntsc|pal>   Frame timing for --frames [default: ntsc]

Output:
  --trace               Print one line per instruction
  --dump <rows>         Print registers and a 16-byte-per-row memory dump at exit
  -v, --verbose         More log output (repeatable)

CPU:
  --observed            Emulate the observed flag, ASL and ADC quirks
  --undefined <policy>  Undefined opcodes: halt or nop [default: halt]

  -h, --help            Show this help
";

/// Video region. Only frame timing matters to the CPU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// NTSC: 60 Hz, 1,789,773 Hz CPU.
    #[default]
    Ntsc,
    /// PAL: 50 Hz, 1,662,607 Hz CPU.
    Pal,
}

impl Region {
    /// CPU frequency in Hz.
    #[must_use]
    pub const fn cpu_hz(self) -> u64 {
        match self {
            Self::Ntsc => 1_789_773,
            Self::Pal => 1_662_607,
        }
    }

    #[must_use]
    pub const fn frames_per_second(self) -> u64 {
        match self {
            Self::Ntsc => 60,
            Self::Pal => 50,
        }
    }

    #[must_use]
    pub const fn clock(self) -> MasterClock {
        MasterClock::new(self.cpu_hz())
    }

    /// CPU pulses in `frames` frames.
    #[must_use]
    pub const fn cycles_for_frames(self, frames: u64) -> Ticks {
        self.clock().ticks_for_frames(frames, self.frames_per_second())
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ntsc" => Some(Self::Ntsc),
            "pal" => Some(Self::Pal),
            _ => None,
        }
    }
}

/// Where the program image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub program: ProgramSource,
    /// Load address of the image.
    pub origin: u16,
    /// Start address; the origin when unset.
    pub start_pc: Option<u16>,
    /// Size of the memory image in bytes.
    pub memory_size: usize,
    pub until_pc: Option<u16>,
    pub max_instructions: Option<u64>,
    pub frames: Option<u64>,
    pub region: Region,
    /// Print a trace line after every instruction.
    pub trace: bool,
    /// Rows of memory to dump at exit.
    pub dump_rows: Option<usize>,
    pub cpu: CpuConfig,
    /// Number of `--verbose` flags.
    pub verbosity: u8,
}

impl RunConfig {
    #[must_use]
    pub const fn new(program: ProgramSource) -> Self {
        Self {
            program,
            origin: 0,
            start_pc: None,
            memory_size: MAX_MEMORY,
            until_pc: None,
            max_instructions: None,
            frames: None,
            region: Region::Ntsc,
            trace: false,
            dump_rows: None,
            cpu: CpuConfig::new(),
            verbosity: 0,
        }
    }

    #[must_use]
    pub fn start_pc(&self) -> u16 {
        self.start_pc.unwrap_or(self.origin)
    }

    /// Pulse budget from `--frames`, if any.
    #[must_use]
    pub fn cycle_budget(&self) -> Option<Ticks> {
        self.frames.map(|frames| self.region.cycles_for_frames(frames))
    }

    /// True when no explicit stop condition was given.
    #[must_use]
    pub const fn stops_at_end_of_image(&self) -> bool {
        self.until_pc.is_none() && self.max_instructions.is_none() && self.frames.is_none()
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Box<RunConfig>),
    Help,
}

/// Error from command-line parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownArgument(String),
    MissingValue(&'static str),
    InvalidNumber { option: &'static str, value: String },
    InvalidByte(String),
    InvalidRegion(String),
    InvalidPolicy(String),
    InvalidMemorySize(u64),
    NoProgram,
    ConflictingPrograms,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
            Self::MissingValue(option) => write!(f, "missing value for {option}"),
            Self::InvalidNumber { option, value } => {
                write!(f, "invalid value for {option}: {value}")
            }
            Self::InvalidByte(byte) => write!(f, "invalid hex byte: {byte}"),
            Self::InvalidRegion(name) => write!(f, "unknown region: {name} (expected ntsc or pal)"),
            Self::InvalidPolicy(name) => {
                write!(f, "unknown undefined-opcode policy: {name} (expected halt or nop)")
            }
            Self::InvalidMemorySize(size) => {
                write!(f, "memory size {size} is outside 1..={MAX_MEMORY}")
            }
            Self::NoProgram => write!(f, "no program given (use --program or --bytes)"),
            Self::ConflictingPrograms => write!(f, "--program and --bytes are mutually exclusive"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse command-line arguments, not including the program name.
pub fn parse_args<I>(args: I) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut program = None;
    let mut config = RunConfig::new(ProgramSource::Bytes(Vec::new()));

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--program" => {
                let path = value(&mut args, "--program")?;
                set_program(&mut program, ProgramSource::File(PathBuf::from(path)))?;
            }
            "--bytes" => {
                let bytes = parse_bytes(&value(&mut args, "--bytes")?)?;
                set_program(&mut program, ProgramSource::Bytes(bytes))?;
            }
            "--origin" => config.origin = parse_hex("--origin", &value(&mut args, "--origin")?)?,
            "--pc" => config.start_pc = Some(parse_hex("--pc", &value(&mut args, "--pc")?)?),
            "--memory" => {
                let size = parse_count("--memory", &value(&mut args, "--memory")?)?;
                if size == 0 || size > MAX_MEMORY as u64 {
                    return Err(ConfigError::InvalidMemorySize(size));
                }
                config.memory_size = size as usize;
            }
            "--until-pc" => {
                config.until_pc = Some(parse_hex("--until-pc", &value(&mut args, "--until-pc")?)?);
            }
            "--instructions" => {
                config.max_instructions = Some(parse_count(
                    "--instructions",
                    &value(&mut args, "--instructions")?,
                )?);
            }
            "--frames" => {
                config.frames = Some(parse_count("--frames", &value(&mut args, "--frames")?)?);
            }
            "--region" => {
                let name = value(&mut args, "--region")?;
                config.region = Region::from_name(&name).ok_or(ConfigError::InvalidRegion(name))?;
            }
            "--trace" => config.trace = true,
            "--dump" => {
                let rows = parse_count("--dump", &value(&mut args, "--dump")?)?;
                config.dump_rows = Some(rows as usize);
            }
            "--observed" => config.cpu = config.cpu.with_quirks(Quirks::OBSERVED),
            "--undefined" => {
                let name = value(&mut args, "--undefined")?;
                let policy = match name.to_ascii_lowercase().as_str() {
                    "halt" => UndefinedOpcodePolicy::Halt,
                    "nop" => UndefinedOpcodePolicy::Nop,
                    _ => return Err(ConfigError::InvalidPolicy(name)),
                };
                config.cpu = config.cpu.with_undefined_opcode(policy);
            }
            "--verbose" | "-v" => config.verbosity = config.verbosity.saturating_add(1),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(ConfigError::UnknownArgument(other.to_string())),
        }
    }

    config.program = program.ok_or(ConfigError::NoProgram)?;
    Ok(Command::Run(Box::new(config)))
}

fn value<I>(args: &mut I, option: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(ConfigError::MissingValue(option))
}

fn set_program(
    program: &mut Option<ProgramSource>,
    source: ProgramSource,
) -> Result<(), ConfigError> {
    if program.is_some() {
        return Err(ConfigError::ConflictingPrograms);
    }
    *program = Some(source);
    Ok(())
}

/// Strip an optional `$` or `0x` prefix.
fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Parse a 16-bit address. Digits are always hex.
pub fn parse_hex(option: &'static str, text: &str) -> Result<u16, ConfigError> {
    u16::from_str_radix(strip_hex_prefix(text), 16).map_err(|_| ConfigError::InvalidNumber {
        option,
        value: text.to_string(),
    })
}

/// Parse a decimal count, or hex with a `$`/`0x` prefix.
fn parse_count(option: &'static str, text: &str) -> Result<u64, ConfigError> {
    let digits = strip_hex_prefix(text);
    let parsed = if digits.len() == text.len() {
        text.parse()
    } else {
        u64::from_str_radix(digits, 16)
    };
    parsed.map_err(|_| ConfigError::InvalidNumber {
        option,
        value: text.to_string(),
    })
}

/// Parse hex bytes separated by whitespace or commas.
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, ConfigError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let digits = strip_hex_prefix(token);
            if digits.is_empty() || digits.len() > 2 {
                return Err(ConfigError::InvalidByte(token.to_string()));
            }
            u8::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidByte(token.to_string()))
        })
        .collect()
}
