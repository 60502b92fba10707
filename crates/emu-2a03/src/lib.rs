//! Command-line host for the Ricoh 2A03 CPU core.
//!
//! Loads a program image into a flat memory, drives the CPU one pulse at a
//! time and observes it between instructions for tracing and dumps.

pub mod config;
pub mod logger;
mod session;

pub use config::{Command, ConfigError, ProgramSource, Region, RunConfig, USAGE, parse_args};
pub use session::{RunSummary, Session, SessionError, StopReason};
