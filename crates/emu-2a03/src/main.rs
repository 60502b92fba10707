//! Ricoh 2A03 host binary.
//!
//! Loads a program, runs it to a stop condition and optionally prints a
//! per-instruction trace and a final memory dump.

use std::io::{self, Write};
use std::process;

use emu_2a03::{Command, RunConfig, Session, SessionError, USAGE, logger, parse_args};
use log::info;
use ricoh_2a03::StateDump;

fn main() {
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            eprint!("{USAGE}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            process::exit(1);
        }
    };

    if let Err(e) = logger::init(logger::level_for(config.verbosity)) {
        eprintln!("Logger error: {e}");
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(config: &RunConfig) -> Result<(), SessionError> {
    let mut session = Session::new(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = session.run(&mut out);
    if let Err(SessionError::Cpu(_)) = &result {
        eprintln!("{}", StateDump(session.cpu()));
    }
    let summary = result?;
    info!(
        "{}: {} instructions, {} cycles",
        summary.reason, summary.instructions, summary.cycles
    );

    if let Some(rows) = config.dump_rows {
        session.write_dump(&mut out, rows)?;
    }
    out.flush()?;
    Ok(())
}
