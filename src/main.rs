//! Command line runner.
//!
//! Loads a program file, runs it to completion and prints the final state.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use rv_lite::err::Error as _;
use rv_lite::parse::Program;
use rv_lite::sim::{SimFlags, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rv-lite",
    version,
    about = "Run a text-assembled RISC-V subset program and print its final state"
)]
struct Cli {
    /// Program file to run.
    #[arg(default_value = "program.txt")]
    program: PathBuf,

    /// Disable the repeat guard, allowing PCs to execute more than once.
    #[arg(long)]
    no_loop_guard: bool,

    /// Stop after this many instructions.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let program = match Program::read_file(&cli.program) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", cli.program.display());
            return ExitCode::FAILURE;
        }
    };

    let flags = SimFlags {
        loop_guard: !cli.no_loop_guard,
    };
    if !flags.loop_guard && cli.max_steps.is_none() {
        log::warn!("repeat guard disabled without --max-steps, looping programs will not terminate");
    }

    let mut sim = Simulator::new(flags);
    sim.load_program(&program);

    let result = match cli.max_steps {
        Some(n) => sim.run_with_limit(n),
        None => sim.run(),
    };

    println!("{}", sim.report());

    match result {
        Ok(()) => {
            if !sim.hit_halt() {
                log::info!("stopped after {} instructions at PC: {}", sim.instruction_count, sim.pc);
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(help) = e.help() {
                eprintln!("help: {help}");
            }
            ExitCode::FAILURE
        }
    }
}
