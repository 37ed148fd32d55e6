//! Simulating and execution for loaded programs.
//!
//! This module is focused on executing a loaded [`Program`].
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates loaded programs.
//! - [`mem`]: The module handling memory and the register file.
//! - [`debug`]: The module handling types of breakpoints for the simulator.
//! - [`report`]: The module handling the end-of-run summary.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load a program into it:
//!
//! ```
//! use rv_lite::parse::parse_program;
//! use rv_lite::sim::{Simulator, HaltReason};
//!
//! let program = parse_program("
//!     program = [
//!         \"LI x1, 5\",
//!         \"LI x2, 7\",
//!         \"ADD x3, x1, x2\",
//!     ]
//! ");
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load_program(&program);
//! sim.run().unwrap();
//!
//! assert_eq!(sim.reg_file.as_slice()[3], 12);
//! assert_eq!(sim.halt_reason(), Some(HaltReason::EndOfProgram));
//! assert_eq!(sim.instruction_count, 3);
//! ```
//!
//! ## Termination
//!
//! A run ends normally when the PC moves past the last instruction.
//!
//! Each run also keeps track of which PCs it has executed. The first time any PC is about
//! to execute a second time, the simulator halts with [`HaltReason::RepeatedPc`].
//! This is a simple repeat guard, not a loop analysis: any backward branch that is taken
//! will halt the program once it comes back around, even if the loop would have finished.
//! The guard can be turned off with [`SimFlags::loop_guard`], in which case
//! [`Simulator::run_with_limit`] should be used to bound execution.
//!
//! Neither of these is an error. The final state can be read as usual after either.
//!
//! ## Errors
//!
//! Malformed instructions (unsupported opcodes, wrong operand counts, operands that are not numbers)
//! and jumps to unknown labels via `J`/`JAL` do not stop the simulator. They are logged,
//! recorded in [`Simulator::diagnostics`], and execution continues.
//! An empty instruction does nothing at all, not even advance the PC.
//!
//! A taken `BEQ` to an unknown label and out-of-range register indices
//! are fatal and are returned as a [`SimErr`].
//!
//! ## Debugging with breakpoints
//!
//! Breakpoints are accessible through the `breakpoints` field on [`Simulator`].
//!
//! ```
//! use rv_lite::parse::parse_program;
//! use rv_lite::sim::Simulator;
//! use rv_lite::sim::debug::Breakpoint;
//!
//! let program = parse_program("
//!     program = [
//!         LI x1, 1
//!         LI x2, 2
//!         LI x3, 3
//!     ]
//! ");
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load_program(&program);
//! sim.breakpoints.insert(Breakpoint::PC(2));
//!
//! sim.run().unwrap();
//! assert!(sim.hit_breakpoint());
//! assert_eq!(sim.pc, 2);
//! assert_eq!(sim.reg_file.as_slice()[3], 0);
//!
//! // Resume:
//! sim.run().unwrap();
//! assert!(sim.hit_halt());
//! assert_eq!(sim.reg_file.as_slice()[3], 3);
//! ```
pub mod mem;
pub mod debug;
pub mod report;

use std::collections::HashSet;

use crate::ast::{DecodeErr, Instr, Reg};
use crate::parse::Program;
use debug::Breakpoint;

use self::mem::{Mem, RegFile};
use self::report::Report;

/// Errors that can occur during simulation.
///
/// These are fatal. Recoverable problems are reported as [`Diagnostic`]s instead.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum SimErr {
    /// A taken branch referred to a label that is not in the label table.
    #[error("branch to unresolved label {0}")]
    UnresolvedLabel(String),
    /// An instruction named a register outside of x0-x31.
    #[error("register {0} is out of range")]
    RegOutOfRange(String),
}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            SimErr::UnresolvedLabel(label) => Some(format!("define the label with a `{label}:` line").into()),
            SimErr::RegOutOfRange(_) => Some("registers are x0-x31".into()),
        }
    }
}

/// A recoverable problem that occurred while executing an instruction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// The instruction could not be decoded and was skipped.
    DecodeFailed {
        /// The index of the instruction.
        pc: usize,
        /// The instruction text.
        instr: String,
        /// Why decoding failed.
        err: DecodeErr
    },
    /// A `J` or `JAL` referred to a label that is not in the label table.
    /// The PC was left unchanged.
    UnknownLabel {
        /// The index of the instruction.
        pc: usize,
        /// The missing label.
        label: String
    },
}
impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DecodeFailed { pc, instr, err } => write!(f, "Error decoding instruction at PC {pc}: {instr} ({err})"),
            Diagnostic::UnknownLabel { pc, label } => write!(f, "Label {label} not found (PC {pc})"),
        }
    }
}

/// Why the simulator stopped on its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HaltReason {
    /// The PC moved past the last instruction.
    EndOfProgram,
    /// The PC was about to execute an instruction it had already executed in this run.
    RepeatedPc(usize),
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// The program halted.
    Halt(HaltReason),
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Reason for why execution paused if it wasn't due to an error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
enum PauseCondition {
    /// Program halted.
    Halt(HaltReason),
    /// Program hit a breakpoint.
    Breakpoint,
    /// Program hit a tripwire condition.
    Tripwire,
    /// Program hit an error and did not pause successfully.
    #[default]
    Unsuccessful
}

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply.
///
/// Read the field descriptions for more details.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimFlags {
    /// Whether the repeat guard is enabled.
    ///
    /// When enabled, the simulator halts the first time a PC is revisited in a run.
    /// When disabled, programs with loops can run forever,
    /// so execution should be bounded with [`Simulator::run_with_limit`].
    ///
    /// By default, this flag is `true`.
    pub loop_guard: bool,
}

impl Default for SimFlags {
    fn default() -> Self {
        Self {
            loop_guard: true,
        }
    }
}

/// Executes loaded programs.
#[derive(Debug)]
pub struct Simulator {
    // ------------------ SIMULATION STATE ------------------
    // Calling [`Simulator::reset`] resets these values.

    /// The simulator's memory.
    pub mem: Mem,

    /// The simulator's register file.
    pub reg_file: RegFile,

    /// The program counter, as an index into the program's instructions.
    pub pc: usize,

    /// The number of instructions executed since this `Simulator` was initialized or reset.
    ///
    /// This counts instructions that failed to decode or faulted,
    /// but not empty instructions.
    pub instruction_count: u64,

    /// The number of cycles executed since this `Simulator` was initialized or reset.
    ///
    /// Every instruction takes one cycle, so this always equals `instruction_count`.
    pub cycle_count: u64,

    /// PCs executed in this run (for the repeat guard).
    visited: HashSet<usize>,

    /// Recoverable problems reported during execution.
    diagnostics: Vec<Diagnostic>,

    /// Indicates the reason why the last execution (via [`Simulator::run_while`] and adjacent)
    /// had paused.
    pause_condition: PauseCondition,

    // ------------------ CONFIG/DEBUG STATE ------------------
    // Calling [`Simulator::reset`] does not reset these values.

    /// The loaded program.
    program: Program,

    /// Configuration settings for the simulator.
    ///
    /// These are preserved between resets.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// Breakpoints for the simulator.
    pub breakpoints: HashSet<Breakpoint>,
}

impl Simulator {
    /// Creates a new simulator with the provided flags,
    /// but without a loaded program.
    pub fn new(flags: SimFlags) -> Self {
        Self {
            mem: Mem::new(),
            reg_file: RegFile::new(),
            pc: 0,
            instruction_count: 0,
            cycle_count: 0,
            visited: HashSet::new(),
            diagnostics: vec![],
            pause_condition: Default::default(),

            program: Program::empty(),
            flags,
            breakpoints: Default::default(),
        }
    }

    /// Resets the simulator.
    ///
    /// This resets the state of the `Simulator` back to before any execution calls,
    /// while preserving configuration and debug state.
    ///
    /// Note that this function preserves:
    /// - Flags
    /// - Breakpoints
    /// - The loaded program
    pub fn reset(&mut self) {
        let flags = self.flags;
        let breakpoints = std::mem::take(&mut self.breakpoints);
        let program = std::mem::take(&mut self.program);

        *self = Simulator::new(flags);
        self.breakpoints = breakpoints;
        self.program = program;
    }

    /// Loads a program into this simulator.
    ///
    /// This moves the PC to the start of the program and begins a new run for the repeat guard.
    /// The register file, memory and counters are left as they are.
    pub fn load_program(&mut self, program: &Program) {
        self.program = program.clone();
        self.pc = 0;
        self.visited.clear();
        self.pause_condition = Default::default();
        log::debug!("loaded program with {} instructions", program.len());
    }

    /// Gets a reference to the loaded program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Recoverable problems reported since the simulator was created or reset.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Indicates whether the last execution of the simulator hit a breakpoint.
    pub fn hit_breakpoint(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Breakpoint)
    }

    /// Indicates whether the last execution of the simulator halted,
    /// either by reaching the end of the program or by tripping the repeat guard.
    pub fn hit_halt(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Halt(_))
    }

    /// The reason the last execution halted, if it did.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.pause_condition {
            PauseCondition::Halt(reason) => Some(reason),
            _ => None
        }
    }

    /// Takes a snapshot of the current state for reporting.
    pub fn report(&self) -> Report {
        let mut registers = [0; crate::ast::NUM_REGS];
        registers.copy_from_slice(self.reg_file.as_slice());

        Report {
            registers,
            memory_hex: self.mem.to_hex(),
            instruction_count: self.instruction_count,
            cycle_count: self.cycle_count,
        }
    }

    fn diagnose(&mut self, diag: Diagnostic) {
        log::warn!("{diag}");
        self.diagnostics.push(diag);
    }

    /// Looks up a jump target for `J`/`JAL`, reporting it if it does not exist.
    fn jump_target(&mut self, label: String) -> Option<usize> {
        let target = self.program.labels().lookup(&label);
        if target.is_none() {
            let pc = self.pc;
            self.diagnose(Diagnostic::UnknownLabel { pc, label });
        }
        target
    }

    /// Runs until the tripwire condition returns false (or any of the typical breaks occur).
    ///
    /// The typical break conditions are:
    /// - the program halts
    /// - A breakpoint matches
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<(), SimErr> {
        std::mem::take(&mut self.pause_condition);

        // event loop
        // run until:
        // 1. the program halts
        // 2. the tripwire condition returns false
        // 3. any of the breakpoints are hit
        let result = loop {
            // Tripwire turned off:
            if !tripwire(self) {
                break Ok(PauseCondition::Tripwire);
            }

            // Run a step:
            match self.step() {
                Ok(()) => {},
                Err(StepBreak::Halt(reason)) => break Ok(PauseCondition::Halt(reason)),
                Err(StepBreak::Err(e)) => break Err(e)
            }

            // After executing, check that any breakpoints were hit.
            if self.breakpoints.iter().any(|bp| bp.check(self)) {
                break Ok(PauseCondition::Breakpoint);
            }
        };

        self.pause_condition = result?;
        Ok(())
    }

    /// Execute the program.
    ///
    /// This blocks until the program halts or a breakpoint is hit.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self) -> Result<(), SimErr> {
        self.run_while(|_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program ends or until the number of steps to execute has been hit.
    /// Steps that do not count as an executed instruction (empty instructions) still count toward the limit.
    pub fn run_with_limit(&mut self, max_steps: u64) -> Result<(), SimErr> {
        let mut steps = 0;
        self.run_while(|_| {
            steps += 1;
            steps <= max_steps
        })
    }

    /// Simulate one step, executing one instruction.
    ///
    /// This function is a library function and should be used when one step is needed.
    /// The difference between this function and [`Simulator::step_in`] is that this
    /// function returns [`StepBreak::Halt`] as an error,
    /// whereas `step_in` records it as the pause condition.
    fn step(&mut self) -> Result<(), StepBreak> {
        let pc = self.pc;
        let Some(text) = self.program.get(pc) else {
            log::info!("reached end of program at PC: {pc}");
            return Err(StepBreak::Halt(HaltReason::EndOfProgram));
        };

        if self.flags.loop_guard && !self.visited.insert(pc) {
            match self.program.labels().rev_lookup(pc) {
                Some(label) => log::warn!("Infinite loop detected at PC: {pc} ({label}), stopping execution."),
                None => log::warn!("Infinite loop detected at PC: {pc}, stopping execution."),
            }
            return Err(StepBreak::Halt(HaltReason::RepeatedPc(pc)));
        }

        log::info!("PC: {pc}, Executing: {text}");
        let decoded = match Instr::decode(text) {
            // Nothing to execute. The PC stays put, so the repeat guard stops on the next step.
            Err(DecodeErr::EmptyInstruction) => {
                log::debug!("empty instruction at PC: {pc}");
                return Ok(());
            },
            decoded => decoded,
        };

        self.instruction_count = self.instruction_count.wrapping_add(1);
        self.cycle_count = self.cycle_count.wrapping_add(1);

        match decoded {
            Ok(instr) => self.execute(instr),
            Err(DecodeErr::RegOutOfRange(reg)) => Err(SimErr::RegOutOfRange(reg).into()),
            Err(err) => {
                let instr = self.program.instructions()[pc].clone();
                self.diagnose(Diagnostic::DecodeFailed { pc, instr, err });
                self.pc += 1;
                Ok(())
            }
        }
    }

    fn execute(&mut self, instr: Instr) -> Result<(), StepBreak> {
        match instr {
            Instr::ADD(rd, rs1, rs2) => {
                self.reg_file[rd] = self.reg_file[rs1].wrapping_add(self.reg_file[rs2]);
                self.pc += 1;
            },
            Instr::SUB(rd, rs1, rs2) => {
                self.reg_file[rd] = self.reg_file[rs1].wrapping_sub(self.reg_file[rs2]);
                self.pc += 1;
            },
            Instr::LI(rd, imm) => {
                self.reg_file[rd] = imm;
                self.pc += 1;
            },
            Instr::BEQ(rs1, rs2, label) => {
                if self.reg_file[rs1] == self.reg_file[rs2] {
                    // Only a taken branch needs its label.
                    self.pc = self.program.labels()
                        .lookup(&label)
                        .ok_or(SimErr::UnresolvedLabel(label))?;
                } else {
                    self.pc += 1;
                }
            },
            Instr::J(label) => {
                if let Some(target) = self.jump_target(label) {
                    self.pc = target;
                }
            },
            Instr::JAL(label) => {
                if let Some(target) = self.jump_target(label) {
                    self.reg_file[Reg::LINK] = i64::try_from(self.pc + 1).unwrap_or(i64::MAX);
                    self.pc = target;
                }
            },
        }

        Ok(())
    }

    /// Simulate one step, executing one instruction.
    ///
    /// If the program has halted, no instruction is executed
    /// and the halt is recorded (see [`Simulator::halt_reason`]).
    pub fn step_in(&mut self) -> Result<(), SimErr> {
        std::mem::take(&mut self.pause_condition);
        match self.step() {
            Ok(()) => Ok(()),
            Err(StepBreak::Halt(reason)) => {
                self.pause_condition = PauseCondition::Halt(reason);
                Ok(())
            },
            Err(StepBreak::Err(e)) => Err(e)
        }
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}
