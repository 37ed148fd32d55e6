//! A loader and simulator for a small, text-assembled subset of RISC-V.
//!
//! Programs are written as a list of instruction strings and labels.
//! The supported instructions are `ADD`, `SUB`, `LI`, `BEQ`, `J` and `JAL`,
//! operating on 32 signed 64-bit registers.
//!
//! # Usage
//!
//! A program is loaded from its text and executed with the simulator:
//! ```
//! use rv_lite::parse::parse_program;
//! use rv_lite::sim::Simulator;
//!
//! let code = r#"
//!     program = [
//!         "LI x1, 5",
//!         "LI x2, 7",
//!         "ADD x3, x1, x2",
//!         "BEQ x3, x0, end",
//!         "SUB x4, x3, x1",
//!         "end:",
//!     ]
//! "#;
//! let program = parse_program(code);
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load_program(&program);
//! simulator.run().unwrap(); // <-- Result can be handled accordingly
//!
//! println!("{}", simulator.report());
//! ```
//!
//! If more granularity is needed for simulation, there are also step-in and bounded run functions.
//! See the [`sim`] module for more details.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod sim;
pub mod err;
