//! Error interface for this crate.
//!
//! Every error this crate can raise implements [`Error`],
//! which extends [`std::error::Error`] with an optional help message
//! that can be shown to the author of the program being simulated.
//!
//! The error types themselves live next to the code that raises them,
//! and are re-exported here for convenience:
//! - [`LexErr`]: an operand word could not be tokenized
//! - [`DecodeErr`]: an instruction line could not be decoded
//! - [`SimErr`]: the simulator hit a fatal fault
use std::borrow::Cow;

pub use crate::ast::DecodeErr;
pub use crate::parse::lex::LexErr;
pub use crate::sim::SimErr;

/// Unified error interface for all errors in this crate.
pub trait Error: std::error::Error {
    /// A clarifying message to help aid someone in how to fix the problem.
    fn help(&self) -> Option<Cow<'_, str>>;
}
