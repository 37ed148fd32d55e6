//! Loading program text into an instruction sequence.
//!
//! The loader reads a program written in the following form:
//!
//! ```text
//! # comments and blank lines are skipped
//! program = [
//!     "LI x1, 5",
//!     "loop:",
//!     "ADD x2, x2, x1",
//!     "J loop",
//! ]
//! ```
//!
//! Only two things about the section opener matter: the line contains `program` and it contains `=`.
//! The surrounding list syntax is not checked. Quotes and commas in the body are stripped,
//! and a line consisting of only `]` ends the section.
//!
//! Lines ending in `:` define labels. The name is everything before the `:`, spaces included.
//! A label is bound to the index of the next instruction,
//! so labels do not take up an instruction slot.
//!
//! This module consists of:
//! - [`parse_program`]: the loader itself
//! - [`Program`]: the loaded instruction sequence and its labels
//! - [`LabelTable`]: the mapping from label names to instruction indices
//! - [`lex`]: the operand tokenizer used when instructions are decoded

pub mod lex;

use std::collections::HashMap;
use std::path::Path;

/// The mapping from label names to instruction indices.
///
/// This is built once while loading a program and is not modified during execution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>
}
impl LabelTable {
    /// Gets the instruction index a label is bound to (if it exists).
    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Gets a label bound to the given instruction index (if one exists).
    ///
    /// If multiple labels are bound to the index, the lexicographically first one is returned.
    pub fn rev_lookup(&self, index: usize) -> Option<&str> {
        self.labels.iter()
            .filter(|&(_, &i)| i == index)
            .map(|(label, _)| label.as_str())
            .min()
    }

    /// Gets an iterable of the labels and the indices they are bound to.
    pub fn iter(&self) -> impl Iterator<Item=(&str, usize)> + '_ {
        self.labels.iter()
            .map(|(label, &index)| (label.as_str(), index))
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn define(&mut self, label: &str, index: usize) {
        if let Some(prev) = self.labels.insert(label.to_string(), index) {
            log::debug!("label {label} redefined (index {prev} -> {index})");
        }
    }
}

/// A loaded program.
///
/// The instructions are kept as text and are decoded as the simulator fetches them.
/// The program counter is an index into [`Program::instructions`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<String>,
    labels: LabelTable
}
impl Program {
    /// Creates a program with no instructions or labels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads and loads a program from a file.
    ///
    /// Only reading the file can fail. Loading itself never fails.
    pub fn read_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let src = std::fs::read_to_string(path.as_ref())?;
        log::debug!("read {} bytes from {}", src.len(), path.as_ref().display());
        Ok(parse_program(&src))
    }

    /// The instruction text at the given index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.instructions.get(index).map(String::as_str)
    }

    /// The instruction sequence.
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// The label table.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether there are no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Loads program text into a [`Program`].
///
/// This never fails. Malformed instructions are kept as-is
/// and are reported when the simulator tries to decode them.
///
/// # Example
/// ```
/// use rv_lite::parse::parse_program;
///
/// let src = r#"
///     program = [
///         "start:",
///         "LI x1, 5",
///         "J start",
///         "end:",
///     ]
/// "#;
/// let program = parse_program(src);
///
/// assert_eq!(program.instructions(), ["LI x1 5", "J start"]);
/// assert_eq!(program.labels().lookup("start"), Some(0));
/// assert_eq!(program.labels().lookup("end"), Some(2));
/// ```
pub fn parse_program(src: &str) -> Program {
    let mut program = Program::empty();
    let mut parsing = false;

    for line in src.lines() {
        let line = line.trim();

        // skip empty lines and comments
        if line.is_empty() || line.starts_with('#') { continue; }

        if line.contains("program") && line.contains('=') {
            parsing = true;
            continue;
        }
        if line == "]" { break; }

        if parsing {
            let line = line.replace(['"', ','], "");
            let line = line.trim();

            match line.strip_suffix(':') {
                Some(label) => program.labels.define(label, program.instructions.len()),
                None => program.instructions.push(line.to_string()),
            }
        }
    }

    log::debug!("loaded {} instructions and {} labels", program.len(), program.labels.len());
    program
}

#[cfg(test)]
mod tests {
    use super::{parse_program, Program};

    #[test]
    fn test_empty() {
        assert_eq!(parse_program(""), Program::empty());
        assert_eq!(parse_program("   \n\t\n  "), Program::empty());

        // nothing is loaded before the section opener
        let program = parse_program("ADD x1, x2, x3\nloop:\n");
        assert!(program.is_empty());
        assert!(program.labels().is_empty());
    }

    #[test]
    fn test_basic() {
        let src = r#"
        # A comment before the program
        program = [
            "LI x1, 5",
            "LI x2, 7",

            # A comment inside the program
            "ADD x3, x1, x2",
        ]
        "#;
        let program = parse_program(src);
        assert_eq!(program.instructions(), ["LI x1 5", "LI x2 7", "ADD x3 x1 x2"]);
        assert_eq!(program.get(2), Some("ADD x3 x1 x2"));
        assert_eq!(program.get(3), None);
        assert!(program.labels().is_empty());
    }

    #[test]
    fn test_labels() {
        let src = r#"
        program = [
            "first:",
            "LI x1, 1",
            "middle:",
            "also_middle:",
            "LI x2, 2",
            "LI x3, 3",
            "last:",
        ]
        "#;
        let program = parse_program(src);
        assert_eq!(program.len(), 3);
        assert_eq!(program.labels().lookup("first"), Some(0));
        assert_eq!(program.labels().lookup("middle"), Some(1));
        assert_eq!(program.labels().lookup("also_middle"), Some(1));
        // label with no instruction after it points to the end of the program
        assert_eq!(program.labels().lookup("last"), Some(3));
        assert_eq!(program.labels().lookup("missing"), None);

        assert_eq!(program.labels().rev_lookup(0), Some("first"));
        assert_eq!(program.labels().rev_lookup(1), Some("also_middle"));
        assert_eq!(program.labels().rev_lookup(2), None);

        let mut labels: Vec<_> = program.labels().iter().collect();
        labels.sort();
        assert_eq!(labels, [("also_middle", 1), ("first", 0), ("last", 3), ("middle", 1)]);
    }

    #[test]
    fn test_label_redefinition() {
        let src = "program = [\nx:\nLI x1, 1\nx:\n]";
        let program = parse_program(src);
        assert_eq!(program.labels().lookup("x"), Some(1));
        assert_eq!(program.labels().len(), 1);
    }

    #[test]
    fn test_section_end() {
        let src = r#"
        program = [
            "LI x1, 1",
        ]
            "LI x2, 2",
        "#;
        let program = parse_program(src);
        assert_eq!(program.instructions(), ["LI x1 1"]);

        // `]` ends parsing even before the section is opened
        let src = "]\nprogram = [\nLI x1, 1\n]";
        assert!(parse_program(src).is_empty());

        // `]` must be alone on its line
        let src = "program = [\nLI x1, 1 ]\n]";
        assert_eq!(parse_program(src).instructions(), ["LI x1 1 ]"]);
    }

    #[test]
    fn test_opener_is_loose() {
        // anything with `program` and `=` opens the section, and it is never stored
        let src = "my_program=(\nLI x1, 1\nprogram =\nLI x2, 2\n]";
        let program = parse_program(src);
        assert_eq!(program.instructions(), ["LI x1 1", "LI x2 2"]);
    }

    #[test]
    fn test_unquoted_and_malformed() {
        let src = "program = [\n  start :  \nli x1 4\n  \"\",\nFOO 1 2\n]";
        let program = parse_program(src);
        // the name is taken verbatim, up to the colon
        assert_eq!(program.labels().lookup("start "), Some(0));
        assert_eq!(program.labels().lookup("start"), None);
        // malformed lines are stored, decoding reports them later
        assert_eq!(program.instructions(), ["li x1 4", "", "FOO 1 2"]);
    }

    #[test]
    fn test_crlf() {
        let src = "program = [\r\n\"LI x1, 1\",\r\n\"end:\",\r\n]\r\n";
        let program = parse_program(src);
        assert_eq!(program.instructions(), ["LI x1 1"]);
        assert_eq!(program.labels().lookup("end"), Some(1));
    }
}
