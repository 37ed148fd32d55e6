//! Components relating to decoded instructions.
//!
//! Instructions are kept as raw text in a [`Program`] and are decoded
//! into an [`Instr`] each time the simulator fetches them.
//!
//! This module consists of:
//! - [`Reg`]: a register index, checked to be between 0 and 31
//! - [`Instr`]: a decoded instruction
//! - [`DecodeErr`]: the reasons an instruction line can fail to decode
//!
//! [`Program`]: crate::parse::Program

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::parse::lex::{lex_word, Ident, LexErr, Token};

/// The number of registers in the register file.
pub const NUM_REGS: usize = 32;

/// A register. Must be between 0 and 31.
///
/// This `Reg` struct can either be constructed by selecting a register from [`reg_consts`],
/// or by using [`Reg::try_from`].
///
/// ## Examples
///
/// ```text
/// ADD x3, x1, x2
///     ~~  ~~  ~~
/// LI x1, 5
///    ~~
/// BEQ x0, x0, end
///     ~~  ~~
/// ```
///
/// Registers may also be written as bare integers (`ADD 3, 1, 2`).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Reg(pub(crate) u8);

/// Register constants!
pub mod reg_consts {
    use super::Reg;

    /// The zero register. It is not hardwired to zero in this machine.
    pub const X0: Reg = Reg(0);
    /// The link register, written by `JAL`.
    pub const X31: Reg = Reg(31);
}
impl Reg {
    /// The link register, written by `JAL`.
    pub const LINK: Reg = reg_consts::X31;

    /// Gets the register number of this [`Reg`]. This is always between 0 and 31.
    pub fn reg_no(self) -> u8 {
        self.0
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}
impl From<Reg> for usize {
    // Used for indexing the reg file.
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}
impl TryFrom<i64> for Reg {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).ok()
            .filter(|&r| usize::from(r) < NUM_REGS)
            .map(Reg)
            .ok_or(())
    }
}

/// The kind of value an operand position accepts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OperandKind {
    /// A register index (`x3` or `3`).
    Register,
    /// A signed integer immediate.
    Immediate,
}
impl std::fmt::Display for OperandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandKind::Register  => f.write_str("register"),
            OperandKind::Immediate => f.write_str("integer"),
        }
    }
}

/// A decoded instruction.
///
/// Branch and jump targets are kept as label names.
/// They are only resolved against the label table when the jump is performed.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Instr {
    /// `rd <- rs1 + rs2`
    ADD(Reg, Reg, Reg),
    /// `rd <- rs1 - rs2`
    SUB(Reg, Reg, Reg),
    /// `rd <- imm`
    LI(Reg, i64),
    /// Branch to the label if `rs1 == rs2`.
    BEQ(Reg, Reg, String),
    /// Jump to the label.
    J(String),
    /// Jump to the label, saving the return index in the link register.
    JAL(String),
}

impl Instr {
    /// Decodes one line of instruction text.
    ///
    /// Commas are removed and the line is split on whitespace.
    /// The first word is the opcode (case-insensitive), the rest are operands.
    ///
    /// ```
    /// use rv_lite::ast::Instr;
    ///
    /// let instr = Instr::decode("add x3, x1, x2").unwrap();
    /// assert_eq!(instr.to_string(), "ADD x3, x1, x2");
    ///
    /// assert!(Instr::decode("FOO 1 2").is_err());
    /// ```
    pub fn decode(text: &str) -> Result<Self, DecodeErr> {
        let cleaned = text.replace(',', "");
        let mut words = cleaned.split_whitespace();

        let Some(op_word) = words.next() else {
            return Err(DecodeErr::EmptyInstruction);
        };
        let operands: Vec<&str> = words.collect();

        let opcode = match lex_word(op_word) {
            Ok(Token::Ident(id)) => id,
            _ => return Err(DecodeErr::UnknownOpcode(op_word.to_string())),
        };

        let instr = match opcode {
            Ident::ADD => {
                let [rd, rs1, rs2] = take_operands::<3>(&opcode, &operands)?;
                Instr::ADD(reg_operand(rd)?, reg_operand(rs1)?, reg_operand(rs2)?)
            },
            Ident::SUB => {
                let [rd, rs1, rs2] = take_operands::<3>(&opcode, &operands)?;
                Instr::SUB(reg_operand(rd)?, reg_operand(rs1)?, reg_operand(rs2)?)
            },
            Ident::LI => {
                let [rd, imm] = take_operands::<2>(&opcode, &operands)?;
                Instr::LI(reg_operand(rd)?, imm_operand(imm)?)
            },
            Ident::BEQ => {
                let [rs1, rs2, label] = take_operands::<3>(&opcode, &operands)?;
                Instr::BEQ(reg_operand(rs1)?, reg_operand(rs2)?, label.to_string())
            },
            Ident::J => {
                let [label] = take_operands::<1>(&opcode, &operands)?;
                Instr::J(label.to_string())
            },
            Ident::JAL => {
                let [label] = take_operands::<1>(&opcode, &operands)?;
                Instr::JAL(label.to_string())
            },
            Ident::Label(_) => return Err(DecodeErr::UnknownOpcode(op_word.to_string())),
        };

        Ok(instr)
    }

    /// The label this instruction may transfer control to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Instr::BEQ(_, _, label) | Instr::J(label) | Instr::JAL(label) => Some(label),
            Instr::ADD(..) | Instr::SUB(..) | Instr::LI(..) => None,
        }
    }
}
impl std::fmt::Display for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ADD(rd, rs1, rs2) => write!(f, "ADD {rd}, {rs1}, {rs2}"),
            Self::SUB(rd, rs1, rs2) => write!(f, "SUB {rd}, {rs1}, {rs2}"),
            Self::LI(rd, imm)       => write!(f, "LI {rd}, {imm}"),
            Self::BEQ(rs1, rs2, l)  => write!(f, "BEQ {rs1}, {rs2}, {l}"),
            Self::J(l)              => write!(f, "J {l}"),
            Self::JAL(l)            => write!(f, "JAL {l}"),
        }
    }
}

fn take_operands<'a, const N: usize>(opcode: &Ident, operands: &[&'a str]) -> Result<[&'a str; N], DecodeErr> {
    <[&str; N]>::try_from(operands)
        .map_err(|_| DecodeErr::WrongArity {
            opcode: opcode.to_string(),
            expected: N,
            found: operands.len()
        })
}
fn reg_operand(word: &str) -> Result<Reg, DecodeErr> {
    let index = match lex_word(word) {
        Ok(Token::Reg(r)) => i64::try_from(r).unwrap_or(i64::MAX),
        Ok(Token::Int(n)) => n,
        Ok(Token::Ident(_)) => return Err(DecodeErr::invalid_operand(word, OperandKind::Register, None)),
        Err(e) => return Err(DecodeErr::invalid_operand(word, OperandKind::Register, Some(e))),
    };

    Reg::try_from(index)
        .map_err(|_| DecodeErr::RegOutOfRange(word.to_string()))
}
fn imm_operand(word: &str) -> Result<i64, DecodeErr> {
    match lex_word(word) {
        Ok(Token::Int(n)) => Ok(n),
        Ok(_) => Err(DecodeErr::invalid_operand(word, OperandKind::Immediate, None)),
        Err(e) => Err(DecodeErr::invalid_operand(word, OperandKind::Immediate, Some(e))),
    }
}

/// Any errors raised in attempting to decode an instruction line.
///
/// All of these except [`DecodeErr::RegOutOfRange`] are recoverable:
/// the simulator reports them and moves on to the next instruction.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum DecodeErr {
    /// The instruction line had no words in it.
    ///
    /// The simulator does not advance past an empty instruction.
    #[error("empty instruction")]
    EmptyInstruction,
    /// The opcode is not one of the supported opcodes.
    #[error("unsupported opcode {0}")]
    UnknownOpcode(String),
    /// The opcode was given the wrong number of operands.
    #[error("{opcode} expects {expected} operand(s), found {found}")]
    WrongArity {
        /// The opcode being decoded.
        opcode: String,
        /// The number of operands it takes.
        expected: usize,
        /// The number of operands it was given.
        found: usize
    },
    /// An operand could not be interpreted as the kind of value its position requires.
    #[error("expected {expected} operand, found {operand:?}")]
    InvalidOperand {
        /// The text of the operand.
        operand: String,
        /// The kind of value expected.
        expected: OperandKind,
        /// Why the operand failed to lex, if it did.
        #[source]
        cause: Option<LexErr>
    },
    /// A register operand is well-formed, but does not name one of the 32 registers.
    #[error("register {0} is out of range")]
    RegOutOfRange(String),
}
impl DecodeErr {
    fn invalid_operand(operand: &str, expected: OperandKind, cause: Option<LexErr>) -> Self {
        Self::InvalidOperand { operand: operand.to_string(), expected, cause }
    }

    /// Whether the simulator can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DecodeErr::RegOutOfRange(_))
    }
}
impl crate::err::Error for DecodeErr {
    fn help(&self) -> Option<Cow<'_, str>> {
        match self {
            DecodeErr::EmptyInstruction => Some("remove the empty entry from the program".into()),
            DecodeErr::UnknownOpcode(_) => Some("supported opcodes are ADD, SUB, LI, BEQ, J, JAL".into()),
            DecodeErr::WrongArity { .. } => None,
            DecodeErr::InvalidOperand { expected, cause, .. } => {
                let mut help = match expected {
                    OperandKind::Register  => String::from("a register is written as x0-x31 or 0-31"),
                    OperandKind::Immediate => String::from("an immediate is a decimal integer"),
                };
                if let Some(cause) = cause.as_ref().and_then(<LexErr as crate::err::Error>::help) {
                    let _ = write!(help, " ({cause})");
                }
                Some(help.into())
            },
            DecodeErr::RegOutOfRange(_) => Some(format!("there are only {NUM_REGS} registers, x0-x{}", NUM_REGS - 1).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeErr, Instr, OperandKind, Reg};
    use crate::err::LexErr;

    fn r(n: u8) -> Reg {
        Reg::try_from(i64::from(n)).unwrap()
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(Instr::decode("ADD x3, x1, x2"), Ok(Instr::ADD(r(3), r(1), r(2))));
        assert_eq!(Instr::decode("SUB x4, x4, x0"), Ok(Instr::SUB(r(4), r(4), r(0))));
        assert_eq!(Instr::decode("LI x1, -5"), Ok(Instr::LI(r(1), -5)));
        assert_eq!(Instr::decode("BEQ x1, x2, end"), Ok(Instr::BEQ(r(1), r(2), "end".to_string())));
        assert_eq!(Instr::decode("J loop"), Ok(Instr::J("loop".to_string())));
        assert_eq!(Instr::decode("JAL sub"), Ok(Instr::JAL("sub".to_string())));
    }

    #[test]
    fn test_decode_syntax_variants() {
        // commas are optional, opcodes are case-insensitive
        assert_eq!(Instr::decode("add x3 x1 x2"), Ok(Instr::ADD(r(3), r(1), r(2))));
        assert_eq!(Instr::decode("  Li   x7,,  +12 "), Ok(Instr::LI(r(7), 12)));
        // bare integer registers
        assert_eq!(Instr::decode("ADD 3, 1, 2"), Ok(Instr::ADD(r(3), r(1), r(2))));
        assert_eq!(Instr::decode("li X31, 0"), Ok(Instr::LI(Reg::LINK, 0)));
        // labels are taken raw, even if they look numeric
        assert_eq!(Instr::decode("J 12"), Ok(Instr::J("12".to_string())));
        assert_eq!(Instr::decode("BEQ x0 x0 x1"), Ok(Instr::BEQ(r(0), r(0), "x1".to_string())));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(Instr::decode(""), Err(DecodeErr::EmptyInstruction));
        assert_eq!(Instr::decode(" , "), Err(DecodeErr::EmptyInstruction));
        assert_eq!(Instr::decode("FOO 1 2"), Err(DecodeErr::UnknownOpcode("FOO".to_string())));
        assert_eq!(Instr::decode("12 x1"), Err(DecodeErr::UnknownOpcode("12".to_string())));
        assert_eq!(
            Instr::decode("ADD x1, x2"),
            Err(DecodeErr::WrongArity { opcode: "ADD".to_string(), expected: 3, found: 2 })
        );
        assert_eq!(
            Instr::decode("J a b"),
            Err(DecodeErr::WrongArity { opcode: "J".to_string(), expected: 1, found: 2 })
        );
        assert_eq!(
            Instr::decode("LI x1, five"),
            Err(DecodeErr::InvalidOperand { operand: "five".to_string(), expected: OperandKind::Immediate, cause: None })
        );
        assert_eq!(
            Instr::decode("LI x1, 5q"),
            Err(DecodeErr::InvalidOperand { operand: "5q".to_string(), expected: OperandKind::Immediate, cause: Some(LexErr::InvalidNumeric) })
        );
        assert_eq!(
            Instr::decode("ADD x1, x2, y"),
            Err(DecodeErr::InvalidOperand { operand: "y".to_string(), expected: OperandKind::Register, cause: None })
        );
        assert_eq!(
            Instr::decode("LI x2, x3"),
            Err(DecodeErr::InvalidOperand { operand: "x3".to_string(), expected: OperandKind::Immediate, cause: None })
        );
    }

    #[test]
    fn test_reg_range() {
        assert_eq!(Instr::decode("LI x31, 1"), Ok(Instr::LI(r(31), 1)));

        let err = Instr::decode("LI x32, 1").unwrap_err();
        assert_eq!(err, DecodeErr::RegOutOfRange("x32".to_string()));
        assert!(!err.is_recoverable());

        assert_eq!(Instr::decode("ADD -1, x0, x0"), Err(DecodeErr::RegOutOfRange("-1".to_string())));
        assert_eq!(Instr::decode("SUB x1, x0, 99"), Err(DecodeErr::RegOutOfRange("99".to_string())));
        assert!(Instr::decode("FOO").unwrap_err().is_recoverable());
    }

    #[test]
    fn test_display() {
        let instr = Instr::decode("beq 1, 2, done").unwrap();
        assert_eq!(instr.to_string(), "BEQ x1, x2, done");
        assert_eq!(instr.target(), Some("done"));
        assert_eq!(Instr::decode("li x1 3").unwrap().target(), None);
    }
}
