//! Tokenizing instruction operands.
//!
//! This module holds the tokens that make up a single word of an instruction
//! line ([`Token`]). The decoder lexes every word of an instruction
//! (after commas have been stripped and the line has been split on whitespace)
//! to figure out whether that word is a register, an integer, or an identifier.
//!
//! Label operands are never lexed. They are taken as raw text by the decoder.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// A unit of information in an instruction word.
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t]+", error = LexErr)]
pub enum Token {
    // Note, these regexes span over tokens that are technically invalid
    // (e.g., 23trst matches for an integer even though it shouldn't).
    // This is intended.
    // These regexes collect what would be considered one discernable unit
    // and validates it using the validator function.

    /// A signed decimal integer (e.g., `9`, `-14`, `+7`)
    #[regex(r"\d\w*", lex_int)]
    #[regex(r"[+-]\w*", lex_int)]
    Int(i64),

    /// A register (e.g., `x0`, `X31`).
    ///
    /// The index is not range-checked here,
    /// so that the decoder can report an out-of-range register
    /// separately from a malformed one.
    #[regex(r"[Xx]\d\w*", lex_reg, priority = 5)]
    Reg(u64),

    /// An identifier.
    ///
    /// This can refer to either:
    /// - an opcode (e.g. `ADD`, `BEQ`, `JAL`)
    /// - a label (e.g., `loop`, `end`, `sub_1`)
    ///
    /// Opcodes are case-insensitive.
    #[regex(r"[A-Za-z_][\w.]*", |lx| Ident::from_word(lx.slice()))]
    Ident(Ident),
}

macro_rules! ident_enum {
    ($($instr:ident),+) => {
        /// An opcode, or any other word (a label).
        #[derive(Debug, PartialEq, Eq, Hash, Clone)]
        pub enum Ident {
            $(
                #[allow(missing_docs)]
                $instr
            ),+,
            #[allow(missing_docs)]
            Label(String)
        }

        impl Ident {
            /// Classifies a word as an opcode or a label.
            pub fn from_word(s: &str) -> Self {
                match &*s.to_uppercase() {
                    $(stringify!($instr) => Self::$instr),*,
                    _ => Self::Label(s.to_string())
                }
            }

            /// Whether this identifier names a supported opcode.
            pub fn is_opcode(&self) -> bool {
                !matches!(self, Self::Label(_))
            }
        }

        impl std::fmt::Display for Ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$instr => f.write_str(stringify!($instr))),*,
                    Self::Label(id) => f.write_str(id)
                }
            }
        }
    };
}
ident_enum! {
    ADD, SUB, LI, BEQ, J, JAL
}

/// Any errors raised in attempting to tokenize an operand word.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, thiserror::Error)]
pub enum LexErr {
    /// Numeric literal cannot fit within the range of an i64
    #[error("numeric token does not fit 64-bit signed integer")]
    DoesNotFitI64,
    /// Numeric literal could not be parsed as a decimal literal because it has invalid digits (i.e., not 0-9)
    #[error("invalid decimal literal")]
    InvalidNumeric,
    /// Numeric literal could not be parsed because there are no digits in it (it's just `+` or `-`)
    #[error("invalid decimal literal")]
    InvalidDecEmpty,
    /// Int parsing failed but the reason why is unknown
    #[error("could not parse integer")]
    UnknownIntErr,
    /// Token had the format x\d, but the rest of it isn't a decimal number.
    #[error("invalid register")]
    InvalidReg,
    /// A symbol was used which cannot appear in an operand
    #[default]
    #[error("unrecognized symbol")]
    InvalidSymbol
}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            LexErr::DoesNotFitI64   => Some(format!("the range for a 64-bit signed integer is [{}, {}]", i64::MIN, i64::MAX).into()),
            LexErr::InvalidNumeric  => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidDecEmpty => Some("there should be digits (0-9) here".into()),
            LexErr::UnknownIntErr   => None,
            LexErr::InvalidReg      => Some("a register is written as x0-x31".into()),
            LexErr::InvalidSymbol   => Some("this char does not occur in any operand".into()),
        }
    }
}

/// Lexes a single word, which must consist of exactly one token.
pub(crate) fn lex_word(word: &str) -> Result<Token, LexErr> {
    let mut lx = Token::lexer(word);
    let token = lx.next().unwrap_or(Err(LexErr::InvalidSymbol))?;
    match lx.next() {
        None => Ok(token),
        // anything trailing the first token makes the word malformed
        Some(_) => Err(LexErr::InvalidSymbol),
    }
}

fn lex_int(lx: &Lexer<'_, Token>) -> Result<i64, LexErr> {
    let string = lx.slice();

    string.parse::<i64>()
        .map_err(|e| match e.kind() {
            IntErrorKind::Empty        => LexErr::InvalidDecEmpty,
            IntErrorKind::InvalidDigit if matches!(string, "-" | "+") => LexErr::InvalidDecEmpty,
            IntErrorKind::InvalidDigit => LexErr::InvalidNumeric,
            IntErrorKind::PosOverflow  => LexErr::DoesNotFitI64,
            IntErrorKind::NegOverflow  => LexErr::DoesNotFitI64,
            _ => LexErr::UnknownIntErr,
        })
}
fn lex_reg(lx: &Lexer<'_, Token>) -> Result<u64, LexErr> {
    let digits = lx.slice().strip_prefix(['X', 'x']).ok_or(LexErr::InvalidReg)?;

    match digits.parse::<u64>() {
        Ok(n) => Ok(n),
        // Overly large but well-formed register, saturate so it fails the range check
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(_) => Err(LexErr::InvalidReg),
    }
}
