//! Static language tables: keywords and builtin function/command signatures.
//!
//! These are immutable and shared by every parse.  Names are stored in lower case,
//! lookups are case-insensitive.

pub struct Keyword {
    pub name: &'static str,
    /// a digit may immediately follow, as in `GOTO10` or `END1`
    pub numeric_operand: bool
}

/// Ordered longest first so that `ENDIF` is tried before `END`.
pub const KEYWORDS: [Keyword;18] = [
    Keyword { name: "endif", numeric_operand: false },
    Keyword { name: "while", numeric_operand: false },
    Keyword { name: "then", numeric_operand: false },
    Keyword { name: "else", numeric_operand: false },
    Keyword { name: "goto", numeric_operand: true },
    Keyword { name: "and", numeric_operand: true },
    Keyword { name: "end", numeric_operand: true },
    Keyword { name: "mod", numeric_operand: true },
    Keyword { name: "xor", numeric_operand: true },
    Keyword { name: "do", numeric_operand: true },
    Keyword { name: "eq", numeric_operand: true },
    Keyword { name: "ne", numeric_operand: true },
    Keyword { name: "le", numeric_operand: true },
    Keyword { name: "ge", numeric_operand: true },
    Keyword { name: "lt", numeric_operand: true },
    Keyword { name: "gt", numeric_operand: true },
    Keyword { name: "if", numeric_operand: false },
    Keyword { name: "or", numeric_operand: true }
];

/// Parts of a builtin call shape.
#[derive(Clone,Copy,PartialEq,Debug)]
pub enum SigPart {
    /// `[`
    Open,
    /// `]`
    Close,
    /// the signature's delimiter character
    Delim,
    /// an expression
    Param,
    /// raw text interleaved with `#var[fmt]` escapes, up to the closing bracket
    Text
}

pub struct Signature {
    pub delimiter: Option<char>,
    pub parts: &'static [SigPart]
}

pub struct Builtin {
    pub name: &'static str,
    /// commands are statements, functions are expressions
    pub command: bool,
    /// alternatives, tried in order
    pub signatures: &'static [Signature]
}

use SigPart::*;

const ONE: Signature = Signature { delimiter: None, parts: &[Open,Param,Close] };
const TWO: Signature = Signature { delimiter: Some(','), parts: &[Open,Param,Delim,Param,Close] };
const SLASH: Signature = Signature { delimiter: Some('/'), parts: &[Open,Param,Close,Delim,Open,Param,Close] };
const PRINT: Signature = Signature { delimiter: None, parts: &[Open,Text,Close] };
const BARE: Signature = Signature { delimiter: None, parts: &[] };
const NAMES: Signature = Signature { delimiter: Some(','), parts: &[Param,Open,Text,Close] };

pub const BUILTINS: [Builtin;23] = [
    Builtin { name: "sin", command: false, signatures: &[ONE] },
    Builtin { name: "cos", command: false, signatures: &[ONE] },
    Builtin { name: "tan", command: false, signatures: &[ONE] },
    Builtin { name: "asin", command: false, signatures: &[ONE] },
    Builtin { name: "acos", command: false, signatures: &[ONE] },
    Builtin { name: "atan", command: false, signatures: &[SLASH,TWO,ONE] },
    Builtin { name: "sqrt", command: false, signatures: &[ONE] },
    Builtin { name: "sqr", command: false, signatures: &[ONE] },
    Builtin { name: "abs", command: false, signatures: &[ONE] },
    Builtin { name: "bin", command: false, signatures: &[ONE] },
    Builtin { name: "bcd", command: false, signatures: &[ONE] },
    Builtin { name: "round", command: false, signatures: &[ONE] },
    Builtin { name: "fix", command: false, signatures: &[ONE] },
    Builtin { name: "fup", command: false, signatures: &[ONE] },
    Builtin { name: "ln", command: false, signatures: &[ONE] },
    Builtin { name: "exp", command: false, signatures: &[ONE] },
    Builtin { name: "pow", command: false, signatures: &[TWO] },
    Builtin { name: "adp", command: false, signatures: &[ONE] },
    Builtin { name: "prm", command: false, signatures: &[SLASH,TWO,ONE] },
    Builtin { name: "dprnt", command: true, signatures: &[PRINT] },
    Builtin { name: "bprnt", command: true, signatures: &[PRINT] },
    Builtin { name: "popen", command: true, signatures: &[BARE] },
    Builtin { name: "pclos", command: true, signatures: &[BARE] }
];

/// `SETVN` is kept apart because its shape starts with a parameter.
pub const SETVN: Builtin = Builtin { name: "setvn", command: true, signatures: &[NAMES] };

/// Builtin function or command with this (case-insensitive) name
pub fn builtin(name: &str) -> Option<&'static Builtin> {
    let lower = name.to_lowercase();
    if lower == SETVN.name {
        return Some(&SETVN);
    }
    BUILTINS.iter().find(|b| b.name == lower)
}

/// true if `c` can continue an identifier
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
