//! Token kinds and the token value type.

use std::fmt;
use std::sync::Arc;
use super::declarations::Declaration;

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum TokenKind {
    NewLine,
    /// `$` directive including the word, e.g. `$INCLUDE`
    Dollar,
    Hash,
    /// symbol declaration marker
    At,
    /// label declaration marker, also closes `#name<expr>`
    Gts,
    LogicalOr,
    LogicalAnd,
    Address,
    /// address whose number lacks an integer or fraction part, e.g. `X1.`
    AddressPartial,
    Number,
    String,
    BadString,
    UnquotedString,
    LBracket,
    RBracket,
    LAngle,
    Symbol,
    /// bare single letter
    Parameter,
    /// `O` program header
    Prog,
    /// `N` sequence marker
    Sequence,
    Ffunc,
    Fcmd,
    KeyWord,
    Ampersand,
    Comment,
    Whitespace,
    Delim,
    Eof
}

#[derive(Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// offset into the source text, for substituted tokens this is the offset of the symbol
    pub offset: usize,
    pub len: usize,
    /// offset into the program text, assigned when the token is consumed
    pub prog_offset: usize,
    pub prog_len: usize,
    /// declaration this token was expanded from
    pub decl: Option<Arc<Declaration>>,
    pub leading_space: bool,
    /// declared symbol found inside a substitution, left unexpanded
    pub nested: bool
}

impl Token {
    pub fn new(kind: TokenKind,text: &str,offset: usize,len: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            offset,
            len,
            prog_offset: 0,
            prog_len: 0,
            decl: None,
            leading_space: false,
            nested: false
        }
    }
    pub fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof,"",offset,0)
    }
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
    pub fn is(&self,kind: TokenKind) -> bool {
        self.kind == kind
    }
    /// keyword test, `kw` must be lower case
    pub fn is_keyword(&self,kw: &str) -> bool {
        self.kind == TokenKind::KeyWord && self.text.to_lowercase() == kw
    }
    /// single character delimiter test
    pub fn is_delim(&self,c: char) -> bool {
        self.kind == TokenKind::Delim && self.text.len() == 1 && self.text.starts_with(c)
    }
    /// true for tokens that end a statement
    pub fn is_line_end(&self) -> bool {
        matches!(self.kind,TokenKind::NewLine | TokenKind::Eof)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{:?}({:?})@{}+{}",self.kind,self.text,self.offset,self.len)?;
        if let Some(decl) = &self.decl {
            write!(f," via {}",decl.name)?;
        }
        Ok(())
    }
}
