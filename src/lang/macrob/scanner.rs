//! Context sensitive scanner.
//!
//! The scanner turns characters into tokens one at a time.  It holds only its modes,
//! the position lives in the `CharStream` it is handed, so the same scanner can serve
//! the primary stream and any substitution frame.  Token offsets are relative to the
//! stream being scanned; the substitution layer remaps them.

use super::stream::{CharStream,SENTINEL};
use super::token::{Token,TokenKind};
use super::handbook::{self,is_ident_char};

/// closing characters that may follow `(` and then become part of the terminator
const QUOTES: [char;3] = ['\'','"','*'];

#[derive(Clone,Copy,PartialEq,Debug)]
pub struct Scanner {
    /// symbols, keywords and addresses are recognized, otherwise raw text runs
    pub symbolic: bool,
    /// inside a builtin argument list, `(` does not start a string
    pub in_function: bool,
    pub skip_whitespace: bool,
    pub skip_comments: bool,
    pub skip_newlines: bool
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn starts_number(cs: &CharStream,offset: usize) -> bool {
    cs.peek(offset).is_ascii_digit() || (cs.peek(offset) == '.' && cs.peek(offset+1).is_ascii_digit())
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            symbolic: true,
            in_function: false,
            skip_whitespace: true,
            skip_comments: true,
            skip_newlines: false
        }
    }
    /// Produce the next token.  At end of input this keeps returning `Eof`.
    pub fn scan(&self,cs: &mut CharStream) -> Token {
        let mut leading_space = false;
        loop {
            let start = cs.pos();
            let c = cs.peek(0);
            if is_space(c) {
                cs.advance_while(is_space);
                if self.skip_whitespace {
                    leading_space = true;
                    continue;
                }
                return self.token(cs,TokenKind::Whitespace,start);
            }
            if c == ';' {
                cs.advance_while(|c| c != '\n');
                if self.skip_comments {
                    leading_space = true;
                    continue;
                }
                return self.token(cs,TokenKind::Comment,start);
            }
            if c == '\n' && self.skip_newlines {
                cs.advance(1);
                leading_space = true;
                continue;
            }
            let mut tok = match self.symbolic {
                true => self.scan_symbolic(cs),
                false => self.scan_raw(cs)
            };
            tok.leading_space = leading_space;
            return tok;
        }
    }
    fn token(&self,cs: &CharStream,kind: TokenKind,start: usize) -> Token {
        Token::new(kind,&cs.substring(start,cs.pos()),start,cs.pos()-start)
    }
    fn single(&self,cs: &mut CharStream,kind: TokenKind) -> Token {
        let start = cs.pos();
        cs.advance(1);
        self.token(cs,kind,start)
    }
    /// tokens common to both modes, or None
    fn scan_common(&self,cs: &mut CharStream) -> Option<Token> {
        let start = cs.pos();
        match cs.peek(0) {
            SENTINEL if cs.at_end() => Some(Token::eof(start)),
            '\n' => Some(self.single(cs,TokenKind::NewLine)),
            '#' => Some(self.single(cs,TokenKind::Hash)),
            '[' => Some(self.single(cs,TokenKind::LBracket)),
            ']' => Some(self.single(cs,TokenKind::RBracket)),
            ',' => Some(self.single(cs,TokenKind::Delim)),
            _ => None
        }
    }
    fn scan_raw(&self,cs: &mut CharStream) -> Token {
        if let Some(tok) = self.scan_common(cs) {
            return tok;
        }
        let start = cs.pos();
        cs.advance_while(|c| !is_space(c) && !"\n#[],;".contains(c) && c != SENTINEL);
        if cs.pos() == start {
            return self.single(cs,TokenKind::Delim);
        }
        self.token(cs,TokenKind::UnquotedString,start)
    }
    fn scan_symbolic(&self,cs: &mut CharStream) -> Token {
        if let Some(tok) = self.scan_common(cs) {
            return tok;
        }
        let start = cs.pos();
        let c = cs.peek(0);
        match c {
            '(' if !self.in_function => self.scan_string(cs),
            '$' => {
                cs.advance(1);
                cs.advance_while(is_ident_char);
                self.token(cs,TokenKind::Dollar,start)
            },
            '@' => self.single(cs,TokenKind::At),
            '>' => self.single(cs,TokenKind::Gts),
            '<' => self.single(cs,TokenKind::LAngle),
            '|' if cs.peek(1) == '|' => {
                cs.advance(2);
                self.token(cs,TokenKind::LogicalOr,start)
            },
            '&' if cs.peek(1) == '&' => {
                cs.advance(2);
                self.token(cs,TokenKind::LogicalAnd,start)
            },
            '&' => self.single(cs,TokenKind::Ampersand),
            _ if starts_number(cs,0) => {
                self.scan_number(cs);
                self.token(cs,TokenKind::Number,start)
            },
            _ if c.is_ascii_alphabetic() || c == '_' => self.scan_word(cs),
            _ => self.single(cs,TokenKind::Delim)
        }
    }
    /// digits with optional fraction, returns (integer digits, fraction digits, has point)
    fn scan_number(&self,cs: &mut CharStream) -> (usize,usize,bool) {
        let int = cs.advance_while(|c| c.is_ascii_digit());
        if cs.peek(0) == '.' {
            cs.advance(1);
            let frac = cs.advance_while(|c| c.is_ascii_digit());
            return (int,frac,true);
        }
        (int,0,false)
    }
    /// `(` comment/string with optional quote and `&1` escape
    fn scan_string(&self,cs: &mut CharStream) -> Token {
        let start = cs.pos();
        cs.advance(1);
        if cs.peek(0) == '&' && cs.peek(1) == '1' {
            cs.advance(2);
        }
        let quote = match QUOTES.contains(&cs.peek(0)) {
            true => {
                let q = cs.peek(0);
                cs.advance(1);
                Some(q)
            },
            false => None
        };
        loop {
            let c = cs.peek(0);
            if c == '\n' || cs.at_end() {
                return self.token(cs,TokenKind::BadString,start);
            }
            match quote {
                Some(q) if c == q && cs.peek(1) == ')' => {
                    cs.advance(2);
                    return self.token(cs,TokenKind::String,start);
                },
                None if c == ')' => {
                    cs.advance(1);
                    return self.token(cs,TokenKind::String,start);
                },
                _ => cs.advance(1)
            }
        }
    }
    /// Scan something that starts with a letter: address, keyword, builtin, symbol.
    fn scan_word(&self,cs: &mut CharStream) -> Token {
        let start = cs.pos();
        let letter = cs.peek(0);
        // a single letter followed by a number, possibly after white space
        if letter.is_ascii_alphabetic() {
            let mut gap = 1;
            while is_space(cs.peek(gap)) {
                gap += 1;
            }
            let adjacent = gap == 1 && starts_number(cs,1);
            if adjacent || (gap > 1 && starts_number(cs,gap)) {
                match letter.to_ascii_uppercase() {
                    'O' => return self.single(cs,TokenKind::Prog),
                    'N' => return self.single(cs,TokenKind::Sequence),
                    _ => {}
                }
                cs.advance(gap);
                let (int,frac,point) = self.scan_number(cs);
                let kind = match point && (int == 0 || frac == 0) {
                    true => TokenKind::AddressPartial,
                    false => TokenKind::Address
                };
                return self.token(cs,kind,start);
            }
        }
        let run = cs.advance_while(is_ident_char);
        let word = cs.substring(start,start+run);
        if let Some(len) = keyword_prefix(&word) {
            cs.go_back_to(start + len);
            return self.token(cs,TokenKind::KeyWord,start);
        }
        if let Some(builtin) = handbook::builtin(&word) {
            let kind = match builtin.command {
                true => TokenKind::Fcmd,
                false => TokenKind::Ffunc
            };
            return self.token(cs,kind,start);
        }
        if run == 1 && letter.is_ascii_alphabetic() {
            return match letter.to_ascii_uppercase() {
                'O' => self.token(cs,TokenKind::Prog,start),
                'N' => self.token(cs,TokenKind::Sequence,start),
                _ => self.token(cs,TokenKind::Parameter,start)
            };
        }
        self.token(cs,TokenKind::Symbol,start)
    }
}

/// If `word` begins with a keyword that ends on a token boundary, return its length.
/// The rest of the identifier run counts as a boundary only if it is itself a keyword
/// on a boundary, so `THENX` and `THEN1` are never split.
pub fn keyword_prefix(word: &str) -> Option<usize> {
    let lower = word.to_lowercase();
    for kw in handbook::KEYWORDS.iter() {
        if !lower.starts_with(kw.name) {
            continue;
        }
        let rest = &word[kw.name.len()..];
        let next = rest.chars().next();
        let accepted = match next {
            None => true,
            Some(c) if c.is_ascii_digit() => kw.numeric_operand,
            Some(_) => keyword_prefix(rest).is_some()
        };
        if accepted {
            return Some(kw.name.len());
        }
    }
    None
}
