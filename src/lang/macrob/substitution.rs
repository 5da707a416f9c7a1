//! Definition substitution layer.
//!
//! `TokenSource` sits between the scanner and the parser.  When the scanner produces a
//! symbol that has been declared, a frame is pushed and the declaration's value text is
//! scanned in its place.  Tokens drawn from a frame carry the symbol's source range and a
//! reference to the declaration.  As tokens are consumed they are appended to the program
//! string, which gives every token a second coordinate in the expanded text.
//!
//! Only one level of substitution is performed.  A declared symbol found inside a frame
//! comes back as a `Symbol` with `nested` set and is left for the parser to report.

use std::sync::Arc;
use super::stream::CharStream;
use super::scanner::Scanner;
use super::token::{Token,TokenKind};
use super::declarations::{Declaration,DeclarationTable};

const MAX_DEPTH: usize = 1;

#[derive(Clone)]
struct Frame {
    decl: Arc<Declaration>,
    /// position in the declaration's value text
    pos: usize,
    /// range of the symbol in the source
    offset: usize,
    len: usize,
    leading_space: bool,
    first: bool
}

/// Where the next token will be scanned from
#[derive(Clone)]
struct Cursor {
    pos: usize,
    frames: Vec<Frame>
}

/// Snapshot of everything the token source can change
#[derive(Clone)]
pub struct Mark {
    before: Cursor,
    after: Cursor,
    curr: Token,
    prev: Token,
    scanner: Scanner,
    substitute: bool,
    program_len: usize,
    program_chars: usize,
    table_len: usize
}

impl Mark {
    /// source position of the current token when the mark was taken
    pub fn offset(&self) -> usize {
        self.curr.offset
    }
}

pub struct TokenSource<'a> {
    chars: &'a [char],
    cursor: Cursor,
    /// cursor before the current token was scanned, used to rescan after a mode change
    before: Cursor,
    scanner: Scanner,
    substitute: bool,
    pub table: DeclarationTable,
    program: String,
    program_chars: usize,
    curr: Token,
    prev: Token
}

impl<'a> TokenSource<'a> {
    pub fn new(chars: &'a [char]) -> Self {
        let start = Cursor { pos: 0, frames: Vec::new() };
        let mut ans = Self {
            chars,
            cursor: start.clone(),
            before: start,
            scanner: Scanner::new(),
            substitute: true,
            table: DeclarationTable::new(),
            program: String::new(),
            program_chars: 0,
            curr: Token::eof(0),
            prev: Token::eof(0)
        };
        ans.curr = ans.fetch();
        ans
    }
    /// the token that will be consumed next
    pub fn curr(&self) -> &Token {
        &self.curr
    }
    /// the token most recently consumed
    pub fn prev(&self) -> &Token {
        &self.prev
    }
    pub fn program(&self) -> &str {
        &self.program
    }
    pub fn program_chars(&self) -> usize {
        self.program_chars
    }
    pub fn source_len(&self) -> usize {
        self.chars.len()
    }
    /// scan the next token, pushing and popping frames as needed
    fn fetch(&mut self) -> Token {
        loop {
            if let Some(frame) = self.cursor.frames.last_mut() {
                let mut cs = CharStream::new(&frame.decl.chars);
                cs.go_back_to(frame.pos);
                let mut tok = self.scanner.scan(&mut cs);
                frame.pos = cs.pos();
                if tok.kind == TokenKind::Eof {
                    log::trace!("pop frame for {}",frame.decl.name);
                    self.cursor.frames.pop();
                    continue;
                }
                if tok.kind == TokenKind::Symbol && self.table.contains(&tok.text) {
                    tok.nested = true;
                }
                tok.offset = frame.offset;
                tok.len = frame.len;
                tok.decl = Some(Arc::clone(&frame.decl));
                if frame.first {
                    tok.leading_space = frame.leading_space;
                    frame.first = false;
                }
                return tok;
            }
            let mut cs = CharStream::new(self.chars);
            cs.go_back_to(self.cursor.pos);
            let tok = self.scanner.scan(&mut cs);
            self.cursor.pos = cs.pos();
            if self.substitute && tok.kind == TokenKind::Symbol && self.cursor.frames.len() < MAX_DEPTH {
                if let Some(decl) = self.table.get(&tok.text) {
                    log::trace!("push frame for {}",decl.name);
                    self.cursor.frames.push(Frame {
                        decl,
                        pos: 0,
                        offset: tok.offset,
                        len: tok.len,
                        leading_space: tok.leading_space,
                        first: true
                    });
                    continue;
                }
            }
            return tok;
        }
    }
    /// Consume the current token and return it with its program range filled in.
    pub fn advance(&mut self) -> Token {
        let mut tok = self.curr.clone();
        if tok.kind != TokenKind::Eof {
            // trailing space or a skipped comment leaves nothing before the newline
            if tok.leading_space && tok.kind != TokenKind::NewLine && self.program_chars > 0 && !self.program.ends_with('\n') {
                self.program.push(' ');
                self.program_chars += 1;
            }
            tok.prog_offset = self.program_chars;
            tok.prog_len = tok.text.chars().count();
            self.program += &tok.text;
            self.program_chars += tok.prog_len;
        } else {
            tok.prog_offset = self.program_chars;
            tok.prog_len = 0;
        }
        self.prev = tok.clone();
        self.before = self.cursor.clone();
        self.curr = self.fetch();
        tok
    }
    /// Discard the current token and scan it again, used when modes or declarations change
    pub fn refresh(&mut self) {
        self.cursor = self.before.clone();
        self.curr = self.fetch();
    }
    pub fn scanner(&self) -> Scanner {
        self.scanner
    }
    pub fn substitute(&self) -> bool {
        self.substitute
    }
    /// Set scanner modes and substitution together, rescanning the current token if anything changed.
    pub fn set_modes(&mut self,scanner: Scanner,substitute: bool) {
        if scanner != self.scanner || substitute != self.substitute {
            self.scanner = scanner;
            self.substitute = substitute;
            self.refresh();
        }
    }
    pub fn set_symbolic(&mut self,val: bool) {
        let mut s = self.scanner;
        s.symbolic = val;
        self.set_modes(s,self.substitute);
    }
    pub fn set_in_function(&mut self,val: bool) {
        let mut s = self.scanner;
        s.in_function = val;
        self.set_modes(s,self.substitute);
    }
    pub fn set_substitute(&mut self,val: bool) {
        self.set_modes(self.scanner,val);
    }
    /// Take the raw source text from the start of the current token up to the end of the line
    /// or a `;` comment.  The text is consumed and appended to the program string.
    /// Returns None inside a substitution.
    pub fn take_line_remainder(&mut self) -> Option<(usize,String)> {
        if !self.before.frames.is_empty() || self.curr.decl.is_some() {
            return None;
        }
        let mut cs = CharStream::new(self.chars);
        cs.go_back_to(self.before.pos);
        cs.advance_while(|c| c == ' ' || c == '\t');
        let start = cs.pos();
        cs.advance_while(|c| c != '\n' && c != ';');
        let raw = cs.substring(start,cs.pos());
        let trimmed = raw.trim_end();
        let end = start + trimmed.chars().count();
        if end > start {
            if self.program_chars > 0 && !self.program.ends_with('\n') {
                self.program.push(' ');
                self.program_chars += 1;
            }
            self.program += trimmed;
            self.program_chars += trimmed.chars().count();
        }
        self.cursor = Cursor { pos: end, frames: Vec::new() };
        self.before = self.cursor.clone();
        self.curr = self.fetch();
        Some((start,trimmed.to_string()))
    }
    pub fn mark(&self) -> Mark {
        Mark {
            before: self.before.clone(),
            after: self.cursor.clone(),
            curr: self.curr.clone(),
            prev: self.prev.clone(),
            scanner: self.scanner,
            substitute: self.substitute,
            program_len: self.program.len(),
            program_chars: self.program_chars,
            table_len: self.table.len()
        }
    }
    pub fn restore(&mut self,mark: &Mark) {
        self.before = mark.before.clone();
        self.cursor = mark.after.clone();
        self.curr = mark.curr.clone();
        self.prev = mark.prev.clone();
        self.scanner = mark.scanner;
        self.substitute = mark.substitute;
        self.program.truncate(mark.program_len);
        self.program_chars = mark.program_chars;
        self.table.truncate(mark.table_len);
    }
    /// Primary stream position, program length and table size, for checking that a restore is exact.
    pub fn state(&self) -> (usize,usize,usize) {
        (self.cursor.pos,self.program_chars,self.table.len())
    }
}
