//! Recursive descent parser.
//!
//! Rules are methods returning `Option<NodeId>`.  A rule that returns None has not matched,
//! and must leave the token source and the tree as it found them.  Ordered choice goes
//! through `try_rule`, which also rejects a match that recorded errors.  Rules that commit
//! record issues on the node under construction and recover locally, usually by skipping
//! to the end of the line.
//!
//! The only fatal outcome is the document changing while it is parsed, which is
//! detected by asking the provider for the document's current version.

mod statements;
mod expressions;
mod declarations;
mod lnk;

use lsp_types as lsp;
use super::ast::{Ast,AstMark,NodeId,NodeKind,IssueCode};
use super::substitution::{self,TokenSource};
use super::token::{Token,TokenKind};
use super::{FileKind,FileProvider};
use crate::lang::Document;
use crate::DYNERR;

/// Keywords that end a block
const BLOCK_STOPS: [&str;3] = ["else","endif","end"];

/// Position of the token source and the tree, for backtracking
pub struct ParseMark {
    tokens: substitution::Mark,
    ast: AstMark
}

pub struct Parser<'a> {
    doc: &'a Document,
    provider: &'a dyn FileProvider,
    tokens: TokenSource<'a>,
    ast: Ast,
    /// version reported by the provider when it differs from the document's
    changed: Option<i32>
}

/// Parse the document, resolving includes through `provider`.
/// The only error is the document version changing during the parse.
pub fn parse_macro_file(doc: &Document,provider: &dyn FileProvider) -> Result<Ast,DYNERR> {
    let chars: Vec<char> = doc.text.chars().collect();
    let parser = Parser::new(doc,provider,&chars);
    parser.parse()
}

impl<'a> Parser<'a> {
    /// `chars` must be the characters of `doc.text`
    pub fn new(doc: &'a Document,provider: &'a dyn FileProvider,chars: &'a [char]) -> Self {
        let kind = FileKind::from_uri(&doc.uri);
        Self {
            doc,
            provider,
            tokens: TokenSource::new(chars),
            ast: Ast::new(doc.uri.clone(),doc.version,kind,chars.len()),
            changed: None
        }
    }
    /// Consume the parser and produce the tree.
    pub fn parse(mut self) -> Result<Ast,DYNERR> {
        log::debug!("parsing {} as {:?}",self.doc.uri.as_str(),self.ast.kind);
        self.tokens.table.clear();
        let root = self.ast.root();
        match self.ast.kind {
            FileKind::Source => self.source_file(root),
            FileKind::Definition => self.def_file(root),
            FileKind::Linker => self.lnk_file(root)
        }
        self.check_version();
        if let Some(found) = self.changed {
            log::warn!("{} changed while parsing",self.doc.uri.as_str());
            return Err(Box::new(crate::lang::Error::DocumentChanged(
                self.doc.uri.to_string(),
                self.doc.version.unwrap_or(0),
                found
            )));
        }
        let source_len = self.tokens.source_len();
        let prog_len = self.tokens.program_chars();
        self.ast.cover(root,0,source_len,0,prog_len);
        self.ast.program = self.tokens.program().to_string();
        self.ast.seal();
        log::debug!("{} nodes, {} issues",self.ast.len(),self.ast.collect_issues().len());
        Ok(self.ast)
    }

    // Token and node helpers

    fn curr(&self) -> &Token {
        self.tokens.curr()
    }
    fn prev(&self) -> &Token {
        self.tokens.prev()
    }
    /// consume the current token and grow `node` to include it
    fn take(&mut self,node: NodeId) -> Token {
        let tok = self.tokens.advance();
        self.ast.cover(node,tok.offset,tok.len,tok.prog_offset,tok.prog_len);
        tok
    }
    /// consume the current token without adding it to any node
    fn skip(&mut self) -> Token {
        self.tokens.advance()
    }
    /// new empty node positioned at the current token
    fn start(&mut self,kind: NodeKind) -> NodeId {
        let offset = self.curr().offset;
        let id = self.ast.add(kind,"",offset,0);
        let prog = self.tokens.program_chars();
        self.ast.set_prog_range(id,prog,0);
        id
    }
    /// consume the current token as a new node, carrying its text and declaration
    fn leaf(&mut self,kind: NodeKind) -> NodeId {
        let tok = self.tokens.advance();
        self.node_from(kind,&tok)
    }
    fn node_from(&mut self,kind: NodeKind,tok: &Token) -> NodeId {
        let id = self.ast.add(kind,&tok.text,tok.offset,tok.len);
        self.ast.set_prog_range(id,tok.prog_offset,tok.prog_len);
        if tok.decl.is_some() {
            self.ast.set_decl(id,tok.decl.clone());
        }
        id
    }
    fn attach(&mut self,parent: NodeId,child: NodeId) {
        self.ast.attach(parent,child);
    }
    /// issue at the current token
    fn issue(&mut self,node: NodeId,code: IssueCode) {
        let (offset,len) = (self.curr().offset,self.curr().len);
        self.ast.add_issue(node,code,offset,len,None);
    }
    fn issue_detail(&mut self,node: NodeId,code: IssueCode,detail: &str) {
        let (offset,len) = (self.curr().offset,self.curr().len);
        self.ast.add_issue(node,code,offset,len,Some(detail));
    }
    fn issue_at(&mut self,node: NodeId,code: IssueCode,offset: usize,len: usize,detail: Option<&str>) {
        self.ast.add_issue(node,code,offset,len,detail);
    }
    /// zero length issue right after the previous token
    fn issue_after_prev(&mut self,node: NodeId,code: IssueCode) {
        let offset = self.prev().end();
        self.ast.add_issue(node,code,offset,0,None);
    }
    /// skip to the end of the line, leaving the newline
    fn resync(&mut self) {
        while !self.curr().is_line_end() {
            self.skip();
        }
    }
    /// Check for and consume the end of a line.  If something else is there,
    /// record `newline-expected` and skip to the end of the line.
    fn end_of_line(&mut self,node: NodeId) {
        if !self.curr().is_line_end() {
            self.issue_after_prev(node,IssueCode::NewlineExpected);
            self.resync();
        }
        if self.curr().is(TokenKind::NewLine) {
            self.skip();
        }
    }
    /// end of input, a program header, `%`, or one of the keywords in `stops`
    fn at_stop(&self,stops: &[&str]) -> bool {
        let tok = self.curr();
        if tok.is(TokenKind::Eof) || tok.is(TokenKind::Prog) || tok.is_delim('%') {
            return true;
        }
        tok.is(TokenKind::KeyWord) && stops.iter().any(|s| tok.is_keyword(s))
    }

    // Backtracking

    fn mark(&self) -> ParseMark {
        ParseMark {
            tokens: self.tokens.mark(),
            ast: self.ast.mark()
        }
    }
    fn restore(&mut self,mark: &ParseMark) {
        self.tokens.restore(&mark.tokens);
        self.ast.rollback(&mark.ast);
    }
    /// Run `rule` speculatively.  Everything is restored if it does not match,
    /// or if it matched but recorded errors.  Warnings do not reject a match.
    fn try_rule<F>(&mut self,rule: F) -> Option<NodeId> where F: FnOnce(&mut Self) -> Option<NodeId> {
        let mark = self.mark();
        match rule(self) {
            Some(id) if self.ast.errors_since(&mark.ast) == 0 => Some(id),
            _ => {
                log::trace!("backtrack to {}",mark.tokens.offset());
                self.restore(&mark);
                None
            }
        }
    }
    /// Ask the provider whether the document moved on since the parse started.
    fn check_version(&mut self) {
        if let Some(v) = self.provider.current_version(&self.doc.uri) {
            if Some(v) != self.doc.version {
                self.changed = Some(v);
            }
        }
    }
    fn uri(&self) -> &lsp::Url {
        &self.doc.uri
    }

    // File level grammar for `.src`

    fn source_file(&mut self,root: NodeId) {
        while self.changed.is_none() {
            let tok = self.curr();
            if tok.is(TokenKind::Eof) {
                break;
            } else if tok.is(TokenKind::NewLine) || tok.is_delim('%') {
                self.skip();
            } else if tok.is(TokenKind::Prog) {
                if let Some(prog) = self.program() {
                    self.attach(root,prog);
                }
            } else {
                self.line(root,&[]);
            }
        }
    }
    /// `O` header and body, the body ends at the next header, `%`, or end of input
    fn program(&mut self) -> Option<NodeId> {
        if !self.curr().is(TokenKind::Prog) {
            return None;
        }
        let prog = self.start(NodeKind::Program);
        self.take(prog);
        match self.curr().kind {
            TokenKind::Number | TokenKind::Symbol | TokenKind::Parameter => {
                let tok = self.take(prog);
                self.ast.set_text(prog,&tok.text);
                if tok.decl.is_some() {
                    self.ast.set_decl(prog,tok.decl.clone());
                }
            },
            _ => self.issue(prog,IssueCode::ProgramNumberExpected)
        }
        if self.curr().is(TokenKind::String) {
            let c = self.leaf(NodeKind::Comment);
            self.attach(prog,c);
        }
        self.end_of_line(prog);
        while self.changed.is_none() && !self.at_stop(&[]) {
            if self.curr().is(TokenKind::NewLine) {
                self.skip();
                continue;
            }
            self.line(prog,&[]);
        }
        Some(prog)
    }
    /// One line: optional block skip, sequence number or label, then a statement.
    /// Declarations and directives also occupy a line.
    fn line(&mut self,parent: NodeId,stops: &[&str]) {
        match self.curr().kind {
            TokenKind::NewLine => {
                self.skip();
                return;
            },
            TokenKind::At | TokenKind::Gts => {
                if let Some(decl) = self.declaration() {
                    self.attach(parent,decl);
                }
                return;
            },
            TokenKind::Dollar => {
                if let Some(dir) = self.directive() {
                    self.attach(parent,dir);
                }
                return;
            },
            _ => {}
        }
        if self.curr().is_delim('/') {
            let skip = self.leaf(NodeKind::BlockSkip);
            self.attach(parent,skip);
        }
        if self.curr().is(TokenKind::Sequence) {
            let seq = self.sequence_number();
            self.attach(parent,seq);
        } else if self.is_label_use() {
            let lbl = self.label_use();
            self.attach(parent,lbl);
        }
        if self.curr().is_line_end() {
            self.end_of_line(parent);
            return;
        }
        if self.at_stop(stops) {
            return;
        }
        match self.statement() {
            Some(stmt) => {
                self.attach(parent,stmt);
                if !self.at_stop(stops) || self.curr().is(TokenKind::Eof) {
                    self.end_of_line(stmt);
                } else {
                    self.issue_after_prev(stmt,IssueCode::NewlineExpected);
                }
            },
            None => {
                self.issue(parent,IssueCode::UnexpectedToken);
                self.resync();
                self.end_of_line(parent);
            }
        }
    }
    fn sequence_number(&mut self) -> NodeId {
        let seq = self.start(NodeKind::SequenceNumber);
        self.take(seq);
        if self.curr().is(TokenKind::Number) {
            let tok = self.take(seq);
            self.ast.set_text(seq,&tok.text);
            if tok.decl.is_some() {
                self.ast.set_decl(seq,tok.decl.clone());
            }
        } else {
            self.issue(seq,IssueCode::SequenceNumberExpected);
        }
        seq
    }
    fn is_label_use(&self) -> bool {
        match &self.curr().decl {
            Some(decl) => decl.is_label,
            None => false
        }
    }
    /// tokens substituted from a label at the start of a line
    fn label_use(&mut self) -> NodeId {
        let lbl = self.start(NodeKind::Label);
        let decl = self.curr().decl.clone();
        if let Some(d) = &decl {
            self.ast.set_text(lbl,&d.name);
        }
        self.ast.set_decl(lbl,decl.clone());
        while self.same_substitution(&decl) {
            self.take(lbl);
        }
        lbl
    }
    /// true if the current token was substituted from `decl`
    fn same_substitution(&self,decl: &Option<std::sync::Arc<super::declarations::Declaration>>) -> bool {
        match (decl,&self.curr().decl) {
            (Some(a),Some(b)) => std::sync::Arc::ptr_eq(a,b) && !self.curr().is_line_end(),
            _ => false
        }
    }
}
