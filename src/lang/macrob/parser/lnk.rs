//! Linker descriptor grammar.
//!
//! Each line is a comment, a directive, a `KEY = value` setting, or the name of a
//! module to link.  Symbols are not expanded in linker files.

use super::Parser;
use crate::lang::macrob::ast::{NodeId,NodeKind,IssueCode};
use crate::lang::macrob::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn lnk_file(&mut self,root: NodeId) {
        self.tokens.set_substitute(false);
        while self.changed.is_none() {
            match self.curr().kind {
                TokenKind::Eof => break,
                TokenKind::NewLine => {
                    self.skip();
                },
                TokenKind::String | TokenKind::BadString => {
                    let c = self.comment();
                    self.attach(root,c);
                    self.end_of_line(c);
                },
                TokenKind::Dollar => {
                    if let Some(dir) = self.directive() {
                        self.attach(root,dir);
                    }
                },
                _ => {
                    // a setting commits once `=` is seen, so its issues are kept
                    let mark = self.mark();
                    let entry = match self.link_setting() {
                        Some(setting) => setting,
                        None => {
                            self.restore(&mark);
                            self.link_module()
                        }
                    };
                    self.attach(root,entry);
                }
            }
        }
    }
    /// `KEY = value`
    fn link_setting(&mut self) -> Option<NodeId> {
        if !matches!(self.curr().kind,TokenKind::Symbol | TokenKind::Parameter | TokenKind::KeyWord) {
            return None;
        }
        let node = self.start(NodeKind::LinkSetting);
        let key = self.take(node);
        self.ast.set_text(node,&key.text);
        if !self.curr().is_delim('=') {
            return None;
        }
        self.take(node);
        match self.tokens.take_line_remainder() {
            Some((offset,value)) if value.len() > 0 => {
                let len = value.chars().count();
                let val = self.ast.add(NodeKind::StringLiteral,&value,offset,len);
                let prog = self.tokens.program_chars();
                self.ast.set_prog_range(val,prog - len,len);
                self.attach(node,val);
            },
            _ => self.issue(node,IssueCode::ValueExpected)
        }
        self.end_of_line(node);
        Some(node)
    }
    /// file reference, the whole line
    fn link_module(&mut self) -> NodeId {
        let node = self.start(NodeKind::LinkModule);
        if let Some((offset,name)) = self.tokens.take_line_remainder() {
            let len = name.chars().count();
            let prog = self.tokens.program_chars();
            self.ast.cover(node,offset,len,prog - len,len);
            self.ast.set_text(node,&name);
        }
        self.end_of_line(node);
        node
    }
}
