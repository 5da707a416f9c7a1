//! Declarations, directives, and the `.def` file grammar.

use std::sync::Arc;
use super::Parser;
use crate::lang::macrob::ast::{NodeId,NodeKind,IssueCode};
use crate::lang::macrob::declarations::{Declaration,ValueKind};
use crate::lang::macrob::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn def_file(&mut self,root: NodeId) {
        while self.changed.is_none() {
            match self.curr().kind {
                TokenKind::Eof => break,
                TokenKind::NewLine => {
                    self.skip();
                },
                TokenKind::At | TokenKind::Gts => {
                    if let Some(decl) = self.declaration() {
                        self.attach(root,decl);
                    }
                },
                TokenKind::Dollar => {
                    if let Some(dir) = self.directive() {
                        self.attach(root,dir);
                    }
                },
                TokenKind::String | TokenKind::BadString => {
                    let c = self.comment();
                    self.attach(root,c);
                    self.end_of_line(c);
                },
                _ => {
                    self.issue(root,IssueCode::DeclarationExpected);
                    self.resync();
                }
            }
        }
    }
    /// `@name value` or `>name value`, the value is the rest of the line
    pub(super) fn declaration(&mut self) -> Option<NodeId> {
        let is_label = match self.curr().kind {
            TokenKind::At => false,
            TokenKind::Gts => true,
            _ => return None
        };
        let kind = match is_label {
            true => NodeKind::LabelDeclaration,
            false => NodeKind::SymbolDeclaration
        };
        let node = self.start(kind);
        let saved = self.tokens.scanner();
        self.take(node);
        // the name is a raw word that is never expanded, so `@X 10` names `X`
        let mut raw = saved;
        raw.symbolic = false;
        self.tokens.set_modes(raw,false);
        let name = self.curr().clone();
        let name_ok = name.is(TokenKind::UnquotedString) &&
            name.text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_');
        if !name_ok {
            self.issue(node,IssueCode::DeclarationExpected);
            self.tokens.set_modes(saved,true);
            self.resync();
            self.end_of_line(node);
            return Some(node);
        }
        let name_node = self.leaf(NodeKind::Symbol);
        self.attach(node,name_node);
        self.ast.set_text(node,&name.text);
        let remainder = self.tokens.take_line_remainder();
        self.tokens.set_modes(saved,true);
        let (value_offset,value) = match remainder {
            Some((offset,txt)) if txt.len() > 0 => (offset,txt),
            _ => {
                self.issue(node,IssueCode::ValueExpected);
                self.end_of_line(node);
                return Some(node);
            }
        };
        let value_len = value.chars().count();
        let value_kind = self.tokens.table.infer_kind(&value,is_label);
        let value_node_kind = match value_kind {
            ValueKind::Numeric => NodeKind::Numeric,
            ValueKind::MacroValue => NodeKind::Variable,
            ValueKind::Constant => NodeKind::Bracket,
            ValueKind::NcCode | ValueKind::MFunc => NodeKind::NcCode,
            ValueKind::Address => NodeKind::Address,
            ValueKind::String => NodeKind::StringLiteral
        };
        let value_node = self.ast.add(value_node_kind,&value,value_offset,value_len);
        let prog_after = self.tokens.program_chars();
        self.ast.set_prog_range(value_node,prog_after - value_len,value_len);
        self.attach(node,value_node);
        let decl = Arc::new(Declaration {
            name: name.text.clone(),
            kind: value_kind,
            is_label,
            value: value.clone(),
            chars: value.chars().collect::<Vec<char>>().into(),
            uri: self.uri().clone(),
            node,
            offset: name.offset,
            len: name.len
        });
        self.ast.set_decl(node,Some(Arc::clone(&decl)));
        self.tokens.table.insert(decl);
        self.end_of_line(node);
        Some(node)
    }
    /// `$INCLUDE path`, `$NOLIST`, `$LIST`.  These must be spelled in upper case.
    pub(super) fn directive(&mut self) -> Option<NodeId> {
        if !self.curr().is(TokenKind::Dollar) {
            return None;
        }
        let tok = self.curr().clone();
        let upper = tok.text.to_uppercase();
        let exact = upper == tok.text;
        match upper.as_str() {
            "$INCLUDE" => {
                let node = self.start(NodeKind::Include);
                self.take(node);
                if exact {
                    self.include(node);
                } else {
                    // not executed
                    self.issue_at(node,IssueCode::UnknownKeyword,tok.offset,tok.len,Some(&tok.text));
                    self.resync();
                    self.end_of_line(node);
                }
                Some(node)
            },
            "$NOLIST" | "$LIST" => {
                let node = self.start(NodeKind::ListDirective);
                if !exact {
                    self.issue_detail(node,IssueCode::UnknownKeyword,&tok.text);
                }
                self.take(node);
                self.ast.set_text(node,&upper);
                self.end_of_line(node);
                Some(node)
            },
            _ => {
                let node = self.start(NodeKind::ListDirective);
                self.issue_detail(node,IssueCode::UnknownKeyword,&tok.text);
                self.take(node);
                self.resync();
                self.end_of_line(node);
                Some(node)
            }
        }
    }
    /// path of an `$INCLUDE`, then import the declarations of the included file
    fn include(&mut self,node: NodeId) {
        let path = match self.tokens.take_line_remainder() {
            Some((offset,txt)) if txt.len() > 0 => {
                let trimmed = txt.trim_matches('"').to_string();
                let len = txt.chars().count();
                let path_node = self.ast.add(NodeKind::StringLiteral,&trimmed,offset,len);
                let prog = self.tokens.program_chars();
                self.ast.set_prog_range(path_node,prog - len,len);
                self.attach(node,path_node);
                Some((path_node,trimmed))
            },
            _ => None
        };
        let (path_node,path) = match path {
            Some(p) => p,
            None => {
                self.issue(node,IssueCode::DefinitionExpected);
                self.end_of_line(node);
                return;
            }
        };
        self.ast.set_text(node,&path);
        if !path.to_lowercase().ends_with(".def") {
            let (offset,len) = (self.ast.node(path_node).offset,self.ast.node(path_node).len);
            self.issue_at(path_node,IssueCode::DefinitionExpected,offset,len,Some(&path));
            self.end_of_line(node);
            return;
        }
        match self.provider.resolve_reference(&path,self.uri()) {
            Some(target) => match self.provider.get(&target) {
                Some(parsed) => {
                    let decls = parsed.ast.declarations();
                    log::debug!("include {} brings {} declarations",target.as_str(),decls.len());
                    for decl in &decls {
                        self.tokens.table.insert(Arc::clone(decl));
                    }
                    self.ast.imported.insert(node,decls);
                    for uri in std::iter::once(&target).chain(parsed.ast.includes.iter()) {
                        if !self.ast.includes.contains(uri) {
                            self.ast.includes.push(uri.clone());
                        }
                    }
                },
                None => log::warn!("include {} could not be parsed",target.as_str())
            },
            None => log::warn!("include `{}` was not found",path)
        }
        // the newline was scanned before the table grew
        self.tokens.refresh();
        self.check_version();
        self.end_of_line(node);
    }
}
