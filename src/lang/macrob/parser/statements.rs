//! Statements: control flow, assignments, commands and NC blocks.

use super::{Parser,BLOCK_STOPS};
use crate::lang::macrob::ast::{NodeId,NodeKind,IssueCode};
use crate::lang::macrob::declarations::ValueKind;
use crate::lang::macrob::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn statement(&mut self) -> Option<NodeId> {
        let tok = self.curr().clone();
        if tok.is_keyword("if") {
            return Some(self.if_statement());
        }
        if tok.is_keyword("while") {
            return Some(self.while_statement());
        }
        if tok.is_keyword("goto") {
            return Some(self.goto_statement());
        }
        if tok.is(TokenKind::KeyWord) {
            let stmt = self.start(NodeKind::NcStatement);
            self.issue_detail(stmt,IssueCode::UnexpectedKeyword,&tok.text.to_uppercase());
            self.take(stmt);
            self.resync();
            return Some(stmt);
        }
        if self.can_start_assignment() {
            if let Some(assignment) = self.assignment() {
                return Some(assignment);
            }
            if tok.is(TokenKind::Hash) {
                let node = self.start(NodeKind::Assignment);
                if let Some(var) = self.variable() {
                    self.attach(node,var);
                }
                self.issue(node,IssueCode::EqualsExpected);
                self.resync();
                return Some(node);
            }
        }
        if tok.is(TokenKind::Fcmd) {
            if let Some(cmd) = self.try_rule(|p| p.command_statement()) {
                return Some(cmd);
            }
            return self.command_statement();
        }
        if tok.is(TokenKind::String) || tok.is(TokenKind::BadString) {
            return Some(self.comment());
        }
        self.nc_statement()
    }
    /// `#...`, or a symbol declared as a macro variable or number
    pub(super) fn can_start_assignment(&self) -> bool {
        let tok = self.curr();
        if tok.is(TokenKind::Hash) {
            return true;
        }
        match &tok.decl {
            Some(decl) => !decl.is_label && !tok.is_line_end() &&
                matches!(decl.kind,ValueKind::MacroValue | ValueKind::Numeric),
            None => false
        }
    }
    /// `variable = expression`.  If the variable is not followed by `=` nothing is consumed.
    pub(super) fn assignment(&mut self) -> Option<NodeId> {
        let mark = self.mark();
        let node = self.start(NodeKind::Assignment);
        let var = match self.variable() {
            Some(v) => v,
            None => {
                self.restore(&mark);
                return None;
            }
        };
        if !self.curr().is_delim('=') {
            self.restore(&mark);
            return None;
        }
        self.attach(node,var);
        self.take(node);
        match self.expression() {
            Some(expr) => self.attach(node,expr),
            None => self.issue(node,IssueCode::ExpressionExpected)
        }
        Some(node)
    }
    pub(super) fn comment(&mut self) -> NodeId {
        let bad = self.curr().is(TokenKind::BadString);
        let c = self.leaf(NodeKind::Comment);
        if bad {
            let (offset,len) = (self.ast.node(c).offset,self.ast.node(c).len);
            self.issue_at(c,IssueCode::BadString,offset,len,None);
        }
        c
    }
    /// `[` expression `]` as used by IF and WHILE, the expression is attached to `node`
    fn condition(&mut self,node: NodeId) {
        if !self.curr().is(TokenKind::LBracket) {
            self.issue(node,IssueCode::BracketExpected);
            return;
        }
        self.take(node);
        match self.expression() {
            Some(cond) => self.attach(node,cond),
            None => self.issue(node,IssueCode::ExpressionExpected)
        }
        if self.curr().is(TokenKind::RBracket) {
            self.take(node);
        } else {
            self.issue(node,IssueCode::BracketExpected);
        }
    }
    fn if_statement(&mut self) -> NodeId {
        let node = self.start(NodeKind::IfStatement);
        self.take(node);
        self.condition(node);
        if self.curr().is_keyword("goto") {
            let goto = self.goto_statement();
            self.attach(node,goto);
            return node;
        }
        if !self.curr().is_keyword("then") {
            self.issue(node,IssueCode::KeywordExpected);
            return node;
        }
        self.take(node);
        if self.can_start_assignment() {
            // single statement form, optional ELSE on the same line
            let then = self.start(NodeKind::ThenBlock);
            match self.assignment() {
                Some(a) => self.attach(then,a),
                None => self.issue(then,IssueCode::EqualsExpected)
            }
            self.attach(node,then);
            if self.curr().is_keyword("else") {
                let els = self.start(NodeKind::ElseBlock);
                self.take(els);
                match self.statement() {
                    Some(s) => self.attach(els,s),
                    None => self.issue(els,IssueCode::ExpressionExpected)
                }
                self.attach(node,els);
            }
            return node;
        }
        // block form
        self.end_of_line(node);
        let then = self.block(NodeKind::ThenBlock,&BLOCK_STOPS);
        self.attach(node,then);
        if self.curr().is_keyword("else") {
            let els = self.start(NodeKind::ElseBlock);
            self.take(els);
            self.end_of_line(els);
            let body = self.block(NodeKind::Block,&["endif","end"]);
            self.attach(els,body);
            self.attach(node,els);
        }
        if self.curr().is_keyword("endif") {
            self.take(node);
        } else {
            self.issue(node,IssueCode::EndifExpected);
        }
        node
    }
    /// lines until one of `stops`, or the end of the program
    fn block(&mut self,kind: NodeKind,stops: &[&str]) -> NodeId {
        let block = self.start(kind);
        while self.changed.is_none() && !self.at_stop(stops) {
            self.line(block,stops);
        }
        block
    }
    fn while_statement(&mut self) -> NodeId {
        let node = self.start(NodeKind::WhileStatement);
        self.take(node);
        self.condition(node);
        if !self.curr().is_keyword("do") {
            self.issue(node,IssueCode::KeywordExpected);
            self.resync();
            return node;
        }
        let do_lbl = self.start(NodeKind::DoLabel);
        self.take(do_lbl);
        let do_text = self.loop_label(do_lbl);
        self.attach(node,do_lbl);
        self.end_of_line(node);
        let body = self.block(NodeKind::Block,&BLOCK_STOPS);
        self.attach(node,body);
        if !self.curr().is_keyword("end") {
            self.issue(node,IssueCode::EndExpected);
            return node;
        }
        let end_lbl = self.start(NodeKind::EndLabel);
        self.take(end_lbl);
        let end_text = self.loop_label(end_lbl);
        self.attach(node,end_lbl);
        if let (Some(d),Some(e)) = (do_text,end_text) {
            if d != e {
                let (offset,len) = (self.ast.node(end_lbl).offset,self.ast.node(end_lbl).len);
                self.issue_at(end_lbl,IssueCode::LabelMismatch,offset,len,Some(&format!("DO {}, END {}",d,e)));
            }
        }
        node
    }
    /// label after DO or END, returns its expanded text
    fn loop_label(&mut self,node: NodeId) -> Option<String> {
        match self.unary() {
            Some(expr) => {
                self.attach(node,expr);
                let n = self.ast.node(expr);
                let text = self.tokens.program().chars().skip(n.prog_offset).take(n.prog_len).collect::<String>();
                self.ast.set_text(node,&text);
                Some(text)
            },
            None => {
                self.issue(node,IssueCode::LabelExpected);
                None
            }
        }
    }
    fn goto_statement(&mut self) -> NodeId {
        let node = self.start(NodeKind::GotoStatement);
        self.take(node);
        match self.expression() {
            Some(target) => self.attach(node,target),
            None => self.issue(node,IssueCode::LabelExpected)
        }
        node
    }
    /// DPRNT, BPRNT, POPEN, PCLOS, SETVN
    pub(super) fn command_statement(&mut self) -> Option<NodeId> {
        if !self.curr().is(TokenKind::Fcmd) {
            return None;
        }
        let node = self.start(NodeKind::CommandStatement);
        let name = self.take(node);
        self.ast.set_text(node,&name.text.to_uppercase());
        self.builtin_arguments(node,&name.text)?;
        Some(node)
    }
    /// G/M codes, addresses and parameters up to the end of the line
    fn nc_statement(&mut self) -> Option<NodeId> {
        let stmt = self.start(NodeKind::NcStatement);
        let mut words = 0;
        loop {
            let tok = self.curr().clone();
            if tok.is_line_end() || tok.is(TokenKind::KeyWord) || tok.is_delim('%') {
                break;
            }
            let word = match tok.kind {
                TokenKind::Address | TokenKind::AddressPartial => Some(self.address_word()),
                TokenKind::Parameter => Some(self.parameter_word()),
                TokenKind::String | TokenKind::BadString => Some(self.comment()),
                TokenKind::Symbol => Some(self.symbol_reference()),
                _ => None
            };
            match word {
                Some(w) => {
                    self.attach(stmt,w);
                    words += 1;
                },
                None => {
                    if words == 0 {
                        return None;
                    }
                    self.issue(stmt,IssueCode::UnexpectedToken);
                    self.resync();
                    break;
                }
            }
        }
        if words == 0 {
            return None;
        }
        Some(stmt)
    }
    /// Address token such as `G01` or `X1.5`.  G and M words become NcCode nodes,
    /// other letters an Address node holding the number.
    fn address_word(&mut self) -> NodeId {
        let tok = self.tokens.advance();
        let letter = tok.text.chars().next().unwrap_or('?').to_ascii_uppercase();
        if letter == 'G' || letter == 'M' {
            let code = self.node_from(NodeKind::NcCode,&tok);
            self.ast.set_text(code,&tok.text.to_uppercase());
            return code;
        }
        let addr = self.node_from(NodeKind::Address,&tok);
        self.ast.set_text(addr,&letter.to_string());
        let digits = tok.text[1..].trim_start().to_string();
        let digit_len = digits.chars().count();
        let (offset,len) = match tok.decl.is_some() {
            true => (tok.offset,tok.len),
            false => (tok.end() - digit_len,digit_len)
        };
        let num = self.ast.add(NodeKind::Numeric,&digits,offset,len);
        self.ast.set_prog_range(num,tok.prog_offset + tok.prog_len - digit_len,digit_len);
        if tok.decl.is_some() {
            self.ast.set_decl(num,tok.decl.clone());
        }
        self.attach(addr,num);
        addr
    }
    /// bare letter followed by an operand, e.g. `Y-1`, `X#1`, `G[#2]`
    fn parameter_word(&mut self) -> NodeId {
        let tok = self.tokens.advance();
        let letter = tok.text.to_uppercase();
        let kind = match letter.as_str() {
            "G" | "M" => NodeKind::NcCode,
            _ => NodeKind::Address
        };
        let word = self.node_from(kind,&tok);
        self.ast.set_text(word,&letter);
        if self.curr().is_line_end() || self.curr().is(TokenKind::KeyWord) {
            return word;
        }
        match self.unary() {
            Some(operand) => self.attach(word,operand),
            None => {
                if !self.curr().is(TokenKind::String) {
                    self.issue(word,IssueCode::ValueExpected);
                }
            }
        }
        word
    }
}
