//! Expressions, variables and builtin calls.
//!
//! Precedence from loose to tight:
//! * `||` `&&`
//! * `EQ NE LE GE LT GT`
//! * `+ - OR XOR`
//! * `* / AND MOD`
//! * unary `+ -`

use super::Parser;
use crate::lang::macrob::ast::{NodeId,NodeKind,IssueCode,Op};
use crate::lang::macrob::declarations::ValueKind;
use crate::lang::macrob::handbook::{self,SigPart,Signature};
use crate::lang::macrob::token::TokenKind;

const RELATIONAL: [&str;6] = ["eq","ne","le","ge","lt","gt"];
const ADDITIVE: [&str;4] = ["+","-","or","xor"];
const MULTIPLICATIVE: [&str;4] = ["*","/","and","mod"];

impl<'a> Parser<'a> {
    pub(super) fn expression(&mut self) -> Option<NodeId> {
        let mut left = self.relational()?;
        loop {
            let op = match self.curr().kind {
                TokenKind::LogicalOr => Op::LogicalOr,
                TokenKind::LogicalAnd => Op::LogicalAnd,
                _ => break
            };
            left = self.binary_tail(NodeKind::Conditional(op),left,|p| p.relational());
        }
        Some(left)
    }
    fn relational(&mut self) -> Option<NodeId> {
        let mut left = self.additive()?;
        while let Some(op) = self.operator(&RELATIONAL) {
            left = self.binary_tail(NodeKind::Conditional(op),left,|p| p.additive());
        }
        Some(left)
    }
    fn additive(&mut self) -> Option<NodeId> {
        let mut left = self.multiplicative()?;
        while let Some(op) = self.operator(&ADDITIVE) {
            left = self.binary_tail(NodeKind::Binary(op),left,|p| p.multiplicative());
        }
        Some(left)
    }
    fn multiplicative(&mut self) -> Option<NodeId> {
        let mut left = self.unary()?;
        while let Some(op) = self.operator(&MULTIPLICATIVE) {
            left = self.binary_tail(NodeKind::Binary(op),left,|p| p.unary());
        }
        Some(left)
    }
    /// operator at the current token if it is one of `ops`
    fn operator(&self,ops: &[&str]) -> Option<Op> {
        let tok = self.curr();
        let candidate = match tok.kind {
            TokenKind::Delim | TokenKind::KeyWord => tok.text.to_lowercase(),
            _ => return None
        };
        match ops.contains(&candidate.as_str()) {
            true => Op::from_text(&candidate),
            false => None
        }
    }
    /// `left` has been parsed and the current token is the operator
    fn binary_tail<F>(&mut self,kind: NodeKind,left: NodeId,operand: F) -> NodeId where F: FnOnce(&mut Self) -> Option<NodeId> {
        let node = self.start(kind);
        self.attach(node,left);
        self.take(node);
        match operand(self) {
            Some(right) => self.attach(node,right),
            None => self.issue(node,IssueCode::ExpressionExpected)
        }
        node
    }
    pub(super) fn unary(&mut self) -> Option<NodeId> {
        let op = match self.curr() {
            t if t.is_delim('-') => Op::Neg,
            t if t.is_delim('+') => Op::Pos,
            _ => return self.primary()
        };
        let node = self.start(NodeKind::Unary(op));
        self.take(node);
        match self.unary() {
            Some(operand) => self.attach(node,operand),
            None => self.issue(node,IssueCode::ExpressionExpected)
        }
        Some(node)
    }
    fn primary(&mut self) -> Option<NodeId> {
        let tok = self.curr().clone();
        if tok.nested {
            return Some(self.symbol_reference());
        }
        if let Some(decl) = &tok.decl {
            match decl.kind {
                ValueKind::Address | ValueKind::NcCode | ValueKind::MFunc if !decl.is_label => {
                    let node = self.substitution_node(NodeKind::Symbol);
                    self.issue_at(node,IssueCode::IncompatibleSymbol,tok.offset,tok.len,Some(&decl.kind.to_string()));
                    return Some(node);
                },
                ValueKind::String => {
                    return Some(self.substitution_node(NodeKind::Symbol));
                },
                _ => {}
            }
        }
        match tok.kind {
            TokenKind::Number => Some(self.leaf(NodeKind::Numeric)),
            TokenKind::LBracket => Some(self.bracket()),
            TokenKind::Hash => self.variable(),
            TokenKind::Ffunc => Some(self.function_call()),
            TokenKind::Symbol => Some(self.symbol_reference()),
            _ => None
        }
    }
    fn bracket(&mut self) -> NodeId {
        let node = self.start(NodeKind::Bracket);
        let open = self.take(node);
        if open.decl.is_some() {
            self.ast.set_decl(node,open.decl.clone());
        }
        match self.expression() {
            Some(inner) => self.attach(node,inner),
            None => self.issue(node,IssueCode::ExpressionExpected)
        }
        if self.curr().is(TokenKind::RBracket) {
            self.take(node);
        } else {
            self.issue(node,IssueCode::BracketExpected);
        }
        node
    }
    /// All tokens coming from the current substitution, gathered into one node
    fn substitution_node(&mut self,kind: NodeKind) -> NodeId {
        let node = self.start(kind);
        let decl = self.curr().decl.clone();
        if let Some(d) = &decl {
            self.ast.set_text(node,&d.name);
        }
        self.ast.set_decl(node,decl.clone());
        while self.same_substitution(&decl) {
            self.take(node);
        }
        node
    }
    /// Symbol that was not substituted, either undeclared or nested in a substitution
    pub(super) fn symbol_reference(&mut self) -> NodeId {
        let tok = self.curr().clone();
        let node = self.leaf(NodeKind::Symbol);
        if tok.nested {
            self.issue_at(node,IssueCode::NestedSubstitution,tok.offset,tok.len,Some(&tok.text));
        } else if tok.decl.is_none() {
            self.issue_at(node,IssueCode::UnknownSymbol,tok.offset,tok.len,Some(&tok.text));
        }
        node
    }
    /// Macro variable: `#expr`, `#name`, `#name<expr>`, or a symbol declared
    /// as a macro variable or a number.  Returns None if nothing here looks like a variable.
    pub(super) fn variable(&mut self) -> Option<NodeId> {
        let tok = self.curr().clone();
        if tok.is(TokenKind::Hash) {
            let var = self.start(NodeKind::Variable);
            self.take(var);
            if tok.decl.is_some() {
                self.ast.set_decl(var,tok.decl.clone());
                self.ast.set_text(var,&tok.decl.as_ref().map(|d| d.name.clone()).unwrap_or_default());
            }
            let next = self.curr().clone();
            if next.is(TokenKind::Symbol) && !next.nested && next.decl.is_none() {
                let name = self.leaf(NodeKind::Symbol);
                self.ast.set_text(var,&next.text);
                self.attach(var,name);
                if self.curr().is(TokenKind::LAngle) {
                    self.take(var);
                    match self.expression() {
                        Some(index) => self.attach(var,index),
                        None => self.issue(var,IssueCode::ExpressionExpected)
                    }
                    if self.curr().is(TokenKind::Gts) {
                        self.take(var);
                    } else {
                        self.issue(var,IssueCode::BracketExpected);
                    }
                } else if !next.text.starts_with('_') {
                    self.issue_at(name,IssueCode::UnknownSymbol,next.offset,next.len,Some(&next.text));
                }
                return Some(var);
            }
            match self.primary() {
                Some(operand) => self.attach(var,operand),
                None => self.issue(var,IssueCode::ExpressionExpected)
            }
            return Some(var);
        }
        let decl = match &tok.decl {
            Some(d) if !d.is_label && !tok.nested => std::sync::Arc::clone(d),
            _ => return None
        };
        match decl.kind {
            ValueKind::Numeric => {
                // the declared number is the variable number
                let var = self.start(NodeKind::Variable);
                self.ast.set_decl(var,Some(std::sync::Arc::clone(&decl)));
                self.ast.set_text(var,&decl.name);
                if let Some(num) = self.unary() {
                    self.attach(var,num);
                }
                Some(var)
            },
            _ => None
        }
    }
    fn function_call(&mut self) -> NodeId {
        let node = self.start(NodeKind::FunctionCall);
        let name = self.take(node);
        self.ast.set_text(node,&name.text.to_uppercase());
        self.builtin_arguments(node,&name.text);
        node
    }
    /// Arguments of a builtin function or command.  Signature alternatives are tried
    /// in order, the last one is parsed for real so that its issues are kept.
    pub(super) fn builtin_arguments(&mut self,node: NodeId,name: &str) -> Option<()> {
        let builtin = handbook::builtin(name)?;
        let saved = (self.tokens.scanner(),self.tokens.substitute());
        self.tokens.set_in_function(true);
        let count = builtin.signatures.len();
        let mut matched = false;
        for (i,sig) in builtin.signatures.iter().enumerate() {
            if i + 1 < count {
                let mark = self.mark();
                if self.signature(node,sig) && self.ast.errors_since(&mark.ast) == 0 {
                    matched = true;
                    break;
                }
                self.restore(&mark);
            } else {
                let before = self.ast.mark();
                matched = self.signature(node,sig) && self.ast.errors_since(&before) == 0;
            }
        }
        if !matched && count > 1 {
            let n = self.ast.node(node);
            let (offset,len) = (n.offset,n.len);
            self.issue_at(node,IssueCode::SignatureMismatch,offset,usize::min(len,name.chars().count()),Some(&name.to_uppercase()));
        }
        self.tokens.set_modes(saved.0,saved.1);
        Some(())
    }
    /// Parse one signature alternative into `node`, false if a part is missing.
    fn signature(&mut self,node: NodeId,sig: &Signature) -> bool {
        for (i,part) in sig.parts.iter().enumerate() {
            let next_is_text = sig.parts.get(i+1) == Some(&SigPart::Text);
            match part {
                SigPart::Open => {
                    if !self.curr().is(TokenKind::LBracket) {
                        self.issue(node,IssueCode::BracketExpected);
                        return false;
                    }
                    if next_is_text {
                        self.tokens.set_symbolic(false);
                    }
                    self.take(node);
                },
                SigPart::Close => {
                    if !self.curr().is(TokenKind::RBracket) {
                        self.issue(node,IssueCode::BracketExpected);
                        return false;
                    }
                    self.tokens.set_symbolic(true);
                    self.take(node);
                },
                SigPart::Delim => {
                    let c = sig.delimiter.unwrap_or(',');
                    if !self.curr().is_delim(c) {
                        self.issue(node,IssueCode::UnexpectedToken);
                        return false;
                    }
                    self.take(node);
                },
                SigPart::Param => {
                    match self.expression() {
                        Some(arg) => self.attach(node,arg),
                        None => {
                            self.issue(node,IssueCode::ExpressionExpected);
                            return false;
                        }
                    }
                },
                SigPart::Text => self.print_text(node)
            }
        }
        true
    }
    /// Raw text with `#var[format]` escapes, up to the closing bracket.
    /// The scanner is in raw mode on entry and on exit.
    fn print_text(&mut self,node: NodeId) {
        loop {
            let tok = self.curr().clone();
            match tok.kind {
                TokenKind::RBracket | TokenKind::NewLine | TokenKind::Eof => break,
                TokenKind::Hash => {
                    self.tokens.set_symbolic(true);
                    if let Some(var) = self.variable() {
                        if self.curr().is(TokenKind::LBracket) {
                            let fmt = self.bracket();
                            self.attach(var,fmt);
                        }
                        self.attach(node,var);
                    }
                    self.tokens.set_symbolic(false);
                },
                TokenKind::LBracket => {
                    self.issue(node,IssueCode::UnexpectedToken);
                    self.take(node);
                },
                _ => {
                    let txt = self.leaf(NodeKind::FunctionText);
                    self.attach(node,txt);
                }
            }
        }
    }
}
