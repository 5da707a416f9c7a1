//! Syntax tree and issue collection.
//!
//! Nodes live in an arena and refer to each other by index.  Every change to an existing
//! node is journaled, so the parser can take a mark, try a production, and roll the tree
//! back exactly if the production fails.  Issues (diagnostics) are attached to nodes and
//! gathered in document order by `collect_issues`.

use std::collections::{HashMap,HashSet};
use std::sync::Arc;
use lsp_types as lsp;
use super::declarations::Declaration;
use super::FileKind;

pub type NodeId = usize;

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Mod,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    LogicalOr,
    LogicalAnd,
    Neg,
    Pos
}

impl Op {
    /// Binary or relational operator from a token's text
    pub fn from_text(txt: &str) -> Option<Self> {
        match txt.to_lowercase().as_str() {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "xor" => Some(Self::Xor),
            "mod" => Some(Self::Mod),
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "le" => Some(Self::Le),
            "ge" => Some(Self::Ge),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "||" => Some(Self::LogicalOr),
            "&&" => Some(Self::LogicalAnd),
            _ => None
        }
    }
}

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum NodeKind {
    MacroFile,
    DefFile,
    LnkFile,
    /// `O` header and body
    Program,
    Include,
    /// `$NOLIST` or `$LIST`
    ListDirective,
    SymbolDeclaration,
    LabelDeclaration,
    /// leading `/`
    BlockSkip,
    SequenceNumber,
    /// resolved label used as a sequence number
    Label,
    NcStatement,
    /// G or M code
    NcCode,
    /// letter is in the node text, the value is the child
    Address,
    Assignment,
    /// `#expr`, `#name`, `#name<expr>`, or a declared macro variable symbol
    Variable,
    IfStatement,
    ThenBlock,
    ElseBlock,
    WhileStatement,
    DoLabel,
    EndLabel,
    Block,
    GotoStatement,
    Numeric,
    Binary(Op),
    Unary(Op),
    Conditional(Op),
    Bracket,
    FunctionCall,
    CommandStatement,
    /// raw text in a print command
    FunctionText,
    StringLiteral,
    Comment,
    Symbol,
    LinkSetting,
    LinkModule
}

impl NodeKind {
    pub fn is_declaration(&self) -> bool {
        matches!(self,Self::SymbolDeclaration | Self::LabelDeclaration)
    }
    pub fn is_file(&self) -> bool {
        matches!(self,Self::MacroFile | Self::DefFile | Self::LnkFile)
    }
}

/// Diagnostic rule identifiers
#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum IssueCode {
    BadString,
    ExpressionExpected,
    BracketExpected,
    EqualsExpected,
    KeywordExpected,
    EndExpected,
    EndifExpected,
    LabelMismatch,
    UnexpectedToken,
    NewlineExpected,
    UnknownSymbol,
    IncompatibleSymbol,
    DefinitionExpected,
    UnknownKeyword,
    DeclarationExpected,
    NestedSubstitution,
    ProgramNumberExpected,
    SequenceNumberExpected,
    LabelExpected,
    ValueExpected,
    SignatureMismatch,
    UnexpectedKeyword
}

impl IssueCode {
    /// stable identifier, used as the diagnostic code
    pub fn id(&self) -> &'static str {
        match self {
            Self::BadString => "bad-string",
            Self::ExpressionExpected => "expression-expected",
            Self::BracketExpected => "bracket-expected",
            Self::EqualsExpected => "equals-expected",
            Self::KeywordExpected => "keyword-expected",
            Self::EndExpected => "end-expected",
            Self::EndifExpected => "endif-expected",
            Self::LabelMismatch => "label-mismatch",
            Self::UnexpectedToken => "unexpected-token",
            Self::NewlineExpected => "newline-expected",
            Self::UnknownSymbol => "unknown-symbol",
            Self::IncompatibleSymbol => "incompatible-symbol",
            Self::DefinitionExpected => "definition-expected",
            Self::UnknownKeyword => "unknown-keyword",
            Self::DeclarationExpected => "declaration-expected",
            Self::NestedSubstitution => "nested-substitution",
            Self::ProgramNumberExpected => "program-number-expected",
            Self::SequenceNumberExpected => "sequence-number-expected",
            Self::LabelExpected => "label-expected",
            Self::ValueExpected => "value-expected",
            Self::SignatureMismatch => "signature-mismatch",
            Self::UnexpectedKeyword => "unexpected-keyword"
        }
    }
    pub fn message(&self) -> &'static str {
        match self {
            Self::BadString => "unterminated string",
            Self::ExpressionExpected => "expected expression",
            Self::BracketExpected => "expected bracket",
            Self::EqualsExpected => "expected `=`",
            Self::KeywordExpected => "expected keyword",
            Self::EndExpected => "expected END",
            Self::EndifExpected => "expected ENDIF",
            Self::LabelMismatch => "END label does not match DO label",
            Self::UnexpectedToken => "unexpected token",
            Self::NewlineExpected => "expected end of line",
            Self::UnknownSymbol => "symbol is not declared",
            Self::IncompatibleSymbol => "symbol kind cannot be used here",
            Self::DefinitionExpected => "include must be a definition file (.def)",
            Self::UnknownKeyword => "unknown keyword",
            Self::DeclarationExpected => "expected declaration",
            Self::NestedSubstitution => "declared symbol inside a substitution is not expanded",
            Self::ProgramNumberExpected => "expected program number",
            Self::SequenceNumberExpected => "expected sequence number",
            Self::LabelExpected => "expected label",
            Self::ValueExpected => "expected value",
            Self::SignatureMismatch => "arguments do not match any signature",
            Self::UnexpectedKeyword => "keyword is not expected here"
        }
    }
    pub fn severity(&self) -> lsp::DiagnosticSeverity {
        match self {
            Self::UnknownSymbol | Self::NestedSubstitution => lsp::DiagnosticSeverity::WARNING,
            _ => lsp::DiagnosticSeverity::ERROR
        }
    }
    pub fn from_id(id: &str) -> Option<Self> {
        ALL_CODES.iter().find(|c| c.id() == id).copied()
    }
}

pub const ALL_CODES: [IssueCode;22] = [
    IssueCode::BadString,
    IssueCode::ExpressionExpected,
    IssueCode::BracketExpected,
    IssueCode::EqualsExpected,
    IssueCode::KeywordExpected,
    IssueCode::EndExpected,
    IssueCode::EndifExpected,
    IssueCode::LabelMismatch,
    IssueCode::UnexpectedToken,
    IssueCode::NewlineExpected,
    IssueCode::UnknownSymbol,
    IssueCode::IncompatibleSymbol,
    IssueCode::DefinitionExpected,
    IssueCode::UnknownKeyword,
    IssueCode::DeclarationExpected,
    IssueCode::NestedSubstitution,
    IssueCode::ProgramNumberExpected,
    IssueCode::SequenceNumberExpected,
    IssueCode::LabelExpected,
    IssueCode::ValueExpected,
    IssueCode::SignatureMismatch,
    IssueCode::UnexpectedKeyword
];

#[derive(Clone,Debug)]
pub struct Issue {
    pub code: IssueCode,
    pub severity: lsp::DiagnosticSeverity,
    pub node: NodeId,
    /// source character offset and length
    pub offset: usize,
    pub len: usize,
    pub message: String
}

#[derive(Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub text: String,
    pub offset: usize,
    pub len: usize,
    pub prog_offset: usize,
    pub prog_len: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub decl: Option<Arc<Declaration>>,
    pub issues: Vec<Issue>
}

impl Node {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
    pub fn contains(&self,offset: usize) -> bool {
        match self.len {
            0 => offset == self.offset,
            _ => offset >= self.offset && offset < self.end()
        }
    }
}

enum Undo {
    Attach { parent: NodeId, child: NodeId, old_parent: Option<NodeId> },
    Extent { node: NodeId, offset: usize, len: usize, prog_offset: usize, prog_len: usize },
    Decl { node: NodeId, old: Option<Arc<Declaration>> },
    Issue { node: NodeId, error: bool }
}

/// Arena size and journal length, taken before a speculative production
#[derive(Clone,Copy,PartialEq,Debug)]
pub struct AstMark {
    nodes: usize,
    journal: usize
}

pub struct Ast {
    pub uri: lsp::Url,
    pub version: Option<i32>,
    pub kind: FileKind,
    /// text obtained by expanding every declared symbol
    pub program: String,
    /// length of the source in characters
    pub source_len: usize,
    /// includes that were resolved while parsing, and the includes of those
    pub includes: Vec<lsp::Url>,
    /// declarations brought in by each `$INCLUDE` node
    pub imported: HashMap<NodeId,Vec<Arc<Declaration>>>,
    root: NodeId,
    nodes: Vec<Node>,
    journal: Vec<Undo>,
    issue_positions: HashSet<(usize,usize)>
}

impl Ast {
    pub fn new(uri: lsp::Url,version: Option<i32>,kind: FileKind,source_len: usize) -> Self {
        let root_kind = match kind {
            FileKind::Source => NodeKind::MacroFile,
            FileKind::Definition => NodeKind::DefFile,
            FileKind::Linker => NodeKind::LnkFile
        };
        let mut ans = Self {
            uri,
            version,
            kind,
            program: String::new(),
            source_len,
            includes: Vec::new(),
            imported: HashMap::new(),
            root: 0,
            nodes: Vec::new(),
            journal: Vec::new(),
            issue_positions: HashSet::new()
        };
        ans.root = ans.add(root_kind,"",0,0);
        ans
    }
    pub fn root(&self) -> NodeId {
        self.root
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn node(&self,id: NodeId) -> &Node {
        &self.nodes[id]
    }
    pub fn children(&self,id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }
    pub fn parent(&self,id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }
    /// Add a detached node
    pub fn add(&mut self,kind: NodeKind,text: &str,offset: usize,len: usize) -> NodeId {
        self.nodes.push(Node {
            kind,
            text: text.to_string(),
            offset,
            len,
            prog_offset: 0,
            prog_len: 0,
            parent: None,
            children: Vec::new(),
            decl: None,
            issues: Vec::new()
        });
        self.nodes.len() - 1
    }
    pub fn set_prog_range(&mut self,id: NodeId,prog_offset: usize,prog_len: usize) {
        self.save_extent(id);
        self.nodes[id].prog_offset = prog_offset;
        self.nodes[id].prog_len = prog_len;
    }
    pub fn set_text(&mut self,id: NodeId,text: &str) {
        // text is only set on nodes under construction, which rollback discards
        self.nodes[id].text = text.to_string();
    }
    pub fn set_decl(&mut self,id: NodeId,decl: Option<Arc<Declaration>>) {
        let old = self.nodes[id].decl.take();
        self.journal.push(Undo::Decl { node: id, old });
        self.nodes[id].decl = decl;
    }
    fn save_extent(&mut self,id: NodeId) {
        let n = &self.nodes[id];
        self.journal.push(Undo::Extent { node: id, offset: n.offset, len: n.len, prog_offset: n.prog_offset, prog_len: n.prog_len });
    }
    /// Grow the node's source and program ranges to include the given ranges.
    /// A node that is still empty and has no children takes the ranges as given.
    pub fn cover(&mut self,id: NodeId,offset: usize,len: usize,prog_offset: usize,prog_len: usize) {
        self.save_extent(id);
        let n = &mut self.nodes[id];
        if n.len == 0 && n.children.is_empty() && n.prog_len == 0 {
            n.offset = offset;
            n.len = len;
            n.prog_offset = prog_offset;
            n.prog_len = prog_len;
            return;
        }
        let beg = usize::min(n.offset,offset);
        let end = usize::max(n.end(),offset + len);
        n.offset = beg;
        n.len = end - beg;
        let pbeg = usize::min(n.prog_offset,prog_offset);
        let pend = usize::max(n.prog_offset + n.prog_len,prog_offset + prog_len);
        n.prog_offset = pbeg;
        n.prog_len = pend - pbeg;
    }
    /// Append `child` to `parent`, growing the parent and its ancestors to contain the child.
    pub fn attach(&mut self,parent: NodeId,child: NodeId) {
        let old_parent = self.nodes[child].parent;
        self.journal.push(Undo::Attach { parent, child, old_parent });
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        let (o,l,po,pl) = {
            let c = &self.nodes[child];
            (c.offset,c.len,c.prog_offset,c.prog_len)
        };
        let mut curr = Some(parent);
        while let Some(id) = curr {
            let n = &self.nodes[id];
            let contained = n.offset <= o && o + l <= n.end() && n.prog_offset <= po && po + pl <= n.prog_offset + n.prog_len;
            if contained && (n.len > 0 || n.children.len() > 1) {
                break;
            }
            if n.children.len() == 1 && n.len == 0 && n.prog_len == 0 {
                self.save_extent(id);
                let n = &mut self.nodes[id];
                n.offset = o;
                n.len = l;
                n.prog_offset = po;
                n.prog_len = pl;
            } else {
                self.cover(id,o,l,po,pl);
            }
            curr = self.nodes[id].parent;
        }
    }
    /// Record an issue on `node`.  Returns false if an issue was already recorded at this position.
    pub fn add_issue(&mut self,node: NodeId,code: IssueCode,offset: usize,len: usize,detail: Option<&str>) -> bool {
        if self.issue_positions.contains(&(offset,len)) {
            log::trace!("suppress duplicate {} at {}",code.id(),offset);
            return false;
        }
        let message = match detail {
            Some(d) => [code.message(),": ",d].concat(),
            None => code.message().to_string()
        };
        self.issue_positions.insert((offset,len));
        self.nodes[node].issues.push(Issue {
            code,
            severity: code.severity(),
            node,
            offset,
            len,
            message
        });
        self.journal.push(Undo::Issue { node, error: code.severity() == lsp::DiagnosticSeverity::ERROR });
        true
    }
    pub fn mark(&self) -> AstMark {
        AstMark {
            nodes: self.nodes.len(),
            journal: self.journal.len()
        }
    }
    /// Issues recorded since the mark was taken
    pub fn issues_since(&self,mark: &AstMark) -> usize {
        self.journal[mark.journal..].iter().filter(|u| matches!(u,Undo::Issue {..})).count()
    }
    /// Error severity issues recorded since the mark was taken
    pub fn errors_since(&self,mark: &AstMark) -> usize {
        self.journal[mark.journal..].iter().filter(|u| matches!(u,Undo::Issue { error: true, .. })).count()
    }
    /// Undo every change made after the mark was taken
    pub fn rollback(&mut self,mark: &AstMark) {
        while self.journal.len() > mark.journal {
            match self.journal.pop() {
                Some(Undo::Attach { parent, child, old_parent }) => {
                    self.nodes[parent].children.pop();
                    self.nodes[child].parent = old_parent;
                },
                Some(Undo::Extent { node, offset, len, prog_offset, prog_len }) => {
                    let n = &mut self.nodes[node];
                    n.offset = offset;
                    n.len = len;
                    n.prog_offset = prog_offset;
                    n.prog_len = prog_len;
                },
                Some(Undo::Decl { node, old }) => {
                    self.nodes[node].decl = old;
                },
                Some(Undo::Issue { node, .. }) => {
                    if let Some(issue) = self.nodes[node].issues.pop() {
                        self.issue_positions.remove(&(issue.offset,issue.len));
                    }
                },
                None => break
            }
        }
        self.nodes.truncate(mark.nodes);
    }
    /// Drop the undo journal, after which no mark taken earlier may be used
    pub fn seal(&mut self) {
        self.journal = Vec::new();
    }
    /// All issues in the tree in document order
    pub fn collect_issues(&self) -> Vec<Issue> {
        let mut ans = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            ans.append(&mut self.nodes[id].issues.clone());
            for child in self.nodes[id].children.iter().rev() {
                stack.push(*child);
            }
        }
        ans.sort_by_key(|issue| issue.offset);
        ans
    }
    /// Deepest node whose range contains the offset
    pub fn node_at(&self,offset: usize) -> Option<NodeId> {
        if !self.nodes[self.root].contains(offset) && offset != self.nodes[self.root].end() {
            return None;
        }
        let mut curr = self.root;
        'descend: loop {
            for child in &self.nodes[curr].children {
                if self.nodes[*child].contains(offset) {
                    curr = *child;
                    continue 'descend;
                }
            }
            return Some(curr);
        }
    }
    /// Nearest proper ancestor satisfying the predicate
    pub fn ancestor<F: Fn(&NodeKind) -> bool>(&self,id: NodeId,pred: F) -> Option<NodeId> {
        let mut curr = self.nodes[id].parent;
        while let Some(p) = curr {
            if pred(&self.nodes[p].kind) {
                return Some(p);
            }
            curr = self.nodes[p].parent;
        }
        None
    }
    /// Depth first list of nodes of the given kind reachable from the root
    pub fn find_all(&self,kind: NodeKind) -> Vec<NodeId> {
        let mut ans = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.nodes[id].kind == kind {
                ans.push(id);
            }
            for child in self.nodes[id].children.iter().rev() {
                stack.push(*child);
            }
        }
        ans
    }
    /// Top level declarations in source order, including those imported by a top level
    /// `$INCLUDE`.  These are what `$INCLUDE` imports, so includes chain.
    pub fn declarations(&self) -> Vec<Arc<Declaration>> {
        let mut ans = Vec::new();
        for id in &self.nodes[self.root].children {
            let n = &self.nodes[*id];
            if n.kind == NodeKind::Include {
                if let Some(decls) = self.imported.get(id) {
                    ans.extend(decls.iter().cloned());
                }
            } else if n.kind.is_declaration() {
                if let Some(decl) = &n.decl {
                    ans.push(Arc::clone(decl));
                }
            }
        }
        ans
    }
    /// S-expression style dump of the tree, one node per line
    pub fn dump(&self) -> String {
        let mut ans = String::new();
        let mut stack = vec![(self.root,0)];
        while let Some((id,depth)) = stack.pop() {
            let n = &self.nodes[id];
            ans += &"  ".repeat(depth);
            ans += &format!("({:?} [{}+{}]",n.kind,n.offset,n.len);
            if n.text.len() > 0 {
                ans += &format!(" {:?}",n.text);
            }
            if let Some(decl) = &n.decl {
                ans += &format!(" -> {}",decl.name);
            }
            for issue in &n.issues {
                ans += &format!(" !{}",issue.code.id());
            }
            ans += ")\n";
            for child in n.children.iter().rev() {
                stack.push((*child,depth+1));
            }
        }
        ans
    }
}
