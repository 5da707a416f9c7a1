//! Declaration table.
//!
//! Symbols are declared with `@name value` and labels with `>name value`, either locally
//! or in a `.def` file brought in by `$INCLUDE`.  Each declaration keeps the text it
//! expands to, so the substitution layer can scan it as if it appeared in place of the name.
//! Names are case sensitive and the last declaration wins.

use std::collections::HashMap;
use std::sync::Arc;
use lsp_types as lsp;
use super::ast::NodeId;

const RCH: &str = "unreachable was reached";

/// Value kind, inferred from the declared value text
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum ValueKind {
    Numeric,
    /// bracketed expression, `[...]`
    Constant,
    Address,
    /// G code
    NcCode,
    /// variable reference, `#...`
    MacroValue,
    /// M code
    MFunc,
    String
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Numeric => "numeric",
            Self::Constant => "constant",
            Self::Address => "address",
            Self::NcCode => "nc code",
            Self::MacroValue => "macro variable",
            Self::MFunc => "m function",
            Self::String => "string"
        };
        write!(f,"{}",s)
    }
}

pub struct Declaration {
    /// exact source spelling
    pub name: String,
    pub kind: ValueKind,
    pub is_label: bool,
    /// value text as written, trimmed
    pub value: String,
    /// value text prepared for rescanning
    pub chars: Arc<[char]>,
    /// where the declaration lives, node is an index into that document's tree
    pub uri: lsp::Url,
    pub node: NodeId,
    pub offset: usize,
    pub len: usize
}

impl std::fmt::Debug for Declaration {
    fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.is_label { true => ">", false => "@" };
        write!(f,"{}{} {} ({})",marker,self.name,self.value,self.kind)
    }
}

/// Map from name to declaration with an insertion log, so that a speculative
/// parse can return the table to an earlier size.
pub struct DeclarationTable {
    map: HashMap<String,Vec<Arc<Declaration>>>,
    log: Vec<String>,
    numeric_patt: regex::Regex,
    nc_patt: regex::Regex,
    m_patt: regex::Regex
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            log: Vec::new(),
            numeric_patt: regex::Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)$").expect(RCH),
            nc_patt: regex::Regex::new(r"^[Gg]\s*[0-9]+(\.[0-9]*)?$").expect(RCH),
            m_patt: regex::Regex::new(r"^[Mm]\s*[0-9]+$").expect(RCH)
        }
    }
    /// Infer the kind of a declared value from its text.
    pub fn infer_kind(&self,value: &str,is_label: bool) -> ValueKind {
        let v = value.trim();
        if self.numeric_patt.is_match(v) {
            return ValueKind::Numeric;
        }
        if is_label {
            return ValueKind::String;
        }
        if v.starts_with('#') {
            return ValueKind::MacroValue;
        }
        if v.starts_with('[') {
            return ValueKind::Constant;
        }
        if self.nc_patt.is_match(v) {
            return ValueKind::NcCode;
        }
        if self.m_patt.is_match(v) {
            return ValueKind::MFunc;
        }
        // letter and number, or anything else
        ValueKind::Address
    }
    pub fn insert(&mut self,decl: Arc<Declaration>) {
        log::trace!("declare {:?}",decl);
        self.log.push(decl.name.clone());
        match self.map.get_mut(&decl.name) {
            Some(v) => v.push(decl),
            None => {
                self.map.insert(decl.name.clone(),vec![decl]);
            }
        }
    }
    /// Most recent declaration with exactly this name
    pub fn get(&self,name: &str) -> Option<Arc<Declaration>> {
        match self.map.get(name) {
            Some(v) => v.last().map(Arc::clone),
            None => None
        }
    }
    pub fn contains(&self,name: &str) -> bool {
        self.map.contains_key(name)
    }
    /// Number of insertions so far, used as a rollback mark
    pub fn len(&self) -> usize {
        self.log.len()
    }
    /// Undo insertions until only `len` remain
    pub fn truncate(&mut self,len: usize) {
        while self.log.len() > len {
            if let Some(name) = self.log.pop() {
                let now_empty = match self.map.get_mut(&name) {
                    Some(v) => {
                        v.pop();
                        v.is_empty()
                    },
                    None => false
                };
                if now_empty {
                    self.map.remove(&name);
                }
            }
        }
    }
    pub fn clear(&mut self) {
        self.map = HashMap::new();
        self.log = Vec::new();
    }
    /// Visible declarations, sorted by name
    pub fn visible(&self) -> Vec<Arc<Declaration>> {
        let mut ans: Vec<Arc<Declaration>> = self.map.values().filter_map(|v| v.last().map(Arc::clone)).collect();
        ans.sort_by(|a,b| a.name.cmp(&b.name));
        ans
    }
}
