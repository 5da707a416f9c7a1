//! # Macro B language engine
//!
//! Scanner, parser and declaration handling for Fanuc style Macro B sources.
//! Three kinds of files are understood:
//! * `.src` part programs with G/M codes, macro variables and control flow
//! * `.def` files holding `@symbol value` and `>label value` declarations
//! * `.lnk` linker descriptors
//!
//! Declared symbols are expanded in place as the source is scanned, so the parser sees
//! the value text.  The resulting tree keeps two coordinates for every node, one in the
//! source and one in the expanded program text.
//!
//! Other files are obtained through the `FileProvider` trait, which is how `$INCLUDE` finds
//! its target and how the parser learns that a document changed while it was working.

pub mod stream;
pub mod token;
pub mod handbook;
pub mod scanner;
pub mod declarations;
pub mod substitution;
pub mod ast;
pub mod parser;
pub mod settings;
pub mod diagnostics;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use lsp_types as lsp;
use crate::lang::Document;

pub use parser::{Parser,parse_macro_file};
pub use ast::{Ast,Node,NodeId,NodeKind,Issue,IssueCode};

/// File kind, chosen by the URI's extension
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum FileKind {
    /// `.src`, also the fallback for unknown extensions
    Source,
    /// `.def`
    Definition,
    /// `.lnk`
    Linker
}

impl FileKind {
    pub fn from_uri(uri: &lsp::Url) -> Self {
        let path = uri.path().to_lowercase();
        if path.ends_with(".def") {
            Self::Definition
        } else if path.ends_with(".lnk") {
            Self::Linker
        } else {
            Self::Source
        }
    }
}

impl std::str::FromStr for FileKind {
    type Err = crate::lang::Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s.to_lowercase().as_str() {
            "src" => Ok(Self::Source),
            "def" => Ok(Self::Definition),
            "lnk" => Ok(Self::Linker),
            _ => Err(crate::lang::Error::Syntax)
        }
    }
}

/// A document together with its parsed tree
#[derive(Clone)]
pub struct ParsedFile {
    pub doc: Document,
    pub ast: Arc<Ast>,
    pub version: Option<i32>
}

/// Access to other documents.  Implementations are shared between threads
/// that parse different documents at the same time.
pub trait FileProvider: Send + Sync {
    /// Parsed form of the document, or None if it is not available
    fn get(&self,uri: &lsp::Url) -> Option<ParsedFile>;
    /// Find the document an `$INCLUDE` path refers to
    fn resolve_reference(&self,reference: &str,from: &lsp::Url) -> Option<lsp::Url>;
    /// Latest known version of the document, if the provider tracks it
    fn current_version(&self,uri: &lsp::Url) -> Option<i32>;
}

/// Provider that knows no documents, includes are never found.
pub struct NoFiles;

impl FileProvider for NoFiles {
    fn get(&self,_uri: &lsp::Url) -> Option<ParsedFile> {
        None
    }
    fn resolve_reference(&self,_reference: &str,_from: &lsp::Url) -> Option<lsp::Url> {
        None
    }
    fn current_version(&self,_uri: &lsp::Url) -> Option<i32> {
        None
    }
}
