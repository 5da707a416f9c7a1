//! Tests of the Macro B parser and analyzer.

mod parser_test;
mod declarations_test;

use lsp_types as lsp;
use crate::lang::Document;
use super::{Ast,NodeId,NodeKind,FileProvider,NoFiles,parse_macro_file};

fn doc(uri: &str,text: &str) -> Document {
    Document::new(lsp::Url::parse(uri).expect("bad url"),Some(1),text.to_string())
}

fn parse_with(uri: &str,text: &str,provider: &dyn FileProvider) -> Ast {
    parse_macro_file(&doc(uri,text),provider).expect("parse failed")
}

fn parse_src(text: &str) -> Ast {
    parse_with("file:///test.src",text,&NoFiles)
}

/// issue identifiers in document order
fn codes(ast: &Ast) -> Vec<&'static str> {
    ast.collect_issues().iter().map(|i| i.code.id()).collect()
}

fn child_kinds(ast: &Ast,id: NodeId) -> Vec<NodeKind> {
    ast.children(id).iter().map(|c| ast.node(*c).kind).collect()
}

/// the only child of `id`, panics otherwise
fn only(ast: &Ast,id: NodeId) -> NodeId {
    let children = ast.children(id);
    assert_eq!(children.len(),1,"expected one child of {:?}",ast.node(id).kind);
    children[0]
}

/// kinds and texts of a subtree, ignoring positions
fn shape(ast: &Ast,id: NodeId) -> String {
    let n = ast.node(id);
    let mut ans = format!("({:?} {:?}",n.kind,n.text);
    for child in ast.children(id) {
        ans += " ";
        ans += &shape(ast,*child);
    }
    ans += ")";
    ans
}
