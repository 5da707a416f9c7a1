//! Macro B diagnostics module.
//!
//! Converts the issues recorded in a parse into LSP diagnostics, applying the
//! severity overrides from the settings.  Also contains the workspace, which
//! is how includes are found.  Used by the CLI.

use std::collections::HashMap;
use std::sync::Arc;
use lsp_types as lsp;
use lsp_types::{Diagnostic,DiagnosticSeverity};
use workspace::WorkspaceScanner;
use super::ast::Ast;
use super::settings::Settings;
use crate::lang::Document;
use crate::lang::server::{Analysis,basic_diag};
use crate::{DYNERR,STDRESULT};

pub mod workspace;

pub struct Analyzer {
    config: Settings,
    scanner: WorkspaceScanner,
    workspace_folders: Vec<lsp::Url>,
    /// Map from document uri to its diagnostics.
    diagnostic_set: HashMap<String,Vec<Diagnostic>>,
    /// Tree from the most recent analysis
    ast: Option<Arc<Ast>>
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            config: Settings::new(),
            scanner: WorkspaceScanner::new(),
            workspace_folders: Vec::new(),
            diagnostic_set: HashMap::new(),
            ast: None
        }
    }
    pub fn set_config(&mut self,config: Settings) {
        self.config = config;
    }
    /// Tree from the most recent analysis
    pub fn get_ast(&self) -> Option<Arc<Ast>> {
        self.ast.clone()
    }
    pub fn get_workspace(&self) -> &workspace::Workspace {
        self.scanner.get_workspace()
    }
    fn convert(&self,ast: &Ast,doc: &Document) -> Vec<Diagnostic> {
        let mut ans = Vec::new();
        for issue in ast.collect_issues() {
            let severity = match self.config.severity(issue.code) {
                Some(s) => s,
                None => continue
            };
            let rng = crate::lang::range(&doc.text,issue.offset,issue.len);
            let mut diag = basic_diag(rng,&issue.message,severity);
            diag.code = Some(lsp::NumberOrString::String(issue.code.id().to_string()));
            diag.source = Some("mbkit".to_string());
            ans.push(diag);
        }
        ans
    }
}

impl Analysis for Analyzer {
    fn init_workspace(&mut self,source_dirs: Vec<lsp::Url>,volatile_docs: Vec<Document>) -> STDRESULT {
        self.workspace_folders = source_dirs;
        let max_files = usize::try_from(self.config.workspace.max_files).unwrap_or(0);
        self.scanner.gather_docs(&self.workspace_folders,max_files,&self.config.workspace.extensions)?;
        self.scanner.append_volatile_docs(volatile_docs);
        Ok(())
    }
    fn analyze(&mut self,doc: &Document) -> Result<(),DYNERR> {
        self.diagnostic_set = HashMap::new();
        self.ast = None;
        self.scanner.get_workspace_mut().update_doc(doc);
        let ast = super::parse_macro_file(doc,self.scanner.get_workspace())?;
        log::info!("{} includes resolved",ast.includes.len());
        let diags = self.convert(&ast,doc);
        self.diagnostic_set.insert(doc.uri.to_string(),diags);
        self.ast = Some(Arc::new(ast));
        Ok(())
    }
    fn update_config(&mut self,json_str: &str) -> STDRESULT {
        self.config = super::settings::parse(json_str)?;
        Ok(())
    }
    fn read_stdin(&self) -> String {
        crate::lang::read_stdin("]")
    }
    fn get_diags(&self,doc: &Document) -> Vec<Diagnostic> {
        if let Some(diags) = self.diagnostic_set.get(&doc.uri.to_string()) {
            return diags.clone();
        }
        Vec::new()
    }
    fn err_warn_info_counts(&self) -> [usize;3] {
        let mut err = 0;
        let mut warn = 0;
        let mut info = 0;
        for diag in self.diagnostic_set.values() {
            for item in diag {
                match item.severity {
                    Some(DiagnosticSeverity::ERROR) => err += 1,
                    Some(DiagnosticSeverity::WARNING) => warn += 1,
                    Some(DiagnosticSeverity::INFORMATION) => info += 1,
                    _ => {}
                }
            }
        }
        [err,warn,info]
    }
    fn eprint_tree(&self) {
        if let Some(ast) = &self.ast {
            eprint!("{}",ast.dump());
        }
    }
}
