//! # Traits for language analysis
//!
//! The `Analysis` trait is the interface between a language's diagnostics
//! and the CLI `verify` subcommand.  It is written so that a language client
//! could be served the same way, the analyzer keeps per document results.

use lsp_types as lsp;

use crate::{STDRESULT,DYNERR};

/// This trait object can serve the `verify` subcommand, whether it is run from the
/// console or in a subprocess.
pub trait Analysis {
    /// Analyze source directories and volatile documents that define the workspace.
    /// This should gather the documents so that relationships between files can be resolved.
    fn init_workspace(&mut self,_source_dirs: Vec<lsp::Url>,_volatile_docs: Vec<super::Document>) -> STDRESULT {
        Ok(())
    }
    /// Analyze a document to produce diagnostics.
    fn analyze(&mut self,doc: &super::Document) -> Result<(),DYNERR>;
    /// Parse the JSON to update the configuration.
    /// Unknown keys or unexpected values can be handled as the analyzer chooses.
    fn update_config(&mut self,json_str: &str) -> STDRESULT;
    /// Get a clone of the diagnostics for the given document.
    fn get_diags(&self,doc: &super::Document) -> Vec<lsp::Diagnostic>;
    fn err_warn_info_counts(&self) -> [usize;3];
    /// Print the syntax tree of the most recent analysis to stderr.
    fn eprint_tree(&self);
    /// If console start interactive entry, otherwise empty input pipe into string.
    fn read_stdin(&self) -> String;
}

pub fn basic_diag(range: lsp::Range,mess: &str,severity: lsp::DiagnosticSeverity) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range,
        severity: Some(severity),
        code: None,
        code_description: None,
        source: None,
        message: mess.to_string(),
        related_information: None,
        tags: None,
        data: None
    }
}
