//! # Language Module
//!
//! Items shared by language services: the `Document` that is handed to an analyzer,
//! the language error type, helpers for reading JSON settings, and conversion of
//! character offsets to LSP positions.  Specific languages are in submodules.

pub mod macrob;
pub mod server;

use std::io;
use std::io::{Read,Write};
use colored::*;
use thiserror::Error;
use lsp_types as lsp;

use crate::DYNERR;

#[derive(Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("Path not found")]
    PathNotFound,
    #[error("Bad URL")]
    BadUrl,
    #[error("Out of range")]
    OutOfRange,
    #[error("Document {0} changed from version {1} to {2} during analysis")]
    DocumentChanged(String,i32,i32)
}

/// Source text with its identity.  The version is the one assigned by the client,
/// it is None if the document is not tracked by a client.
#[derive(Clone)]
pub struct Document {
    pub uri: lsp::Url,
    pub version: Option<i32>,
    pub text: String
}

impl Document {
    pub fn new(uri: lsp::Url,version: Option<i32>,text: String) -> Self {
        Self {
            uri,
            version,
            text
        }
    }
    /// Document for text that has no file, such as stdin.  The extension
    /// controls how the text is interpreted.
    pub fn from_string(text: String,ext: &str) -> Self {
        let uri = match lsp::Url::parse(&format!("file:///stdin.{}",ext)) {
            Ok(u) => u,
            Err(_) => lsp::Url::parse("file:///stdin.src").expect("bad static URL")
        };
        Self {
            uri,
            version: Some(0),
            text
        }
    }
    pub fn from_file_path(path: &std::path::Path) -> Result<Self,DYNERR> {
        let text = std::fs::read_to_string(path)?;
        let canon = path.canonicalize()?;
        match lsp::Url::from_file_path(&canon) {
            Ok(uri) => Ok(Self::new(uri,None,text)),
            Err(_) => Err(Box::new(Error::BadUrl))
        }
    }
}

pub fn update_json_i64(maybe_obj: &serde_json::Value,key: &str,curr: &mut i64) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            if let Some(val) = x.as_i64() {
                *curr = val;
            }
        }
    }
}

/// Severity strings are `ignore`, `hint`, `info`, `warn`, `error`.
/// The value `ignore` sets the severity to None.
pub fn update_json_severity(maybe_obj: &serde_json::Value,key: &str,curr: &mut Option<lsp::DiagnosticSeverity>) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            if let Some(val) = x.as_str() {
                *curr = match val {
                    "ignore" => None,
                    "hint" => Some(lsp::DiagnosticSeverity::HINT),
                    "info" => Some(lsp::DiagnosticSeverity::INFORMATION),
                    "warn" => Some(lsp::DiagnosticSeverity::WARNING),
                    "error" => Some(lsp::DiagnosticSeverity::ERROR),
                    _ => *curr
                };
            }
        }
    }
}

/// Replace `curr` if the key holds an array of strings, other array elements are skipped.
pub fn update_json_vec_str(maybe_obj: &serde_json::Value,key: &str,curr: &mut Vec<String>) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            if let Some(list) = x.as_array() {
                *curr = list.iter().filter_map(|v| v.as_str()).map(|s| s.to_string()).collect();
            }
        }
    }
}

/// Position of a character offset.  Columns count characters.
/// Offsets past the end are clamped to the end of the text.
pub fn position(text: &str,offset: usize) -> lsp::Position {
    let mut line = 0;
    let mut col = 0;
    for (i,c) in text.chars().enumerate() {
        if i == offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    lsp::Position::new(line,col)
}

pub fn range(text: &str,offset: usize,len: usize) -> lsp::Range {
    lsp::Range::new(position(text,offset),position(text,offset + len))
}

/// Print a diagnostic to stderr, showing the line and highlighting the range.
/// Only the first line of a multi-line range is highlighted.
pub fn eprint_diagnostic(diag: &lsp::Diagnostic,program: &str) {
    let rng = diag.range;
    let line = match program.lines().nth(rng.start.line as usize) {
        Some(l) => l.to_string(),
        None => String::new()
    };
    let chars: Vec<char> = line.chars().collect();
    let beg = usize::min(rng.start.character as usize,chars.len());
    let end = match rng.end.line == rng.start.line {
        true => usize::min(usize::max(rng.end.character as usize,beg),chars.len()),
        false => chars.len()
    };
    let pre: String = chars[0..beg].iter().collect();
    let mid: String = chars[beg..end].iter().collect();
    let post: String = chars[end..].iter().collect();
    let code = match &diag.code {
        Some(lsp::NumberOrString::String(s)) => format!(" [{}]",s),
        _ => String::new()
    };
    let severity = match diag.severity {
        Some(lsp::DiagnosticSeverity::ERROR) => "ERROR".red(),
        Some(lsp::DiagnosticSeverity::WARNING) => "WARNING".bright_yellow(),
        Some(lsp::DiagnosticSeverity::INFORMATION) => "INFO".bright_blue(),
        _ => "HINT".normal()
    };
    eprintln!("{} line {} col {}: {}{}",severity,rng.start.line + 1,rng.start.character + 1,diag.message,code);
    eprintln!("    {}{}{}",pre,match diag.severity {
        Some(lsp::DiagnosticSeverity::ERROR) => mid.red().bold(),
        Some(lsp::DiagnosticSeverity::WARNING) => mid.bright_yellow().bold(),
        _ => mid.normal()
    },post);
}

/// Accumulate lines typed at the console, `bye` terminates.
pub fn line_entry(prompt: &str) -> String {
    eprintln!("Line entry interface.");
    eprintln!("This is a blind accumulation of lines.");
    eprintln!("Verify occurs when entry is terminated.");
    eprintln!("`bye` terminates.");
    let mut code = String::new();
    loop {
        eprint!("{} ",prompt);
        let mut line = String::new();
        if io::stderr().flush().is_err() {
            break;
        }
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        if line=="bye\n" || line=="bye\r\n" {
            break;
        }
        code += &line;
    }
    code
}

/// Read all of stdin, or start line entry if stdin is the console.
pub fn read_stdin(prompt: &str) -> String {
    if atty::is(atty::Stream::Stdin) {
        return line_entry(prompt);
    }
    let mut program = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut program) {
        log::error!("failed to read stdin: {}",e);
    }
    program
}
