//! # `mbkit` main library
//!
//! Language services for Fanuc style Macro B part programs.
//!
//! ## Language Files
//!
//! The engine is in `lang::macrob`.  It scans and parses three kinds of files:
//! * `.src` part programs, G/M code blocks mixed with macro statements
//! * `.def` declaration files, `@symbol value` and `>label value`
//! * `.lnk` linker descriptors
//!
//! Declared symbols are expanded as the source is scanned, and `$INCLUDE` brings
//! in the declarations of another file.  Parsing never fails on bad input, problems
//! are recorded on the tree and can be converted to LSP diagnostics.
//!
//! ## Analysis
//!
//! `lang::macrob::diagnostics::Analyzer` provides the `lang::server::Analysis` trait,
//! which is what the `verify` subcommand uses.  The analyzer owns a workspace that
//! gathers documents from disk and resolves includes.

pub mod lang;
pub mod commands;
pub mod cli;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;
