//! ## Language Analysis

use std::str::FromStr;
use clap::parser::ValueSource;
use colored::Colorize;
use super::CommandError;
use crate::lang;
use crate::lang::macrob::FileKind;
use crate::lang::server::Analysis;
use crate::STDRESULT;

fn load_doc(cmd: &clap::ArgMatches) -> Result<lang::Document,Box<dyn std::error::Error>> {
    let typ = match cmd.get_one::<String>("type") {
        Some(t) => Some(FileKind::from_str(t)?),
        None => None
    };
    if let Some(path_str) = cmd.get_one::<String>("file") {
        let path = std::path::Path::new(path_str);
        if !path.exists() {
            log::error!("{} not found",path_str);
            return Err(Box::new(CommandError::FileNotFound));
        }
        let doc = lang::Document::from_file_path(path)?;
        if let Some(kind) = typ {
            if kind != FileKind::from_uri(&doc.uri) {
                log::warn!("type does not match the file extension, the extension is used");
            }
        }
        return Ok(doc);
    }
    let ext = match typ {
        Some(FileKind::Definition) => "def",
        Some(FileKind::Linker) => "lnk",
        _ => "src"
    };
    let analyzer = lang::macrob::diagnostics::Analyzer::new();
    Ok(lang::Document::from_string(analyzer.read_stdin(),ext))
}

pub fn verify(cmd: &clap::ArgMatches) -> STDRESULT {
    let mut analyzer = lang::macrob::diagnostics::Analyzer::new();
    if cmd.value_source("config")==Some(ValueSource::CommandLine) {
        if let Some(json) = cmd.get_one::<String>("config") {
            analyzer.update_config(json)?;
        }
    }
    let doc = load_doc(cmd)?;
    if doc.text.len()==0 {
        log::error!("verify was handed an empty string");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    if let Some(ws_path) = cmd.get_one::<String>("workspace") {
        let canon = match std::path::Path::new(ws_path).canonicalize() {
            Ok(p) => p,
            Err(_) => return Err(Box::new(lang::Error::PathNotFound))
        };
        match lsp_types::Url::from_directory_path(canon) {
            Ok(uri) => analyzer.init_workspace(vec![uri],vec![doc.clone()])?,
            Err(_) => return Err(Box::new(lang::Error::PathNotFound))
        }
    } else if cmd.get_one::<String>("file").is_some() {
        // includes are looked for next to the file
        let dir = doc.uri.to_file_path().ok().and_then(|p| p.parent().map(|d| d.to_path_buf()));
        if let Some(uri) = dir.and_then(|d| lsp_types::Url::from_directory_path(d).ok()) {
            if let Err(e) = analyzer.init_workspace(vec![uri],vec![doc.clone()]) {
                log::warn!("includes may not resolve: {}",e);
            }
        }
    }
    analyzer.analyze(&doc)?;
    if cmd.get_flag("ast") {
        analyzer.eprint_tree();
    }
    for diag in analyzer.get_diags(&doc) {
        lang::eprint_diagnostic(&diag,&doc.text);
    }
    let [err,warn,_info] = analyzer.err_warn_info_counts();
    if warn > 0 {
        eprintln!("! {} {}",warn.to_string().bright_yellow(),"warnings".bright_yellow());
    }
    if err==0 {
        eprintln!("\u{2713} {}","Passing".green());
        if !atty::is(atty::Stream::Stdout) {
            // if not the console, pipe the code to the next node
            print!("{}",doc.text);
        }
        return Ok(());
    } else {
        eprintln!("\u{2717} {} {}",err.to_string().red(),"errors".red());
        return Err(Box::new(lang::Error::Syntax));
    }
}
