//! Workspace documents and include resolution.
//!
//! The `Workspace` is the `FileProvider` used by the analyzer.  Documents are gathered
//! from the workspace folders by the `WorkspaceScanner`, and parsed on demand when
//! some other document includes them.

use std::collections::{HashMap,HashSet};
use std::sync::{Arc,Mutex};
use std::thread::ThreadId;
use lsp_types as lsp;
use crate::lang::Document;
use crate::lang::macrob::{FileProvider,ParsedFile,parse_macro_file};
use crate::STDRESULT;

/// Split an include reference into path segments, either separator is accepted.
fn reference_segments(reference: &str) -> Vec<String> {
    reference.split(|c| c=='/' || c=='\\')
        .filter(|s| s.len() > 0 && *s != ".")
        .map(|s| s.to_string())
        .collect()
}

/// Return a value indicating the quality of the match of an include reference to a path in the
/// local file system.  Any value >0 means the filename itself matched case insensitively.
/// Higher values mean there were additional matches, such as parent directories.
fn match_reference(segs: &[String],uri: &lsp::Url) -> usize {
    let mut quality = 0;
    if !uri.cannot_be_a_base() {
        let mut doc_segs = std::path::Path::new(uri.path()).iter().rev();
        for seg in segs.iter().rev() {
            match doc_segs.next().and_then(|s| s.to_str()) {
                Some(s) if s.to_lowercase() == seg.to_lowercase() => quality += 1,
                _ => break
            }
        }
    }
    quality
}

fn parent_dir(uri: &lsp::Url) -> String {
    match uri.path().rfind('/') {
        Some(i) => uri.path()[0..i].to_lowercase(),
        None => String::new()
    }
}

pub struct Workspace {
    pub ws_folders: Vec<lsp::Url>,
    docs: HashMap<String,Document>,
    /// parsed documents, keyed by URI
    cache: Mutex<HashMap<String,ParsedFile>>,
    /// documents being parsed, keyed by thread so that only re-entry is refused
    in_progress: Mutex<HashSet<(ThreadId,String)>>
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            ws_folders: Vec::new(),
            docs: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
            in_progress: Mutex::new(HashSet::new())
        }
    }
    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }
    pub fn get_doc(&self,uri: &lsp::Url) -> Option<&Document> {
        self.docs.get(uri.as_str())
    }
    /// Insert or replace a document.  Cached trees of the document, and of anything
    /// that included it, are dropped.
    pub fn update_doc(&mut self,doc: &Document) {
        let key = doc.uri.to_string();
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|k,parsed| k != &key && !parsed.ast.includes.contains(&doc.uri));
        }
        self.docs.insert(key,doc.clone());
    }
    pub fn clear(&mut self) {
        self.docs = HashMap::new();
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
    fn cached(&self,uri: &lsp::Url,version: Option<i32>) -> Option<ParsedFile> {
        let cache = self.cache.lock().ok()?;
        match cache.get(uri.as_str()) {
            Some(parsed) if parsed.version == version => Some(parsed.clone()),
            _ => None
        }
    }
    /// Returns false if this thread is already parsing the URI
    fn enter(&self,uri: &lsp::Url) -> bool {
        match self.in_progress.lock() {
            Ok(mut set) => set.insert((std::thread::current().id(),uri.to_string())),
            Err(_) => false
        }
    }
    fn leave(&self,uri: &lsp::Url) {
        if let Ok(mut set) = self.in_progress.lock() {
            set.remove(&(std::thread::current().id(),uri.to_string()));
        }
    }
}

impl FileProvider for Workspace {
    fn get(&self,uri: &lsp::Url) -> Option<ParsedFile> {
        let doc = self.docs.get(uri.as_str())?;
        if let Some(parsed) = self.cached(uri,doc.version) {
            log::trace!("cache hit {}",uri.as_str());
            return Some(parsed);
        }
        if !self.enter(uri) {
            log::warn!("{} includes itself",uri.as_str());
            return None;
        }
        // lock is not held here, the parse may come back for other includes
        let result = parse_macro_file(doc,self);
        self.leave(uri);
        match result {
            Ok(ast) => {
                let parsed = ParsedFile {
                    doc: doc.clone(),
                    ast: Arc::new(ast),
                    version: doc.version
                };
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(uri.to_string(),parsed.clone());
                }
                Some(parsed)
            },
            Err(e) => {
                log::warn!("{}",e);
                None
            }
        }
    }
    fn resolve_reference(&self,reference: &str,from: &lsp::Url) -> Option<lsp::Url> {
        let segs = reference_segments(reference);
        if segs.len() == 0 {
            return None;
        }
        let from_dir = parent_dir(from);
        let mut ans: Option<&lsp::Url> = None;
        let mut best = (0,false);
        for doc in self.docs.values() {
            let quality = match_reference(&segs,&doc.uri);
            if quality == 0 {
                continue;
            }
            let local = parent_dir(&doc.uri) == from_dir;
            log::trace!("match {} to {} Q={}",reference,doc.uri.as_str(),quality);
            let better = match ans {
                None => true,
                Some(prev) => {
                    (quality,local) > best ||
                    ((quality,local) == best && doc.uri.as_str().len() < prev.as_str().len()) ||
                    ((quality,local) == best && doc.uri.as_str().len() == prev.as_str().len() && doc.uri.as_str() < prev.as_str())
                }
            };
            if better {
                ans = Some(&doc.uri);
                best = (quality,local);
            }
        }
        if ans.is_none() {
            log::debug!("no document matches `{}`",reference);
        }
        ans.cloned()
    }
    fn current_version(&self,uri: &lsp::Url) -> Option<i32> {
        self.docs.get(uri.as_str()).and_then(|d| d.version)
    }
}

pub struct WorkspaceScanner {
    ws: Workspace
}

impl WorkspaceScanner {
    pub fn new() -> Self {
        Self {
            ws: Workspace::new()
        }
    }
    /// Borrow the workspace data
    pub fn get_workspace(&self) -> &Workspace {
        &self.ws
    }
    pub fn get_workspace_mut(&mut self) -> &mut Workspace {
        &mut self.ws
    }
    /// Add volatile documents to the workspace set, these replace gathered
    /// documents with the same URI.
    pub fn append_volatile_docs(&mut self,docs: Vec<Document>) {
        for doc in docs {
            self.ws.update_doc(&doc);
        }
    }
    /// Buffer all documents matching `**/*.<ext>` in any of `dirs`, up to maximum count `max_files`
    pub fn gather_docs(&mut self,dirs: &Vec<lsp::Url>,max_files: usize,extensions: &[String]) -> STDRESULT {
        self.ws.clear();
        self.ws.ws_folders = dirs.clone();
        let mut count = 0;
        for dir in dirs {
            let base = match dir.to_file_path() {
                Ok(b) => b,
                Err(_) => return Err(Box::new(crate::lang::Error::BadUrl))
            };
            let opt = glob::MatchOptions {
                case_sensitive: false,
                require_literal_leading_dot: false,
                require_literal_separator: false
            };
            log::debug!("scanning {}",dir.as_str());
            for ext in extensions {
                let patt = base.join("**").join(["*.",ext.as_str()].concat());
                let globable = match patt.as_os_str().to_str() {
                    Some(s) => s.to_string(),
                    None => {
                        log::warn!("directory {} could not be globbed",dir.as_str());
                        continue;
                    }
                };
                let paths = match glob::glob_with(&globable,opt) {
                    Ok(p) => p,
                    Err(e) => {
                        log::warn!("bad pattern {}: {}",globable,e);
                        continue;
                    }
                };
                for entry in paths {
                    if let Ok(path) = &entry {
                        match Document::from_file_path(path) {
                            Ok(doc) => {
                                log::trace!("{}",doc.uri.as_str());
                                self.ws.update_doc(&doc);
                            },
                            Err(e) => log::warn!("skipping {}: {}",path.display(),e)
                        }
                    }
                    count += 1;
                    if count >= max_files {
                        return Err(Box::new(crate::lang::Error::OutOfRange));
                    }
                }
            }
        }
        log::info!("there were {} sources in the workspace",count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(uri: &str,text: &str) -> Document {
        Document::new(lsp::Url::parse(uri).expect("bad url"),Some(1),text.to_string())
    }

    #[test]
    fn segment_quality() {
        let uri = lsp::Url::parse("file:///ws/lib/Common.DEF").expect("bad url");
        assert_eq!(match_reference(&reference_segments("common.def"),&uri),1);
        assert_eq!(match_reference(&reference_segments("LIB/common.def"),&uri),2);
        assert_eq!(match_reference(&reference_segments("other/common.def"),&uri),1);
        assert_eq!(match_reference(&reference_segments("x.def"),&uri),0);
    }

    #[test]
    fn prefers_local_directory() {
        let mut ws = Workspace::new();
        ws.update_doc(&doc("file:///ws/a/tools.def","@T 1"));
        ws.update_doc(&doc("file:///ws/b/tools.def","@T 2"));
        let from = lsp::Url::parse("file:///ws/b/main.src").expect("bad url");
        let found = ws.resolve_reference("TOOLS.DEF",&from).expect("not found");
        assert_eq!(found.as_str(),"file:///ws/b/tools.def");
        let from = lsp::Url::parse("file:///ws/a/main.src").expect("bad url");
        let found = ws.resolve_reference("tools.def",&from).expect("not found");
        assert_eq!(found.as_str(),"file:///ws/a/tools.def");
        assert!(ws.resolve_reference("missing.def",&from).is_none());
    }

    #[test]
    fn self_include_is_refused() {
        let mut ws = Workspace::new();
        ws.update_doc(&doc("file:///ws/loop.def","$INCLUDE loop.def\n@A 1\n"));
        let uri = lsp::Url::parse("file:///ws/loop.def").expect("bad url");
        let parsed = ws.get(&uri).expect("parse failed");
        assert_eq!(parsed.ast.declarations().len(),1);
    }

    #[test]
    fn cache_follows_version() {
        let mut ws = Workspace::new();
        ws.update_doc(&doc("file:///ws/a.def","@A 1\n"));
        let uri = lsp::Url::parse("file:///ws/a.def").expect("bad url");
        let first = ws.get(&uri).expect("parse failed");
        let second = ws.get(&uri).expect("parse failed");
        assert!(Arc::ptr_eq(&first.ast,&second.ast));
        let mut changed = doc("file:///ws/a.def","@A 1\n@B 2\n");
        changed.version = Some(2);
        ws.update_doc(&changed);
        let third = ws.get(&uri).expect("parse failed");
        assert_eq!(third.ast.declarations().len(),2);
    }

    #[test]
    fn gather_from_folder() {
        let dir = tempfile::tempdir().expect("no temp dir");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir failed");
        std::fs::write(dir.path().join("main.src"),"O1000\nG01 X1\n").expect("write failed");
        std::fs::write(dir.path().join("sub").join("defs.DEF"),"@A 1\n").expect("write failed");
        std::fs::write(dir.path().join("notes.txt"),"nothing").expect("write failed");
        let folder = lsp::Url::from_directory_path(dir.path().canonicalize().expect("canon")).expect("bad url");
        let mut scanner = WorkspaceScanner::new();
        let exts = vec!["src".to_string(),"def".to_string(),"lnk".to_string()];
        scanner.gather_docs(&vec![folder.clone()],100,&exts).expect("gather failed");
        assert_eq!(scanner.get_workspace().doc_count(),2);
        assert!(scanner.gather_docs(&vec![folder],1,&exts).is_err());
    }
}
