//! Parse settings string sent by any client.
//!
//! The analyzer checks for specific keys that affect its operation.
//! Unknown keys are ignored, as are values of the wrong type.

use serde_json;
use crate::DYNERR;
use crate::lang::{update_json_i64,update_json_severity,update_json_vec_str};
use lsp_types::DiagnosticSeverity;
use super::ast::IssueCode;

#[derive(Clone)]
pub struct Flag {
    pub unknown_symbol: Option<DiagnosticSeverity>,
    pub incompatible_symbol: Option<DiagnosticSeverity>,
    pub unknown_keyword: Option<DiagnosticSeverity>,
    pub nested_substitution: Option<DiagnosticSeverity>,
    pub bad_string: Option<DiagnosticSeverity>
}
#[derive(Clone)]
pub struct Workspace {
    pub max_files: i64,
    pub extensions: Vec<String>
}
#[derive(Clone)]
pub struct Settings {
    pub flag: Flag,
    pub workspace: Workspace
}

impl Settings {
    pub fn new() -> Self {
        Self {
            flag: Flag {
                unknown_symbol: Some(IssueCode::UnknownSymbol.severity()),
                incompatible_symbol: Some(IssueCode::IncompatibleSymbol.severity()),
                unknown_keyword: Some(IssueCode::UnknownKeyword.severity()),
                nested_substitution: Some(IssueCode::NestedSubstitution.severity()),
                bad_string: Some(IssueCode::BadString.severity())
            },
            workspace: Workspace {
                max_files: 1000,
                extensions: vec!["src".to_string(),"def".to_string(),"lnk".to_string()]
            }
        }
    }
    /// Severity to report for the issue, None means the issue is not reported.
    pub fn severity(&self,code: IssueCode) -> Option<DiagnosticSeverity> {
        match code {
            IssueCode::UnknownSymbol => self.flag.unknown_symbol,
            IssueCode::IncompatibleSymbol => self.flag.incompatible_symbol,
            IssueCode::UnknownKeyword => self.flag.unknown_keyword,
            IssueCode::NestedSubstitution => self.flag.nested_substitution,
            IssueCode::BadString => self.flag.bad_string,
            _ => Some(code.severity())
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if let Some(obj) = root.as_object() {
        for (key,val) in obj {
            match key.as_str() {
                "flag" => {
                    update_json_severity(val,"unknownSymbol",&mut ans.flag.unknown_symbol);
                    update_json_severity(val,"incompatibleSymbol",&mut ans.flag.incompatible_symbol);
                    update_json_severity(val,"unknownKeyword",&mut ans.flag.unknown_keyword);
                    update_json_severity(val,"nestedSubstitution",&mut ans.flag.nested_substitution);
                    update_json_severity(val,"badString",&mut ans.flag.bad_string);
                },
                "workspace" => {
                    update_json_i64(val,"maxFiles",&mut ans.workspace.max_files);
                    update_json_vec_str(val,"extensions",&mut ans.workspace.extensions);
                },
                _ => {}
            }
        }
    }
    Ok(ans)
}
