use lsp_types as lsp;
use super::{doc,parse_with,parse_src,codes,child_kinds,only,shape};
use crate::lang::macrob::ast::NodeKind;
use crate::lang::macrob::declarations::ValueKind;
use crate::lang::macrob::diagnostics::workspace::Workspace;
use crate::lang::macrob::{FileProvider,NoFiles};

fn url(s: &str) -> lsp::Url {
    lsp::Url::parse(s).expect("bad url")
}

mod def_files {
    use super::*;
    #[test]
    fn value_kinds() {
        let src = "@TOOL 5\n@SPEED #500\n@DRILL G81\n@COOL M08\n@OFF [10+2]\n>LOOP 100\n@XP X10.\n>HOME START\n";
        let ast = parse_with("file:///tools.def",src,&NoFiles);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let decls = ast.declarations();
        let summary: Vec<(String,ValueKind,bool)> = decls.iter().map(|d| (d.name.clone(),d.kind,d.is_label)).collect();
        assert_eq!(summary,vec![
            ("TOOL".to_string(),ValueKind::Numeric,false),
            ("SPEED".to_string(),ValueKind::MacroValue,false),
            ("DRILL".to_string(),ValueKind::NcCode,false),
            ("COOL".to_string(),ValueKind::MFunc,false),
            ("OFF".to_string(),ValueKind::Constant,false),
            ("LOOP".to_string(),ValueKind::Numeric,true),
            ("XP".to_string(),ValueKind::Address,false),
            ("HOME".to_string(),ValueKind::String,true)
        ]);
        let values: Vec<NodeKind> = ast.children(ast.root()).iter().map(|d| ast.node(ast.children(*d)[1]).kind).collect();
        assert_eq!(values,vec![
            NodeKind::Numeric,
            NodeKind::Variable,
            NodeKind::NcCode,
            NodeKind::NcCode,
            NodeKind::Bracket,
            NodeKind::Numeric,
            NodeKind::Address,
            NodeKind::StringLiteral
        ]);
    }
    #[test]
    fn declaration_nodes() {
        let ast = parse_with("file:///tools.def","@TOOL 5\n",&NoFiles);
        let decl = only(&ast,ast.root());
        assert_eq!(ast.node(decl).kind,NodeKind::SymbolDeclaration);
        assert_eq!(ast.node(decl).text,"TOOL");
        assert_eq!(child_kinds(&ast,decl),vec![NodeKind::Symbol,NodeKind::Numeric]);
        let value = ast.children(decl)[1];
        assert_eq!(ast.node(value).text,"5");
        assert_eq!(ast.node(value).offset,6);
        let d = ast.node(decl).decl.clone().expect("declaration missing");
        assert_eq!(d.node,decl);
        assert_eq!((d.offset,d.len),(1,4));
    }
    #[test]
    fn single_letter_name() {
        let ast = parse_with("file:///tools.def","@X 10\n",&NoFiles);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let d = &ast.declarations()[0];
        assert_eq!(d.name,"X");
        assert_eq!(d.value,"10");
    }
    #[test]
    fn not_a_declaration() {
        let ast = parse_with("file:///tools.def","@TOOL 5\nG01 X1\n",&NoFiles);
        assert_eq!(codes(&ast),vec!["declaration-expected"]);
        assert_eq!(ast.declarations().len(),1);
    }
    #[test]
    fn missing_value() {
        let ast = parse_with("file:///tools.def","@A\n@B 2\n",&NoFiles);
        assert_eq!(codes(&ast),vec!["value-expected"]);
        assert_eq!(ast.declarations().len(),1);
    }
    #[test]
    fn comments_allowed() {
        let ast = parse_with("file:///tools.def","(TOOLING)\n@T1 1\n",&NoFiles);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::Comment,NodeKind::SymbolDeclaration]);
    }
}

mod substitution {
    use super::*;
    #[test]
    fn local_declaration() {
        let ast = parse_src("@TOOL 5\nT TOOL\n#1 = TOOL + 1\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::SymbolDeclaration,NodeKind::NcStatement,NodeKind::Assignment]);
        assert_eq!(ast.program,"@TOOL 5\nT 5\n#1 = 5 + 1\n");
    }
    #[test]
    fn nc_code_symbol() {
        let ast = parse_src("@DRILL G81\nDRILL X1\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = ast.children(ast.root())[1];
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::NcCode,NodeKind::Address]);
        let code = ast.children(stmt)[0];
        assert_eq!(ast.node(code).text,"G81");
        assert!(ast.node(code).decl.is_some());
    }
    #[test]
    fn incompatible_use() {
        let ast = parse_src("@DRILL G81\n#1 = DRILL\n");
        assert_eq!(codes(&ast),vec!["incompatible-symbol"]);
    }
    #[test]
    fn later_declaration_wins() {
        let ast = parse_src("@A 1\n@A 2\n#1 = A\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert!(ast.program.ends_with("#1 = 2\n"));
    }
    #[test]
    fn names_are_case_sensitive() {
        let ast = parse_src("@Feed 10\n#1 = FEED\n");
        assert_eq!(codes(&ast),vec!["unknown-symbol"]);
    }
    #[test]
    fn labels() {
        let ast = parse_src(">TOP 100\nTOP G01\nGOTO TOP\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::LabelDeclaration,NodeKind::Label,NodeKind::NcStatement,NodeKind::GotoStatement]);
        let kids = ast.children(ast.root()).to_vec();
        assert_eq!(ast.node(kids[1]).text,"TOP");
        let target = only(&ast,kids[3]);
        assert_eq!(ast.node(target).kind,NodeKind::Numeric);
        assert_eq!(ast.node(target).text,"100");
        assert_eq!(ast.program,">TOP 100\n100 G01\nGOTO 100\n");
    }
    #[test]
    fn nested_is_not_expanded() {
        let ast = parse_src("@BB 1\n@AA BB\n#1 = AA\n");
        assert_eq!(codes(&ast),vec!["nested-substitution"]);
    }
}

mod includes {
    use super::*;
    fn workspace(def: &str,src: &str) -> Workspace {
        let mut ws = Workspace::new();
        ws.update_doc(&doc("file:///proj/a.def",def));
        ws.update_doc(&doc("file:///proj/b.src",src));
        ws
    }
    #[test]
    fn included_symbol() {
        let src = "$INCLUDE a.def\nvar = 1\n";
        let ws = workspace("@var 100\n",src);
        let ast = parse_with("file:///proj/b.src",src,&ws);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::Include,NodeKind::Assignment]);
        assert_eq!(ast.includes,vec![url("file:///proj/a.def")]);
        let assignment = ast.children(ast.root())[1];
        let var = ast.children(assignment)[0];
        assert_eq!(ast.node(var).kind,NodeKind::Variable);
        let decl = ast.node(var).decl.clone().expect("no declaration");
        assert_eq!(decl.name,"var");
        assert_eq!(decl.uri,url("file:///proj/a.def"));
        let def = ws.get(&url("file:///proj/a.def")).expect("definition not parsed");
        assert_eq!(def.ast.node(decl.node).kind,NodeKind::SymbolDeclaration);
        assert_eq!(def.ast.node(decl.node).text,"var");
    }
    #[test]
    fn same_tree_as_local() {
        let src = "$INCLUDE a.def\nvar = 1\n";
        let ws = workspace("@var 100\n",src);
        let included = parse_with("file:///proj/b.src",src,&ws);
        let local = parse_src("@var 100\nvar = 1\n");
        let a = included.children(included.root())[1];
        let b = local.children(local.root())[1];
        assert_eq!(shape(&included,a),shape(&local,b));
    }
    #[test]
    fn chained_includes() {
        let mut ws = Workspace::new();
        ws.update_doc(&doc("file:///proj/c.def","@BAR 5\n"));
        ws.update_doc(&doc("file:///proj/a.def","$INCLUDE c.def\n@FOO 1\n"));
        let src = "$INCLUDE a.def\n#1 = BAR\n#2 = FOO\n";
        ws.update_doc(&doc("file:///proj/b.src",src));
        let ast = parse_with("file:///proj/b.src",src,&ws);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert!(ast.program.ends_with("#1 = 5\n#2 = 1\n"));
        let assignment = ast.children(ast.root())[1];
        let value = ast.children(assignment)[1];
        let decl = ast.node(value).decl.clone().expect("no declaration");
        assert_eq!(decl.name,"BAR");
        assert_eq!(decl.uri,url("file:///proj/c.def"));
        assert_eq!(ast.includes,vec![url("file:///proj/a.def"),url("file:///proj/c.def")]);
        let def = ws.get(&url("file:///proj/a.def")).expect("definition not parsed");
        let names: Vec<String> = def.ast.declarations().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names,vec!["BAR".to_string(),"FOO".to_string()]);
    }
    #[test]
    fn missing_include() {
        let ast = parse_with("file:///proj/b.src","$INCLUDE nothere.def\n#1 = 1\n",&NoFiles);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert!(ast.includes.is_empty());
        assert_eq!(ast.node(ast.children(ast.root())[0]).text,"nothere.def");
    }
    #[test]
    fn include_needs_definition() {
        let ast = parse_src("$INCLUDE a.src\n");
        assert_eq!(codes(&ast),vec!["definition-expected"]);
        let ast = parse_src("$INCLUDE\n");
        assert_eq!(codes(&ast),vec!["definition-expected"]);
    }
    #[test]
    fn directive_case() {
        let ast = parse_src("$include a.def\n");
        assert_eq!(codes(&ast),vec!["unknown-keyword"]);
        // the wrong case directive does not import
        let src = "$include a.def\n#1 = FOO\n";
        let ws = workspace("@FOO 1\n",src);
        let ast = parse_with("file:///proj/b.src",src,&ws);
        assert_eq!(codes(&ast),vec!["unknown-keyword","unknown-symbol"]);
        assert!(ast.includes.is_empty());
        let ast = parse_src("$NOLIST\nG01\n$LIST\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::ListDirective,NodeKind::NcStatement,NodeKind::ListDirective]);
    }
}

mod linker {
    use super::*;
    #[test]
    fn settings_and_modules() {
        let ast = parse_with("file:///proj/build.lnk","; linker\nBASE = 1000\nmain.src\nlib/util.src\n",&NoFiles);
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::LinkSetting,NodeKind::LinkModule,NodeKind::LinkModule]);
        let kids = ast.children(ast.root()).to_vec();
        assert_eq!(ast.node(kids[0]).text,"BASE");
        assert_eq!(ast.node(only(&ast,kids[0])).text,"1000");
        assert_eq!(ast.node(kids[1]).text,"main.src");
        assert_eq!(ast.node(kids[2]).text,"lib/util.src");
    }
    #[test]
    fn setting_without_value() {
        let ast = parse_with("file:///proj/build.lnk","BASE =\n",&NoFiles);
        assert_eq!(codes(&ast),vec!["value-expected"]);
    }
}
