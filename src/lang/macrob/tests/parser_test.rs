use super::{parse_src,codes,child_kinds,only};
use crate::lang::macrob::ast::{NodeKind,Op};

mod nc_blocks {
    use super::*;
    #[test]
    fn addresses() {
        let ast = parse_src("G01 X1 Y-1\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::NcStatement);
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::NcCode,NodeKind::Address,NodeKind::Address]);
        let words = ast.children(stmt).to_vec();
        assert_eq!(ast.node(words[0]).text,"G01");
        assert_eq!(ast.node(words[1]).text,"X");
        assert_eq!(ast.node(only(&ast,words[1])).text,"1");
        assert_eq!(ast.node(words[2]).text,"Y");
        let neg = only(&ast,words[2]);
        assert_eq!(ast.node(neg).kind,NodeKind::Unary(Op::Neg));
        assert_eq!(ast.node(only(&ast,neg)).kind,NodeKind::Numeric);
    }
    #[test]
    fn program_and_sequence() {
        let ast = parse_src("O1000 (MAIN)\nN10 G00 X0\nM30\n%\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let prog = only(&ast,ast.root());
        assert_eq!(ast.node(prog).kind,NodeKind::Program);
        assert_eq!(ast.node(prog).text,"1000");
        assert_eq!(child_kinds(&ast,prog),vec![NodeKind::Comment,NodeKind::SequenceNumber,NodeKind::NcStatement,NodeKind::NcStatement]);
        assert_eq!(ast.node(ast.children(prog)[1]).text,"10");
    }
    #[test]
    fn two_programs() {
        let ast = parse_src("O1\nG00\nO2\nG01\n");
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::Program,NodeKind::Program]);
    }
    #[test]
    fn block_skip() {
        let ast = parse_src("/N20 M01\n");
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::BlockSkip,NodeKind::SequenceNumber,NodeKind::NcStatement]);
    }
    #[test]
    fn unterminated_comment() {
        let ast = parse_src("G01 (open\nG00\n");
        assert_eq!(codes(&ast),vec!["bad-string"]);
    }
    #[test]
    fn missing_program_number() {
        let ast = parse_src("O\nG00\n");
        assert_eq!(codes(&ast),vec!["program-number-expected"]);
    }
}

mod assignments {
    use super::*;
    #[test]
    fn numbered_variable() {
        let ast = parse_src("#1 = 1");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::Assignment);
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Variable,NodeKind::Numeric]);
        let var = ast.children(stmt)[0];
        assert_eq!(ast.node(only(&ast,var)).text,"1");
    }
    #[test]
    fn trailing_comment() {
        let ast = parse_src("#1 = 1 ; set\nG01\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(child_kinds(&ast,ast.root()),vec![NodeKind::Assignment,NodeKind::NcStatement]);
        assert_eq!(ast.program,"#1 = 1\nG01\n");
    }
    #[test]
    fn precedence() {
        let ast = parse_src("#1 = 1 + 2 * 3\n");
        let stmt = only(&ast,ast.root());
        let sum = ast.children(stmt)[1];
        assert_eq!(ast.node(sum).kind,NodeKind::Binary(Op::Add));
        assert_eq!(child_kinds(&ast,sum),vec![NodeKind::Numeric,NodeKind::Binary(Op::Mul)]);
    }
    #[test]
    fn keyword_operators() {
        let ast = parse_src("#1 = #2 AND 3 OR 4\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        let or = ast.children(stmt)[1];
        assert_eq!(ast.node(or).kind,NodeKind::Binary(Op::Or));
        assert_eq!(child_kinds(&ast,or),vec![NodeKind::Binary(Op::And),NodeKind::Numeric]);
    }
    #[test]
    fn indirect_variable() {
        let ast = parse_src("#[#1+1] = SIN[30]\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Variable,NodeKind::FunctionCall]);
        let var = ast.children(stmt)[0];
        assert_eq!(ast.node(only(&ast,var)).kind,NodeKind::Bracket);
        assert_eq!(ast.node(ast.children(stmt)[1]).text,"SIN");
    }
    #[test]
    fn missing_equals() {
        let ast = parse_src("#1 2\n");
        assert_eq!(codes(&ast),vec!["equals-expected"]);
        assert_eq!(ast.node(only(&ast,ast.root())).kind,NodeKind::Assignment);
    }
    #[test]
    fn trailing_tokens() {
        let ast = parse_src("#1 = 1 2\n");
        assert_eq!(codes(&ast),vec!["newline-expected"]);
    }
    #[test]
    fn undeclared_symbol() {
        let ast = parse_src("#1 = FOO\n");
        assert_eq!(codes(&ast),vec!["unknown-symbol"]);
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(ast.children(stmt)[1]).kind,NodeKind::Symbol);
    }
    #[test]
    fn keyword_prefix_is_a_symbol() {
        let ast = parse_src("#1 = THEN1\n");
        assert_eq!(codes(&ast),vec!["unknown-symbol"]);
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(ast.children(stmt)[1]).text,"THEN1");
    }
}

mod control {
    use super::*;
    #[test]
    fn if_then_single() {
        let ast = parse_src("IF [1 EQ 1] THEN #1 = 1");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::IfStatement);
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Conditional(Op::Eq),NodeKind::ThenBlock]);
        let then = ast.children(stmt)[1];
        assert_eq!(ast.node(only(&ast,then)).kind,NodeKind::Assignment);
    }
    #[test]
    fn then_declared_variable() {
        let ast = parse_src("@CNT 100\nIF [1 EQ 1] THEN CNT = 2\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = ast.children(ast.root())[1];
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Conditional(Op::Eq),NodeKind::ThenBlock]);
        let then = ast.children(stmt)[1];
        assert_eq!(ast.node(only(&ast,then)).kind,NodeKind::Assignment);
        let ast = parse_src("@SPEED #500\nIF [1 EQ 1] THEN SPEED = 2\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
    }
    #[test]
    fn then_nc_code_symbol() {
        // an NC code symbol cannot be assigned, so this is the block form
        let ast = parse_src("@DRILL G81\nIF [1 EQ 1] THEN DRILL X1\nG00\nENDIF\n");
        assert_eq!(codes(&ast),vec!["newline-expected"]);
        let stmt = ast.children(ast.root())[1];
        assert_eq!(ast.node(stmt).kind,NodeKind::IfStatement);
        let then = ast.children(stmt)[1];
        assert_eq!(ast.node(then).kind,NodeKind::ThenBlock);
        assert_eq!(child_kinds(&ast,then),vec![NodeKind::NcStatement]);
    }
    #[test]
    fn if_incomplete() {
        let ast = parse_src("IF [");
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::IfStatement);
        let issues = ast.collect_issues();
        assert_eq!(issues.len(),1);
        assert_eq!(issues[0].code.id(),"expression-expected");
        assert_eq!(issues[0].offset,4);
    }
    #[test]
    fn if_goto() {
        let ast = parse_src("IF [#1 GT 0] GOTO 100\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Conditional(Op::Gt),NodeKind::GotoStatement]);
        let goto = ast.children(stmt)[1];
        assert_eq!(ast.node(only(&ast,goto)).text,"100");
    }
    #[test]
    fn if_else_block() {
        let ast = parse_src("IF [#1 GT 0] THEN\n#2 = 1\nELSE\n#2 = 2\nENDIF\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Conditional(Op::Gt),NodeKind::ThenBlock,NodeKind::ElseBlock]);
        let els = ast.children(stmt)[2];
        let body = only(&ast,els);
        assert_eq!(child_kinds(&ast,body),vec![NodeKind::Assignment]);
    }
    #[test]
    fn missing_endif() {
        let ast = parse_src("IF [1] THEN\nG01\n");
        assert_eq!(codes(&ast),vec!["endif-expected"]);
    }
    #[test]
    fn logical_condition() {
        let ast = parse_src("IF [#1 EQ 1 || #2 LT 3] THEN #3 = 0\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        let cond = ast.children(stmt)[0];
        assert_eq!(ast.node(cond).kind,NodeKind::Conditional(Op::LogicalOr));
        assert_eq!(child_kinds(&ast,cond),vec![NodeKind::Conditional(Op::Eq),NodeKind::Conditional(Op::Lt)]);
    }
    #[test]
    fn while_loop() {
        let ast = parse_src("WHILE [1] DO 1\nG01\nEND 1");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::WhileStatement);
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::Numeric,NodeKind::DoLabel,NodeKind::Block,NodeKind::EndLabel]);
        let kids = ast.children(stmt).to_vec();
        assert_eq!(ast.node(kids[1]).text,"1");
        assert_eq!(child_kinds(&ast,kids[2]),vec![NodeKind::NcStatement]);
        assert_eq!(ast.node(kids[3]).text,"1");
    }
    #[test]
    fn while_label_mismatch() {
        let ast = parse_src("WHILE [1] DO 1\nEND 2\n");
        assert_eq!(codes(&ast),vec!["label-mismatch"]);
    }
    #[test]
    fn while_without_end() {
        let ast = parse_src("WHILE [1] DO 1\nG01\n");
        assert_eq!(codes(&ast),vec!["end-expected"]);
    }
    #[test]
    fn stray_keyword() {
        let ast = parse_src("ENDIF\n");
        assert_eq!(codes(&ast),vec!["unexpected-keyword"]);
    }
}

mod commands {
    use super::*;
    #[test]
    fn dprnt() {
        let ast = parse_src("DPRNT[X#1[53]]\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        let stmt = only(&ast,ast.root());
        assert_eq!(ast.node(stmt).kind,NodeKind::CommandStatement);
        assert_eq!(ast.node(stmt).text,"DPRNT");
        assert_eq!(child_kinds(&ast,stmt),vec![NodeKind::FunctionText,NodeKind::Variable]);
        let var = ast.children(stmt)[1];
        assert_eq!(child_kinds(&ast,var),vec![NodeKind::Numeric,NodeKind::Bracket]);
    }
    #[test]
    fn popen() {
        let ast = parse_src("POPEN\n");
        assert_eq!(codes(&ast),Vec::<&str>::new());
        assert_eq!(ast.node(only(&ast,ast.root())).kind,NodeKind::CommandStatement);
    }
    #[test]
    fn atan_forms() {
        for src in ["#1 = ATAN[#2]/[#3]\n","#1 = ATAN[#2,#3]\n","#1 = ATAN[#2]\n"] {
            let ast = parse_src(src);
            assert_eq!(codes(&ast),Vec::<&str>::new(),"{}",src);
            let stmt = only(&ast,ast.root());
            assert_eq!(ast.node(ast.children(stmt)[1]).kind,NodeKind::FunctionCall,"{}",src);
        }
    }
}

mod queries {
    use super::*;
    #[test]
    fn node_at_and_ancestor() {
        let ast = parse_src("G01 X1 Y-1\n");
        let id = ast.node_at(5).expect("no node");
        assert_eq!(ast.node(id).kind,NodeKind::Numeric);
        let stmt = ast.ancestor(id,|k| *k == NodeKind::NcStatement).expect("no ancestor");
        assert_eq!(ast.parent(stmt),Some(ast.root()));
        assert!(ast.ancestor(id,|k| *k == NodeKind::WhileStatement).is_none());
        assert!(ast.node_at(100).is_none());
    }
    #[test]
    fn find_kinds() {
        let ast = parse_src("#1 = 1\n#2 = 2\nG01\n");
        assert_eq!(ast.find_all(NodeKind::Assignment).len(),2);
        assert_eq!(ast.find_all(NodeKind::NcStatement).len(),1);
    }
}
