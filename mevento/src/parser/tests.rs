//! Parser tests for Mevento language features

use crate::ast::{BinOp, Binding, Direction, Expr, Literal, LogicalOp, Node, Program, UnOp};
use crate::error::CompileError;
use crate::parser::parse;
use pretty_assertions::assert_eq;

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse(source).expect("Parse should succeed")
}

/// Helper to parse and expect failure
fn parse_err(source: &str) -> CompileError {
    parse(source).expect_err("Parse should fail")
}

/// Expression inside the `index`th top-level statement
fn stmt(prog: &Program, index: usize) -> &Expr {
    match &prog.body[index].node {
        Expr::ExprStmt(inner) => &inner.node,
        other => other,
    }
}

fn unwrap_stmt(node: &Node) -> &Expr {
    match &node.node {
        Expr::ExprStmt(inner) => &inner.node,
        other => other,
    }
}

// ============================================
// Literals and identifiers
// ============================================

#[test]
fn test_parse_empty_program() {
    let prog = parse_ok("");
    assert!(prog.body.is_empty());
    assert_eq!(prog.name, "<module>");
}

#[test]
fn test_parse_literals() {
    let prog = parse_ok("12; 1.5; 'x'; true; false; null");
    assert_eq!(stmt(&prog, 0), &Expr::Literal(Literal::Int(12)));
    assert_eq!(stmt(&prog, 1), &Expr::Literal(Literal::Float(1.5)));
    assert_eq!(stmt(&prog, 2), &Expr::Literal(Literal::Str("x".into())));
    assert_eq!(stmt(&prog, 3), &Expr::Literal(Literal::Bool(true)));
    assert_eq!(stmt(&prog, 4), &Expr::Literal(Literal::Bool(false)));
    assert_eq!(stmt(&prog, 5), &Expr::Literal(Literal::Null));
}

#[test]
fn test_parse_statement_separators() {
    let prog = parse_ok("a = 1\nb = 2;c = 3\r\n\n");
    assert_eq!(prog.body.len(), 3);
}

#[test]
fn test_parse_keeps_source() {
    let prog = parse_ok("a = 1");
    assert_eq!(prog.source, "a = 1");
}

// ============================================
// Operators
// ============================================

#[test]
fn test_parse_precedence_mul_over_add() {
    let prog = parse_ok("1 + 2 * 3");
    let Expr::Binary { op, right, .. } = stmt(&prog, 0) else {
        panic!("Expected Binary");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(right.node, Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn test_parse_left_associative() {
    let prog = parse_ok("10 - 4 - 3");
    let Expr::Binary { left, op, right } = stmt(&prog, 0) else {
        panic!("Expected Binary");
    };
    assert_eq!(*op, BinOp::Sub);
    assert!(matches!(left.node, Expr::Binary { op: BinOp::Sub, .. }));
    assert_eq!(right.node, Expr::Literal(Literal::Int(3)));
}

#[test]
fn test_parse_comparison_lowest() {
    let prog = parse_ok("a + 1 >= b * 2");
    assert!(matches!(stmt(&prog, 0), Expr::Binary { op: BinOp::Ge, .. }));
}

#[test]
fn test_parse_logical_after_comparison() {
    let prog = parse_ok("a == 1 && b || c ?? d");
    let Expr::Logical { left, op, .. } = stmt(&prog, 0) else {
        panic!("Expected Logical");
    };
    assert_eq!(*op, LogicalOp::Nullish);
    let Expr::Logical { left, op, .. } = &left.node else {
        panic!("Expected nested Logical");
    };
    assert_eq!(*op, LogicalOp::Or);
    assert!(matches!(left.node, Expr::Logical { op: LogicalOp::And, .. }));
}

#[test]
fn test_parse_unary() {
    let prog = parse_ok("!(a == 12); -x; +y");
    assert!(matches!(stmt(&prog, 0), Expr::Unary { op: UnOp::Not, .. }));
    assert!(matches!(stmt(&prog, 1), Expr::Unary { op: UnOp::Neg, .. }));
    assert!(matches!(stmt(&prog, 2), Expr::Unary { op: UnOp::Plus, .. }));
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let prog = parse_ok("-a * b");
    let Expr::Binary { left, .. } = stmt(&prog, 0) else {
        panic!("Expected Binary");
    };
    assert!(matches!(left.node, Expr::Unary { op: UnOp::Neg, .. }));
}

// ============================================
// Assignment
// ============================================

#[test]
fn test_parse_assignment_is_right_associative() {
    let prog = parse_ok("a = b = 3");
    let Expr::Assign { target, value } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    assert_eq!(target.node, Expr::Ident("a".into()));
    assert!(matches!(value.node, Expr::Assign { .. }));
}

#[test]
fn test_parse_index_assignment() {
    let prog = parse_ok("obj['key'] = 20");
    let Expr::Assign { target, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    assert!(matches!(target.node, Expr::Index { .. }));
}

#[test]
fn test_parse_invalid_assignment_target() {
    let err = parse_err("1 + 2 = 3");
    assert!(err.message().contains("invalid assignment target"));
}

#[test]
fn test_parse_call_result_is_not_assignable() {
    let err = parse_err("f() = 3");
    assert!(err.message().contains("invalid assignment target"));
}

// ============================================
// Calls, indexing, literals
// ============================================

#[test]
fn test_parse_call() {
    let prog = parse_ok("log(a, 'x',\n 3,)");
    let Expr::Call { callee, args } = stmt(&prog, 0) else {
        panic!("Expected Call");
    };
    assert_eq!(callee.node, "log");
    assert_eq!(args.len(), 3);
}

#[test]
fn test_parse_call_requires_identifier() {
    let err = parse_err("a[0](1)");
    assert!(err.message().contains("only a bare identifier can be called"));
}

#[test]
fn test_parse_chained_index() {
    let prog = parse_ok("m['a'][0]");
    let Expr::Index { owner, key } = stmt(&prog, 0) else {
        panic!("Expected Index");
    };
    assert!(matches!(owner.node, Expr::Index { .. }));
    assert_eq!(key.node, Expr::Literal(Literal::Int(0)));
}

#[test]
fn test_parse_array_literal_trailing_comma() {
    let prog = parse_ok("x = [\n 'key',\n 'molo',\n 12,\n]");
    let Expr::Assign { value, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    let Expr::Array(items) = &value.node else {
        panic!("Expected Array");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn test_parse_object_keys() {
    let prog = parse_ok("o = {'a': 1, b: 2, [k]: 3,\n}");
    let Expr::Assign { value, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    let Expr::Object(props) = &value.node else {
        panic!("Expected Object");
    };
    assert_eq!(props.len(), 3);
    assert_eq!(props[0].key.node, Expr::Literal(Literal::Str("a".into())));
    assert_eq!(props[1].key.node, Expr::Literal(Literal::Str("b".into())));
    assert_eq!(props[2].key.node, Expr::Ident("k".into()));
}

#[test]
fn test_parse_empty_containers() {
    let prog = parse_ok("a = []; b = {}");
    assert!(matches!(stmt(&prog, 0), Expr::Assign { value, .. } if value.node == Expr::Array(vec![])));
    assert!(matches!(stmt(&prog, 1), Expr::Assign { value, .. } if value.node == Expr::Object(vec![])));
}

#[test]
fn test_parse_object_bad_key() {
    let err = parse_err("o = {1: 2}");
    assert!(err.message().contains("property key"));
}

// ============================================
// Blocks and conditionals
// ============================================

#[test]
fn test_parse_block_statement() {
    let prog = parse_ok("{ a = 1; b = 2 }");
    let Expr::Block(stmts) = &prog.body[0].node else {
        panic!("Expected Block");
    };
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_parse_empty_block() {
    let prog = parse_ok("{}");
    assert_eq!(prog.body[0].node, Expr::Block(vec![]));
}

#[test]
fn test_parse_if_with_parens_and_block() {
    let prog = parse_ok("if(a >= 10) {\n b = a;\n c = b + 1\n}");
    let Expr::If {
        cond,
        then_branch,
        else_branch,
    } = &prog.body[0].node
    else {
        panic!("Expected If");
    };
    assert!(matches!(cond.node, Expr::Binary { op: BinOp::Ge, .. }));
    assert!(matches!(then_branch.node, Expr::Block(ref s) if s.len() == 2));
    assert!(else_branch.is_none());
}

#[test]
fn test_parse_if_without_parens() {
    let prog = parse_ok("if a > 1 { b }");
    assert!(matches!(prog.body[0].node, Expr::If { .. }));
}

#[test]
fn test_parse_if_expression_branches() {
    let prog = parse_ok("x = if (c) 1 else 2");
    let Expr::Assign { value, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    let Expr::If { else_branch, .. } = &value.node else {
        panic!("Expected If");
    };
    assert!(else_branch.is_some());
}

#[test]
fn test_parse_paren_condition_does_not_swallow_branch() {
    let prog = parse_ok("if (a == 1) -1 else 2");
    let Expr::If { then_branch, .. } = &prog.body[0].node else {
        panic!("Expected If");
    };
    assert!(matches!(then_branch.node, Expr::Unary { op: UnOp::Neg, .. }));
}

#[test]
fn test_parse_else_if_chain_across_lines() {
    let prog = parse_ok("if a { 1 }\nelse if b { 2 }\nelse { 3 }");
    assert_eq!(prog.body.len(), 1);
    let Expr::If { else_branch, .. } = &prog.body[0].node else {
        panic!("Expected If");
    };
    let alt = else_branch.as_ref().unwrap();
    assert!(matches!(alt.node, Expr::If { else_branch: Some(_), .. }));
}

#[test]
fn test_parse_brace_terminates_statement() {
    let prog = parse_ok("for a in xs { a }");
    let Expr::ForOf { body, .. } = &prog.body[0].node else {
        panic!("Expected ForOf");
    };
    let Expr::Block(stmts) = &body.node else {
        panic!("Expected Block");
    };
    assert!(matches!(unwrap_stmt(&stmts[0]), Expr::Ident(n) if n == "a"));
}

#[test]
fn test_parse_statements_need_terminator() {
    let err = parse_err("a = 1 b = 2");
    assert!(err.message().contains("expected end of statement"));
}

#[test]
fn test_parse_stray_closing_brace() {
    let err = parse_err("a = 1 }");
    assert!(matches!(err, CompileError::Parser { .. }));
}

#[test]
fn test_parse_unclosed_block() {
    let err = parse_err("{ a = 1");
    assert!(err.message().contains("end of input"));
}

// ============================================
// Loops
// ============================================

#[test]
fn test_parse_while_statement_does_not_retain() {
    let prog = parse_ok("while(a > 0) {\n a = a - 1;\n}");
    assert!(matches!(prog.body[0].node, Expr::While { retain: false, .. }));
}

#[test]
fn test_parse_while_expression_retains() {
    let prog = parse_ok("r = while (a > 0) { a = a - 1 }");
    let Expr::Assign { value, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    assert!(matches!(value.node, Expr::While { retain: true, .. }));
}

#[test]
fn test_parse_counting_for_defaults() {
    let prog = parse_ok("for a = 0 till 100 { s = a }");
    let Expr::For {
        var,
        direction,
        step,
        retain,
        ..
    } = &prog.body[0].node
    else {
        panic!("Expected For");
    };
    assert_eq!(var.node, "a");
    assert_eq!(*direction, Direction::Up);
    assert_eq!(step.node, Expr::Literal(Literal::Int(1)));
    assert!(!*retain);
}

#[test]
fn test_parse_counting_for_full_header() {
    let prog = parse_ok("s = for a = 10 till 0 down with 2 { a }");
    let Expr::Assign { value, .. } = stmt(&prog, 0) else {
        panic!("Expected Assign");
    };
    let Expr::For {
        direction,
        step,
        retain,
        ..
    } = &value.node
    else {
        panic!("Expected For");
    };
    assert_eq!(*direction, Direction::Down);
    assert_eq!(step.node, Expr::Literal(Literal::Int(2)));
    assert!(*retain);
}

#[test]
fn test_parse_for_of_always_retains() {
    let prog = parse_ok("for a in ['molo', 'test'] { b = a }");
    let Expr::ForOf { target, retain, .. } = &prog.body[0].node else {
        panic!("Expected ForOf");
    };
    assert!(matches!(target, Binding::Single(n) if n.node == "a"));
    assert!(*retain);
}

#[test]
fn test_parse_for_of_pair() {
    let prog = parse_ok("for (k, v) in pairs { k }");
    let Expr::ForOf { target, .. } = &prog.body[0].node else {
        panic!("Expected ForOf");
    };
    assert!(matches!(target, Binding::Pair(a, b) if a.node == "k" && b.node == "v"));
}

#[test]
fn test_parse_localized_for() {
    let fr = parse_ok("<fr>\ns = 0;pour a = 0 jusqua 100 mont avec 2 {\n s = s + 1;\n}\ns");
    let bm = parse_ok("<bm>\ns = 0;seginka a = 0 kata 100 kay niin 2 {\n s = s + 1;\n}\ns");
    let en = parse_ok("s = 0;for a = 0 till 100 up with 2 {\n s = s + 1;\n}\ns");
    let shape = |p: &Program| p.body.iter().map(|n| std::mem::discriminant(&n.node)).collect::<Vec<_>>();
    assert_eq!(shape(&fr), shape(&en));
    assert_eq!(shape(&bm), shape(&en));
    assert!(matches!(fr.body[1].node, Expr::For { .. }));
}

#[test]
fn test_parse_for_malformed_header() {
    let err = parse_err("for 1 + 2 { }");
    assert!(err.message().contains("malformed for header"));
}

#[test]
fn test_parse_for_index_variable_rejected() {
    let err = parse_err("for a[0] = 0 till 3 { }");
    assert!(err.message().contains("loop variable must be an identifier"));
}

#[test]
fn test_parse_for_missing_till() {
    let err = parse_err("for a = 0 100 { }");
    assert!(err.message().contains("`till`"));
}

#[test]
fn test_parse_break_continue_in_loop() {
    parse_ok("while a { break }");
    parse_ok("for a in xs { if (a == 2) break; a }");
    parse_ok("for a = 0 till 3 { if (a == 1) { continue; } }");
}

#[test]
fn test_parse_break_outside_loop() {
    let err = parse_err("a = 12;\nif(a == 12) {\n  break\n}\na");
    assert!(err.message().contains("`break` outside of a loop"));
    assert_eq!(err.pos().line, 3);
    assert_eq!(err.pos().column, 3);
}

#[test]
fn test_parse_continue_in_loop_header_rejected() {
    let err = parse_err("while continue { }");
    assert!(err.message().contains("outside of a loop"));
}

#[test]
fn test_parse_localized_break_message_uses_spelling() {
    let err = parse_err("<fr> couper");
    assert!(err.message().contains("`couper` outside of a loop"));
}

#[test]
fn test_parse_return_forms() {
    let prog = parse_ok("return\nreturn 5; x");
    assert_eq!(stmt(&prog, 0), &Expr::Return(None));
    assert!(matches!(stmt(&prog, 1), Expr::Return(Some(_))));
}

// ============================================
// Errors and diagnostics
// ============================================

#[test]
fn test_parse_invalid_character() {
    let err = parse_err("a = 1 @ 2");
    assert_eq!(err.message(), "invalid character `@`");
    assert_eq!(err.pos().column, 7);
}

#[test]
fn test_parse_unexpected_eof() {
    let err = parse_err("a = (1 + 2");
    assert!(err.message().contains("found end of input"));
}

#[test]
fn test_parse_misspelled_keyword_hint() {
    let err = parse_err("wile (a > 0) { a = a - 1 }");
    assert!(err.message().contains("did you mean `while`?"), "{}", err.message());
}

#[test]
fn test_parse_misspelled_localized_keyword_hint() {
    let err = parse_err("<fr>\npor a = 0 jusqua 3 { }");
    assert!(err.message().contains("did you mean `pour`?"), "{}", err.message());
}

#[test]
fn test_parse_lex_error_propagates() {
    let err = parse_err("a = 0x");
    assert!(matches!(err, CompileError::Lexer { .. }));
}

#[test]
fn test_parse_node_positions() {
    let prog = parse_ok("a = 1\n  b = 2");
    assert_eq!(prog.body[1].pos.line, 2);
    assert_eq!(prog.body[1].pos.column, 3);
    assert_eq!(prog.body[0].span.start, 0);
}

#[test]
fn test_parse_error_snapshot() {
    let source = "x = [1, 2\ny = 3";
    let err = parse_err(source);
    insta::assert_snapshot!(err.to_string(), @"Parser error at 2:1: expected `,` or `]`, found identifier `y`");
}

#[test]
fn test_dump() {
    let prog = parse_ok("a = 12\nif a { log(a) }");
    insta::assert_snapshot!(prog.dump().trim_end(), @r"
    Root <module>
      ExpressionStatement @1:1
        Assignment @1:1
          Identifier a @1:1
          Literal 12 @1:5
      If @2:1
        Identifier a @2:4
        Block @2:6
          ExpressionStatement @2:8
            Call log @2:8
              Identifier a @2:12
    ");
}

#[test]
fn test_json_dump() {
    let prog = parse_ok("a = 1");
    let json = prog.to_json().unwrap();
    assert!(json.contains("\"Assign\""));
    assert!(json.contains("\"Int\": 1"));
}
