// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! End-to-end lowering of laid-out trees through the public entry point.

use gravel_common::tracing::init_test_tracing;
use gravel_common::{ErrorKind, ErrorSink, Span};
use gravel_compiler::ast::{ArgumentsKind, CaseStmt, ExprKind, StmtKind, TypeKind};
use gravel_compiler::cst::{ParserDiagnostic, SyntaxTree};
use gravel_compiler::literals::{StringStyle, clean_string_literal, quote};
use gravel_compiler::testing::dsl::*;
use gravel_compiler::testing::lay_out;
use gravel_compiler::{
    Expr, LowerOptions, assert_lowering_error, assert_lowers_ok, assert_unparses, lower,
    render_syntax_error, unparse_expr,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use test_case::test_case;

fn single_expr(statement: gravel_compiler::CstNode) -> Expr {
    init_test_tracing();
    let mut unit = assert_lowers_ok!(unit(vec![statement]));
    match unit.statements.remove(0).kind {
        StmtKind::Expression(e) => e,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn switch_cases(unit: &gravel_compiler::CompilationUnit) -> (&[CaseStmt], bool) {
    match &unit.statements[0].kind {
        StmtKind::Switch { cases, default, .. } => (cases, !default.is_empty()),
        other => panic!("expected switch, got {other:?}"),
    }
}

#[test]
fn test_default_before_case_fails() {
    // switch (x) { case 1: case 2: default: case 3: }
    let tree = unit(vec![switch(
        ident("x"),
        vec![
            group(vec![case(int("1")), case(int("2"))], vec![]),
            group(vec![default_label()], vec![expr_stmt(int("0"))]),
            group(vec![case(int("3"))], vec![expr_stmt(int("3"))]),
        ],
    )]);
    assert_lowering_error!(tree, ErrorKind::Invalid, "default should appear last");
}

#[test]
fn test_duplicate_default_fails() {
    let tree = unit(vec![switch(
        ident("x"),
        vec![
            group(vec![case(int("1"))], vec![]),
            group(vec![default_label()], vec![]),
            group(vec![default_label()], vec![]),
        ],
    )]);
    let error = assert_lowering_error!(
        tree,
        ErrorKind::Invalid,
        "switch statement should have only one default case"
    );
    assert!(error.message().contains("only one default case"));
}

#[test]
fn test_switch_fall_through() {
    init_test_tracing();
    let unit = assert_lowers_ok!(unit(vec![switch(
        ident("x"),
        vec![
            group(vec![case(int("1")), case(int("2"))], vec![expr_stmt(ident("a"))]),
            group(vec![default_label()], vec![expr_stmt(ident("b"))]),
        ],
    )]));
    let (cases, has_default) = switch_cases(&unit);
    assert_eq!(cases.len(), 2);
    assert!(has_default);
    assert_eq!(cases[0].span, cases[1].span);
}

#[test]
fn test_explicit_call_on_receiver() {
    // obj.a(1, 2)
    let e = single_expr(expr_stmt(path(ident("obj"), vec![dot("a"), call(vec![int("1"), int("2")])])));
    let call = e.as_method_call().unwrap();
    assert!(!call.implicit_this);
    assert_eq!(unparse_expr(&call.object), "obj");
    assert_eq!(unparse_expr(&call.method), "a");
    let ArgumentsKind::Positional(args) = &call.arguments.kind else {
        panic!("expected positional arguments");
    };
    assert_eq!(args.iter().map(unparse_expr).collect::<Vec<_>>(), vec!["1", "2"]);
}

#[test]
fn test_safe_property_read() {
    let e = single_expr(expr_stmt(path(ident("obj"), vec![member("?.", "p")])));
    let ExprKind::Property(p) = &e.kind else {
        panic!("expected property, got {e:?}");
    };
    assert!(p.safe);
    assert!(!p.spread_safe);
}

#[test]
fn test_spread_attribute_call_drops_spread() {
    let read = single_expr(expr_stmt(path(ident("obj"), vec![attr("*.", "f")])));
    let ExprKind::Attribute(a) = &read.kind else {
        panic!("expected attribute, got {read:?}");
    };
    assert!(a.spread_safe);

    let called = single_expr(expr_stmt(path(ident("obj"), vec![attr("*.", "f"), call(vec![int("1")])])));
    let call = called.as_method_call().unwrap();
    assert!(!call.spread_safe);
}

#[test]
fn test_command_without_receiver() {
    // m 1, 2
    let e = single_expr(expr_stmt(command(ident("m"), Some(vec![int("1"), int("2")]), vec![])));
    let call = e.as_method_call().unwrap();
    assert!(call.implicit_this);
    assert_eq!(unparse_expr(&e), "m(1, 2)");
}

#[test]
fn test_command_chain() {
    // a b c
    let e = single_expr(expr_stmt(command(ident("a"), Some(vec![ident("b")]), vec![cmd_arg(ident("c"))])));
    assert_eq!(unparse_expr(&e), "a(b).c");
}

#[test]
fn test_tuple_declaration() {
    init_test_tracing();
    let unit = assert_lowers_ok!(unit(vec![tuple_decl(
        vec![modifier("def")],
        vec![pair(Some(primitive_type("int")), "a"), pair(Some(primitive_type("int")), "b")],
        init_expr(list(vec![elem(int("1")), elem(int("2"))])),
    )]));
    let names: Vec<_> = unit
        .statements
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Expression(Expr {
                kind: ExprKind::Declaration(d),
                ..
            }) => {
                assert_eq!(unparse_expr(&d.initializer), "[1, 2]");
                format!("{}:{}", d.variable.name, d.variable.ty.name())
            }
            other => panic!("expected declaration, got {other:?}"),
        })
        .collect();
    assert_eq!(names, vec!["a:int", "b:int"]);
}

#[test]
fn test_tuple_declaration_requires_def() {
    assert_lowering_error!(
        unit(vec![tuple_decl(
            vec![],
            vec![pair(None, "a"), pair(None, "b")],
            init_expr(ident("xs")),
        )]),
        ErrorKind::Structural,
        "keyword def is required to declare tuple"
    );
}

#[test]
fn test_multiline_string_span() {
    let e = single_expr(expr_stmt(string("'''a\nb\nc'''")));
    assert_eq!(e.span, Span::new(1, 1, 3, 5));
    assert_eq!(e.as_constant().map(|_| unparse_expr(&e)), Some("a\nb\nc".to_string()));
}

#[test]
fn test_upstream_error_is_relayed() {
    init_test_tracing();
    let tree = SyntaxTree::new(unit(vec![])).with_diagnostic(ParserDiagnostic::SyntaxError {
        message: "unexpected token: }".to_string(),
        line: 2,
        column: 4,
    });
    let mut sink = ErrorSink::new();
    let error = lower(&tree, LowerOptions::default(), &mut sink).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Upstream);
    assert_eq!(error.span(), Span::point(2, 5));
    assert_eq!(sink.errors().len(), 1);
}

#[test]
fn test_error_renders_against_source() {
    let laid_out = lay_out(unit(vec![switch(
        ident("x"),
        vec![group(vec![default_label()], vec![]), group(vec![case(int("1"))], vec![])],
    )]));
    let mut sink = ErrorSink::new();
    let error = lower(&laid_out.tree, LowerOptions::default(), &mut sink).unwrap_err();
    let record = &sink.errors()[0];
    assert_eq!(record.span(), error.span());
    let rendered = render_syntax_error(record, &laid_out.source, "script.groovy", false);
    assert!(rendered.contains("default should appear last"));
}

#[test]
fn test_script_methods_can_be_disallowed() {
    let laid_out = lay_out(unit(vec![method("m", None, vec![], block(vec![]))]));
    let options = LowerOptions {
        allow_script_methods: false,
        ..Default::default()
    };
    let error = lower(&laid_out.tree, options, &mut ErrorSink::new()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Invalid);
}

#[test]
fn test_method_and_statements() {
    init_test_tracing();
    let unit = assert_lowers_ok!(unit(vec![
        method_full(
            vec![modifier("def")],
            None,
            "twice",
            vec![param(Some(primitive_type("int")), "n")],
            vec![],
            Some(block(vec![return_stmt(Some(binary(ident("n"), "*", int("2"))))])),
        ),
        expr_stmt(path(ident("twice"), vec![call(vec![int("21")])])),
    ]));
    assert_eq!(unit.methods.len(), 1);
    let method = &unit.methods[0];
    assert!(method.synthetic_public);
    assert_eq!(method.return_type.kind, TypeKind::Dynamic);
    assert_eq!(method.parameters[0].ty.name(), "int");
    assert_eq!(unit.statements.len(), 1);
}

#[test_case("'plain'", "plain")]
#[test_case("\"tab\\there\"", "tab\there")]
#[test_case("/a\\/b/", "a/b")]
#[test_case("$/x$$y$/z/$", "x$y/z")]
fn test_string_statement(text: &str, expected: &str) {
    assert_unparses!(unit(vec![expr_stmt(string(text))]), [expected]);
}

#[test]
fn test_blank_script() {
    let unit = assert_lowers_ok!(unit(vec![]));
    assert_eq!(unit.statements.len(), 1);
    assert!(matches!(unit.statements[0].kind, StmtKind::Return(_)));
}

fn any_style() -> impl Strategy<Value = StringStyle> {
    prop_oneof![
        Just(StringStyle::SingleQuoted),
        Just(StringStyle::DoubleQuoted),
        Just(StringStyle::TripleSingleQuoted),
        Just(StringStyle::TripleDoubleQuoted),
        Just(StringStyle::Slashy),
        Just(StringStyle::DollarSlashy),
    ]
}

proptest! {
    #[test]
    fn quoted_strings_decode_to_their_value(
        value in "[a-z0-9 $/\\\\'\"\t\r\n]{0,16}",
        style in any_style(),
    ) {
        let literal = quote(&value, style);
        prop_assert_eq!(clean_string_literal(&literal), Some(value));
    }
}
