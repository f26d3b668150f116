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
//! Parenthesis-free calls: `println x`, `move a to b`, `foo.bar 1, 2`.
//!
//! The head is lowered as a call; every further word either calls a method on the result
//! (when it has arguments) or reads a property of it.

use crate::ast::{Arguments, Expr, ExprKind, MethodCall, PropertyAccess};
use crate::builders::AstBuilder;
use crate::builders::paths::{call_from_property, explicit_call, implicit_this_call, name_constant};
use crate::cst::{CstNode, Role};
use crate::position::{SpanSource, configure};
use gravel_common::CompileError;

impl AstBuilder {
    pub(crate) fn build_command_expression(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let base = self.build_expression(self.required(node, Role::Base)?)?;
        let arguments = node
            .child(Role::Arguments)
            .map(|a| self.build_argument_list(a))
            .transpose()?;

        let mut result = self.build_command_head(node, base, arguments)?;
        for argument in node.children(Role::CommandArgument) {
            result = self.build_command_argument(result, argument)?;
        }
        Ok(configure(result, node))
    }

    fn build_command_head(
        &self,
        node: &CstNode,
        base: Expr,
        arguments: Option<Arguments>,
    ) -> Result<Expr, CompileError> {
        if matches!(base.kind, ExprKind::MethodCall(_)) {
            // `m {} a` or `m(...) a`: the head already is the call.
            if arguments.is_some() {
                return Err(self.parse_error(node, "Unexpected argument list after a method call"));
            }
            return Ok(base);
        }
        let arguments = arguments.unwrap_or_else(|| Arguments::positional(vec![], base.span));
        let span = arguments.span;
        let Expr {
            kind,
            span: base_span,
            parenthesized,
        } = base;
        Ok(match kind {
            // `obj.a 1, 2` and `obj.@a 1, 2`
            ExprKind::Property(property) | ExprKind::Attribute(property) => {
                call_from_property(property, arguments, span)
            }
            kind => {
                let base = Expr {
                    kind,
                    span: base_span,
                    parenthesized,
                };
                if matches!(base.kind, ExprKind::Binary { .. }) {
                    // `a[x] b`
                    explicit_call(base, arguments, span)
                } else {
                    implicit_this_call(base, arguments, span)
                }
            }
        })
    }

    fn build_command_argument(&mut self, receiver: Expr, node: &CstNode) -> Result<Expr, CompileError> {
        let primary = self.build_expression(self.required(node, Role::Primary)?)?;

        if let Some(list) = node.child(Role::Arguments) {
            if matches!(receiver.kind, ExprKind::Property(_) | ExprKind::Attribute(_)) {
                return Err(self.parse_error(node, "Unsupported command argument"));
            }
            let arguments = self.build_argument_list(list)?;
            return Ok(Expr::new(
                ExprKind::MethodCall(MethodCall {
                    object: receiver.boxed(),
                    method: name_constant(&primary).boxed(),
                    arguments,
                    implicit_this: false,
                    safe: false,
                    spread_safe: false,
                    generics: None,
                }),
                node.source_span(),
            ));
        }

        if node.has(Role::Element) {
            let span = primary.span;
            let property = Expr::new(
                ExprKind::Property(PropertyAccess {
                    object: receiver.boxed(),
                    property: name_constant(&primary).boxed(),
                    safe: false,
                    spread_safe: false,
                    pending_generics: None,
                }),
                span,
            );
            let path = self.fold_path(property, node.children(Role::Element))?;
            return Ok(configure(path, node));
        }

        let span = primary.span;
        let property = if primary.as_variable().is_some() {
            name_constant(&primary)
        } else {
            primary
        };
        Ok(Expr::new(
            ExprKind::Property(PropertyAccess {
                object: receiver.boxed(),
                property: property.boxed(),
                safe: false,
                spread_safe: false,
                pending_generics: None,
            }),
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ArgumentsKind, Expr, ExprKind, StmtKind};
    use crate::cst::CstNode;
    use crate::testing::dsl::*;
    use crate::testing::lower_unit;
    use crate::unparse::unparse_expr;
    use gravel_common::{CompileError, ErrorKind, Span};
    use pretty_assertions::assert_eq;

    fn lower_expr(expr: CstNode) -> Result<Expr, CompileError> {
        let mut unit = lower_unit(unit(vec![expr_stmt(expr)]))?;
        match unit.statements.remove(0).kind {
            StmtKind::Expression(e) => Ok(e),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_command() {
        // println x
        let e = lower_expr(command(path(ident("println"), vec![]), Some(vec![ident("x")]), vec![]))
            .unwrap();
        let call = e.as_method_call().unwrap();
        assert!(call.implicit_this);
        assert_eq!(unparse_expr(&e), "println(x)");
        assert_eq!(e.span, Span::new(1, 1, 1, 10));
    }

    #[test]
    fn test_command_chain_reads_property() {
        // a b c  =>  a(b).c
        let e = lower_expr(command(ident("a"), Some(vec![ident("b")]), vec![cmd_arg(ident("c"))]))
            .unwrap();
        let ExprKind::Property(property) = &e.kind else {
            panic!("expected property, got {e:?}");
        };
        assert!(property.object.as_method_call().is_some());
        assert!(property.property.as_constant().is_some());
        assert_eq!(unparse_expr(&e), "a(b).c");
        assert_eq!(e.span, Span::new(1, 1, 1, 6));
    }

    #[test]
    fn test_command_chain_calls() {
        // move a to b  =>  move(a).to(b)
        let e = lower_expr(command(
            ident("move"),
            Some(vec![ident("a")]),
            vec![cmd_arg_call(ident("to"), vec![ident("b")])],
        ))
        .unwrap();
        let call = e.as_method_call().unwrap();
        assert!(!call.implicit_this);
        assert_eq!(unparse_expr(&e), "move(a).to(b)");
    }

    #[test]
    fn test_command_argument_with_path() {
        // a b c.d  =>  a(b).c.d
        let e = lower_expr(command(
            ident("a"),
            Some(vec![ident("b")]),
            vec![cmd_arg_path(ident("c"), vec![dot("d")])],
        ))
        .unwrap();
        assert_eq!(unparse_expr(&e), "a(b).c.d");
    }

    #[test]
    fn test_property_head() {
        // foo.bar 1, 2
        let e = lower_expr(command(
            path(ident("foo"), vec![dot("bar")]),
            Some(vec![int("1"), int("2")]),
            vec![],
        ))
        .unwrap();
        let call = e.as_method_call().unwrap();
        assert!(!call.implicit_this);
        let ArgumentsKind::Positional(args) = &call.arguments.kind else {
            panic!("expected positional arguments");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(unparse_expr(&e), "foo.bar(1, 2)");
    }

    #[test]
    fn test_attribute_head() {
        // obj.@f 1
        let e = lower_expr(command(path(ident("obj"), vec![attr(".", "f")]), Some(vec![int("1")]), vec![]))
            .unwrap();
        let call = e.as_method_call().unwrap();
        assert!(!call.implicit_this);
        assert_eq!(unparse_expr(&call.object), "obj");
        assert_eq!(unparse_expr(&call.method), "f");
        assert_eq!(unparse_expr(&e), "obj.f(1)");
    }

    #[test]
    fn test_safe_attribute_head_keeps_safety() {
        let e = lower_expr(command(path(ident("obj"), vec![attr("?.", "f")]), Some(vec![int("1")]), vec![]))
            .unwrap();
        let call = e.as_method_call().unwrap();
        assert!(call.safe);
        assert!(!call.spread_safe);
    }

    #[test]
    fn test_index_head_uses_call_method() {
        // a[0] x
        let e = lower_expr(command(
            path(ident("a"), vec![index(vec![elem(int("0"))])]),
            Some(vec![ident("x")]),
            vec![],
        ))
        .unwrap();
        assert_eq!(unparse_expr(&e), "a[0].call(x)");
    }

    #[test]
    fn test_call_head_takes_no_arguments() {
        // m {} a
        let head = path(ident("m"), vec![closure_el(closure(vec![], false, vec![]))]);
        let e = lower_expr(command(head, None, vec![cmd_arg(ident("a"))])).unwrap();
        assert!(matches!(e.kind, ExprKind::Property(_)));

        let head = path(ident("m"), vec![call(vec![])]);
        let err = lower_expr(command(head, Some(vec![ident("x")]), vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_call_after_property_word_is_rejected() {
        // a b c d e: the `c` word reads a property, so `d e` cannot call on it.
        let e = lower_expr(command(
            ident("a"),
            Some(vec![ident("b")]),
            vec![cmd_arg(ident("c")), cmd_arg_call(ident("d"), vec![ident("e")])],
        ));
        let err = e.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.message().starts_with("Unsupported command argument"));
    }
}
