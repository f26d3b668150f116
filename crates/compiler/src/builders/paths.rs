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
//! Postfix chains: `a.b?.c*.d.&e[i](args) { closure }`.
//!
//! A path is folded left to right; each element takes the expression built so far as its
//! receiver. How a call attaches depends on what that receiver turned out to be.

use crate::ast::{
    Arguments, ArgumentsKind, BinaryOp, CALL_METHOD, Constant, Expr, ExprKind, GenericsType,
    MethodCall, PropertyAccess,
};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, Role};
use crate::position::{SpanSource, configure};
use crate::unparse::unparse_expr;
use gravel_common::{CompileError, Span};
use lazy_static::lazy_static;
use std::collections::HashSet;
use tracing::trace;

lazy_static! {
    /// Primitive type names; `int(...)` and friends cannot be calls.
    static ref PRIMITIVE_TYPES: HashSet<&'static str> = HashSet::from([
        "boolean", "byte", "char", "short", "int", "long", "float", "double",
    ]);
}

impl AstBuilder {
    pub(crate) fn build_path(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let primary = self.build_expression(self.required(node, Role::Primary)?)?;
        let folded = self.fold_path(primary, node.children(Role::Element))?;
        Ok(configure(folded, node))
    }

    pub(crate) fn fold_path<'n>(
        &mut self,
        primary: Expr,
        elements: impl Iterator<Item = &'n CstNode>,
    ) -> Result<Expr, CompileError> {
        let mut receiver = primary;
        for element in elements {
            receiver = self.build_path_element(receiver, element)?;
        }
        Ok(receiver)
    }

    fn build_path_element(
        &mut self,
        receiver: Expr,
        element: &CstNode,
    ) -> Result<Expr, CompileError> {
        let span = element.source_span();
        let op = element.token(Role::Operator).map(|t| t.text.as_str());
        trace!(op = op.unwrap_or(""), "path element");

        if let Some(name_part) = element.child(Role::NamePart) {
            let name = self.build_name_part(name_part)?;
            let generics = element
                .child(Role::TypeArguments)
                .map(|t| self.build_type_arguments(t))
                .transpose()?;
            let attribute = element.has(Role::At);
            let kind = match (op, attribute) {
                (Some(".&"), _) => ExprKind::MethodPointer {
                    object: receiver.boxed(),
                    method: name.boxed(),
                },
                (Some("."), true) => ExprKind::Attribute(access(receiver, name, false, false, None)),
                (Some("?."), true) => ExprKind::Attribute(access(receiver, name, true, false, None)),
                (Some("*."), true) => ExprKind::Attribute(access(receiver, name, true, true, None)),
                (Some("."), false) => {
                    ExprKind::Property(access(receiver, name, false, false, generics))
                }
                (Some("?."), false) => {
                    ExprKind::Property(access(receiver, name, true, false, generics))
                }
                (Some("*."), false) => {
                    ExprKind::Property(access(receiver, name, true, true, generics))
                }
                _ => return Err(self.parse_error(element, "Unsupported path element")),
            };
            return Ok(Expr::new(kind, span));
        }

        if let Some(index) = element.child(Role::Index) {
            let op = match op {
                Some("?[") => BinaryOp::SafeIndex,
                _ => BinaryOp::Index,
            };
            let index = self.build_index_args(index)?;
            return Ok(Expr::new(
                ExprKind::Binary {
                    left: receiver.boxed(),
                    op,
                    right: index.boxed(),
                },
                span,
            ));
        }

        if let Some(arguments) = element.child(Role::Arguments) {
            let arguments = self.build_arguments(arguments)?;
            let call = self.apply_arguments(receiver, arguments, span)?;
            return Ok(configure(call, element));
        }

        if let Some(closure) = element.child(Role::Closure) {
            let closure = self.build_closure(closure)?;
            let call = apply_closure(receiver, closure, span);
            return Ok(configure(call, element));
        }

        Err(self.parse_error(element, "Unsupported path element"))
    }

    /// The name after a member operator: identifier, keyword, string literal or a dynamic
    /// `(expr)` / GString.
    pub(crate) fn build_name_part(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let span = node.source_span();
        if let Some(identifier) = node.token(Role::Identifier).or_else(|| node.token(Role::Keyword)) {
            return Ok(Expr::constant(Constant::string(identifier.text.clone()), span));
        }
        if let Some(literal) = node.token(Role::Literal) {
            let value = self.string_value(literal, node)?;
            return Ok(Expr::constant(Constant::string_literal(value), span));
        }
        if let Some(dynamic) = node.child(Role::Dynamic) {
            let expr = self.build_expression(dynamic)?;
            return Ok(configure(expr, node));
        }
        Err(self.parse_error(node, "Unsupported name part"))
    }

    /// Attach `(args)` to whatever the path has built so far.
    pub(crate) fn apply_arguments(
        &self,
        receiver: Expr,
        arguments: Arguments,
        span: Span,
    ) -> Result<Expr, CompileError> {
        let Expr {
            kind,
            span: receiver_span,
            parenthesized,
        } = receiver;
        match kind {
            ExprKind::Attribute(mut attribute) => {
                // `a*.@b(...)` calls the attribute value; the spread does not carry over.
                attribute.spread_safe = false;
                let attribute = Expr {
                    kind: ExprKind::Attribute(attribute),
                    span: receiver_span,
                    parenthesized,
                };
                Ok(explicit_call(attribute, arguments, span))
            }
            ExprKind::Property(property) => Ok(call_from_property(property, arguments, span)),
            kind => {
                let receiver = Expr {
                    kind,
                    span: receiver_span,
                    parenthesized,
                };
                self.call_on(receiver, arguments, span)
            }
        }
    }

    fn call_on(&self, receiver: Expr, arguments: Arguments, span: Span) -> Result<Expr, CompileError> {
        match &receiver.kind {
            ExprKind::Closure { .. } | ExprKind::MethodCall(_) => {
                Ok(explicit_call(receiver, arguments, span))
            }
            ExprKind::Variable(variable) if variable.name == "void" => {
                let name = Expr::constant(Constant::string("void"), receiver.span);
                Ok(explicit_call(name, arguments, span))
            }
            ExprKind::Variable(variable) if PRIMITIVE_TYPES.contains(variable.name.as_str()) => {
                Err(CompileError::invalid(
                    format!(
                        "Primitive type literal: {} cannot be used as a method name",
                        variable.name
                    ),
                    receiver.span,
                ))
            }
            ExprKind::Variable(_) | ExprKind::GString { .. } => {
                Ok(implicit_this_call(receiver, arguments, span))
            }
            ExprKind::Constant(_) if receiver.is_string_literal() => {
                Ok(implicit_this_call(receiver, arguments, span))
            }
            _ => Ok(explicit_call(receiver, arguments, span)),
        }
    }
}

fn access(
    object: Expr,
    property: Expr,
    safe: bool,
    spread_safe: bool,
    pending_generics: Option<Vec<GenericsType>>,
) -> PropertyAccess {
    PropertyAccess {
        object: object.boxed(),
        property: property.boxed(),
        safe,
        spread_safe,
        pending_generics,
    }
}

/// `object.call(args)`
pub(crate) fn explicit_call(object: Expr, arguments: Arguments, span: Span) -> Expr {
    Expr::new(
        ExprKind::MethodCall(MethodCall {
            method: Expr::constant(Constant::string(CALL_METHOD), object.span).boxed(),
            object: object.boxed(),
            arguments,
            implicit_this: false,
            safe: false,
            spread_safe: false,
            generics: None,
        }),
        span,
    )
}

/// `name(args)` with no receiver: a call on `this`. Variables become constant method names.
pub(crate) fn implicit_this_call(name: Expr, arguments: Arguments, span: Span) -> Expr {
    let method = match name.as_variable() {
        Some(variable) => Expr::constant(Constant::string(variable.name.clone()), name.span),
        None => name,
    };
    Expr::new(
        ExprKind::MethodCall(MethodCall {
            object: Expr::this(method.span).boxed(),
            method: method.boxed(),
            arguments,
            implicit_this: true,
            safe: false,
            spread_safe: false,
            generics: None,
        }),
        span,
    )
}

/// `a.b` followed by arguments becomes `a.b(args)`, keeping the access's safety and generics.
pub(crate) fn call_from_property(property: PropertyAccess, arguments: Arguments, span: Span) -> Expr {
    Expr::new(
        ExprKind::MethodCall(MethodCall {
            object: property.object,
            method: property.property,
            arguments,
            implicit_this: false,
            safe: property.safe && !property.spread_safe,
            spread_safe: property.spread_safe,
            generics: property.pending_generics,
        }),
        span,
    )
}

/// A closure written after a path element becomes the call's last argument.
fn apply_closure(receiver: Expr, closure: Expr, span: Span) -> Expr {
    let closure_span = closure.span;
    let Expr {
        kind,
        span: receiver_span,
        parenthesized,
    } = receiver;
    match kind {
        ExprKind::MethodCall(mut call) => {
            let arguments_span = call.arguments.span;
            call.arguments = match call.arguments.kind {
                ArgumentsKind::Positional(mut args) => {
                    args.push(closure);
                    Arguments::positional(args, arguments_span)
                }
                ArgumentsKind::Named(entries) => {
                    let named = Expr::new(ExprKind::Map(entries), arguments_span);
                    Arguments::positional(vec![named, closure], arguments_span)
                }
            };
            Expr::new(ExprKind::MethodCall(call), span)
        }
        ExprKind::Property(property) | ExprKind::Attribute(property) => {
            call_from_property(property, Arguments::positional(vec![closure], closure_span), span)
        }
        kind => {
            let receiver = Expr {
                kind,
                span: receiver_span,
                parenthesized,
            };
            let arguments = Arguments::positional(vec![closure], closure_span);
            if receiver.is_numeric_literal() {
                explicit_call(receiver, arguments, span)
            } else {
                implicit_this_call(receiver, arguments, span)
            }
        }
    }
}

/// The text of an expression as a constant, for names written as expressions.
pub(crate) fn name_constant(expr: &Expr) -> Expr {
    let name = match expr.as_variable() {
        Some(variable) => variable.name.clone(),
        None => unparse_expr(expr),
    };
    Expr::constant(Constant::string(name), expr.span)
}
