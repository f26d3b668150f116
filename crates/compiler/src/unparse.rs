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

//! Textual form of lowered expressions.
//!
//! Produces the verbatim text of interpolated strings and the readable names used in error
//! messages. Whitespace is normalized; constants print their value without quotes.

use crate::ast::{
    Arguments, ArgumentsKind, BinaryOp, ClosureParams, Constant, ConstantValue, Expr, ExprKind,
    GenericsKind, GenericsType, MapEntry, Parameter, PropertyAccess, Stmt, StmtKind, TypeKind,
    TypeRef,
};
use itertools::Itertools;

pub fn unparse_expr(expr: &Expr) -> String {
    let text = unparse_unwrapped(expr);
    if expr.parenthesized {
        format!("({text})")
    } else {
        text
    }
}

fn unparse_unwrapped(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Constant(c) => constant_text(c),
        ExprKind::Variable(v) => v.name.clone(),
        ExprKind::Declaration(d) => {
            let ty = match d.variable.ty.kind {
                TypeKind::Dynamic => "def".to_string(),
                _ => type_text(&d.variable.ty),
            };
            match d.initializer.kind {
                ExprKind::Empty => format!("{ty} {}", d.variable.name),
                _ => format!("{ty} {} = {}", d.variable.name, unparse_expr(&d.initializer)),
            }
        }
        ExprKind::GString { verbatim, .. } => verbatim.clone(),
        ExprKind::Property(p) => property_text(p, "."),
        ExprKind::Attribute(p) => property_text(p, ".@"),
        ExprKind::MethodPointer { object, method } => {
            format!("{}.&{}", unparse_expr(object), unparse_expr(method))
        }
        ExprKind::MethodCall(call) => {
            let generics = call
                .generics
                .as_ref()
                .map(|g| generics_text(g))
                .unwrap_or_default();
            let dot = match (call.spread_safe, call.safe) {
                (true, _) => "*.",
                (false, true) => "?.",
                _ => ".",
            };
            let target = if call.implicit_this {
                String::new()
            } else {
                format!("{}{dot}", unparse_expr(&call.object))
            };
            format!(
                "{target}{generics}{}{}",
                unparse_expr(&call.method),
                arguments_text(&call.arguments)
            )
        }
        ExprKind::ConstructorCall { ty, arguments } => {
            format!("new {}{}", type_text(ty), arguments_text(arguments))
        }
        ExprKind::Array {
            element_type,
            sizes,
        } => {
            let dims: String = sizes
                .iter()
                .map(|s| match s.as_constant() {
                    Some(c) if c.value == ConstantValue::Null => "[]".to_string(),
                    _ => format!("[{}]", unparse_expr(s)),
                })
                .collect();
            format!("new {}{dims}", type_text(element_type))
        }
        ExprKind::Binary { left, op, right } => match op {
            BinaryOp::Index | BinaryOp::SafeIndex => {
                let open = if *op == BinaryOp::SafeIndex { "?[" } else { "[" };
                format!("{}{open}{}]", unparse_expr(left), index_text(right))
            }
            _ => format!("{} {op} {}", unparse_expr(left), unparse_expr(right)),
        },
        ExprKind::Range {
            from,
            to,
            inclusive,
        } => {
            let op = if *inclusive { ".." } else { "..<" };
            format!("{}{op}{}", unparse_expr(from), unparse_expr(to))
        }
        ExprKind::Postfix { expr, op } => format!("{}{op}", unparse_expr(expr)),
        ExprKind::Prefix { op, expr } => format!("{op}{}", unparse_expr(expr)),
        ExprKind::UnaryPlus(e) => format!("+{}", unparse_expr(e)),
        ExprKind::UnaryMinus(e) => format!("-{}", unparse_expr(e)),
        ExprKind::Not(e) => format!("!{}", unparse_expr(e)),
        ExprKind::BitwiseNegation(e) => format!("~{}", unparse_expr(e)),
        ExprKind::Boolean(e) => unparse_expr(e),
        ExprKind::Cast { ty, expr, coerce } => {
            if *coerce {
                format!("{} as {}", unparse_expr(expr), type_text(ty))
            } else {
                format!("({}) {}", type_text(ty), unparse_expr(expr))
            }
        }
        ExprKind::Class(ty) => type_text(ty),
        ExprKind::Ternary {
            condition,
            then,
            otherwise,
        } => format!(
            "{} ? {} : {}",
            unparse_expr(condition),
            unparse_expr(then),
            unparse_expr(otherwise)
        ),
        ExprKind::Elvis {
            condition,
            otherwise,
        } => format!("{} ?: {}", unparse_expr(condition), unparse_expr(otherwise)),
        ExprKind::Closure { parameters, code } => {
            let body = unparse_stmt(code);
            match parameters {
                ClosureParams::Implicit => format!("{{ {body} }}"),
                ClosureParams::Explicit(params) => {
                    format!("{{ {} -> {body} }}", parameters_text(params))
                }
            }
        }
        ExprKind::List { elements, .. } => {
            format!("[{}]", elements.iter().map(unparse_expr).join(", "))
        }
        ExprKind::Map(entries) if entries.is_empty() => "[:]".to_string(),
        ExprKind::Map(entries) => format!("[{}]", entries_text(entries)),
        ExprKind::Spread(e) => format!("*{}", unparse_expr(e)),
        ExprKind::SpreadMap(e) => format!("*:{}", unparse_expr(e)),
        ExprKind::ArgumentList(args) => arguments_text(args),
        ExprKind::ClosureList(exprs) => format!("({})", exprs.iter().map(unparse_expr).join("; ")),
        ExprKind::AnnotationConstant(a) => format!("@{}", a.class_name),
        ExprKind::Empty => String::new(),
    }
}

pub fn constant_text(constant: &Constant) -> String {
    match &constant.value {
        ConstantValue::Null => "null".to_string(),
        ConstantValue::Bool(b) => b.to_string(),
        ConstantValue::Number(n) => n.to_string(),
        ConstantValue::Str(s) => s.clone(),
    }
}

fn property_text(access: &PropertyAccess, dot: &str) -> String {
    let prefix = match (access.spread_safe, access.safe) {
        (true, _) => "*",
        (false, true) => "?",
        _ => "",
    };
    format!(
        "{}{prefix}{dot}{}",
        unparse_expr(&access.object),
        unparse_expr(&access.property)
    )
}

fn index_text(index: &Expr) -> String {
    match &index.kind {
        ExprKind::List {
            elements,
            wrapped: true,
        } => elements.iter().map(unparse_expr).join(", "),
        _ => unparse_expr(index),
    }
}

fn entries_text(entries: &[MapEntry]) -> String {
    entries
        .iter()
        .map(|e| match e.key.kind {
            ExprKind::SpreadMap(_) => unparse_expr(&e.key),
            _ => format!("{}: {}", unparse_expr(&e.key), unparse_expr(&e.value)),
        })
        .join(", ")
}

pub fn arguments_text(arguments: &Arguments) -> String {
    match &arguments.kind {
        ArgumentsKind::Positional(args) => {
            format!("({})", args.iter().map(unparse_expr).join(", "))
        }
        ArgumentsKind::Named(entries) => format!("({})", entries_text(entries)),
    }
}

fn parameters_text(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| match p.ty.kind {
            TypeKind::Dynamic => p.name.clone(),
            _ => format!("{} {}", type_text(&p.ty), p.name),
        })
        .join(", ")
}

pub fn type_text(ty: &TypeRef) -> String {
    match &ty.kind {
        TypeKind::Class {
            name,
            generics: Some(generics),
        } => format!("{name}{}", generics_text(generics)),
        TypeKind::Array(component) => format!("{}[]", type_text(component)),
        _ => ty.name(),
    }
}

fn generics_text(generics: &[GenericsType]) -> String {
    let args = generics
        .iter()
        .map(|g| match &g.kind {
            GenericsKind::Type(t) => type_text(t),
            GenericsKind::Wildcard {
                upper_bound: Some(t),
                ..
            } => format!("? extends {}", type_text(t)),
            GenericsKind::Wildcard {
                lower_bound: Some(t),
                ..
            } => format!("? super {}", type_text(t)),
            GenericsKind::Wildcard { .. } => "?".to_string(),
        })
        .join(", ");
    format!("<{args}>")
}

/// One-line statement text, enough to show closure bodies.
pub fn unparse_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Block(stmts) => stmts.iter().map(unparse_stmt).join("; "),
        StmtKind::Expression(e) => unparse_expr(e),
        StmtKind::Assert { condition, message } => match message {
            Some(m) => format!("assert {} : {}", unparse_expr(condition), unparse_expr(m)),
            None => format!("assert {}", unparse_expr(condition)),
        },
        StmtKind::If {
            condition,
            then,
            otherwise,
        } => {
            let mut text = format!("if ({}) {{ {} }}", unparse_expr(condition), unparse_stmt(then));
            if !otherwise.is_empty() {
                text.push_str(&format!(" else {{ {} }}", unparse_stmt(otherwise)));
            }
            text
        }
        StmtKind::For {
            variable,
            collection,
            body,
        } => {
            let header = match variable {
                Some(v) => format!("{} in {}", v.name, unparse_expr(collection)),
                None => unparse_expr(collection),
            };
            format!("for ({header}) {{ {} }}", unparse_stmt(body))
        }
        StmtKind::While { condition, body } => {
            format!("while ({}) {{ {} }}", unparse_expr(condition), unparse_stmt(body))
        }
        StmtKind::TryCatch { body, .. } => format!("try {{ {} }} ...", unparse_stmt(body)),
        StmtKind::Switch { subject, .. } => format!("switch ({}) {{ ... }}", unparse_expr(subject)),
        StmtKind::Synchronized { lock, body } => {
            format!("synchronized ({}) {{ {} }}", unparse_expr(lock), unparse_stmt(body))
        }
        StmtKind::Return(e) => format!("return {}", unparse_expr(e)),
        StmtKind::Throw(e) => format!("throw {}", unparse_expr(e)),
        StmtKind::Break(label) => match label {
            Some(l) => format!("break {l}"),
            None => "break".to_string(),
        },
        StmtKind::Continue(label) => match label {
            Some(l) => format!("continue {l}"),
            None => "continue".to_string(),
        },
        StmtKind::Empty => String::new(),
    }
}
