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
//! Lowering of Groovy concrete syntax trees into the gravel abstract syntax tree.
//!
//! A parser hands over a [`SyntaxTree`]; [`lower`] walks it with an [`AstBuilder`] and returns
//! the [`CompilationUnit`] for the script, or reports the first error to an
//! [`ErrorCollector`](gravel_common::ErrorCollector).

pub mod ast;
mod builders;
pub mod cst;
pub mod diagnostics;
pub mod literals;
pub mod modifiers;
pub mod position;
pub mod testing;
pub mod unparse;

pub use crate::ast::{CompilationUnit, Expr, ExprKind, MethodDecl, Stmt, StmtKind};
pub use crate::builders::{AstBuilder, LowerOptions, lower};
pub use crate::cst::{CstNode, NodeKind, ParserDiagnostic, Role, SyntaxTree, Token, TokenKind};
pub use crate::diagnostics::{
    DiagnosticRenderOptions, DiagnosticVerbosity, emit_syntax_error, format_syntax_error,
    render_syntax_error,
};
pub use crate::unparse::{unparse_expr, unparse_stmt};
