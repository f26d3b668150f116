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
//! Lowering of the concrete syntax tree into the AST.
//!
//! [`AstBuilder`] walks a [`SyntaxTree`] depth-first and produces one [`CompilationUnit`].
//! Every produced node carries the span of the construct it came from. The first problem
//! found ends the walk: it is submitted to the caller's [`ErrorCollector`] and returned.
//!
//! The builder is split by concern; each submodule adds `build_*` methods to [`AstBuilder`].

mod commands;
mod declarations;
mod expressions;
mod paths;
mod statements;
mod switch;
mod types;

use crate::ast::{CompilationUnit, Expr, ImportDecl, ImportKind, PackageDecl, Stmt, StmtKind};
use crate::cst::{CstNode, NodeKind, ParserDiagnostic, Role, SyntaxTree, Token};
use crate::position::{SOURCE_START, SpanSource};
use gravel_common::{CompileError, ErrorCollector, Span};
use serde::Deserialize;
use tracing::{debug, error, trace};

/// Stack that must remain before another nesting level is entered.
const RED_ZONE: usize = 256 * 1024;
/// Size of each extra stack segment allocated once the red zone is hit.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Knobs for a lowering run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LowerOptions {
    /// How deep statements and expressions may nest before the walk gives up.
    pub max_depth: usize,
    /// Give a script with no statements a single `return null`.
    pub blank_script_return: bool,
    /// Accept method declarations at the top level of a script.
    pub allow_script_methods: bool,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            max_depth: 512,
            blank_script_return: true,
            allow_script_methods: true,
        }
    }
}

/// Lower a parsed tree into a compilation unit.
///
/// Parser diagnostics are looked at first: a syntax error is relayed as-is, prediction
/// notices are only logged. On failure the error record goes to `errors` before returning.
pub fn lower(
    tree: &SyntaxTree,
    options: LowerOptions,
    errors: &mut dyn ErrorCollector,
) -> Result<CompilationUnit, CompileError> {
    let result = relay_diagnostics(&tree.diagnostics)
        .and_then(|()| AstBuilder::new(options).build_compilation_unit(&tree.root));
    match result {
        Ok(unit) => {
            debug!(
                statements = unit.statements.len(),
                methods = unit.methods.len(),
                imports = unit.imports.len(),
                "lowered compilation unit"
            );
            Ok(unit)
        }
        Err(e) => {
            error!(kind = %e.kind(), span = %e.span(), "failed to build AST: {}", e.message());
            errors.add_fatal_error(e.to_record());
            Err(e)
        }
    }
}

fn relay_diagnostics(diagnostics: &[ParserDiagnostic]) -> Result<(), CompileError> {
    for diagnostic in diagnostics {
        match diagnostic {
            ParserDiagnostic::SyntaxError {
                message,
                line,
                column,
            } => {
                return Err(CompileError::Upstream {
                    message: message.clone(),
                    span: Span::point(*line, column + 1),
                });
            }
            ParserDiagnostic::Ambiguity { start, stop } => {
                debug!(start, stop, "parser reported an ambiguity");
            }
            ParserDiagnostic::AttemptingFullContext { start, stop } => {
                debug!(start, stop, "parser retrying with full context");
            }
            ParserDiagnostic::ContextSensitivity { start, stop } => {
                debug!(start, stop, "parser reported context sensitivity");
            }
        }
    }
    Ok(())
}

pub struct AstBuilder {
    options: LowerOptions,
    /// Current statement/expression nesting.
    depth: usize,
    /// Span of the innermost statement or expression with tokens, for nodes that have none.
    enclosing: Span,
}

impl AstBuilder {
    pub fn new(options: LowerOptions) -> Self {
        Self {
            options,
            depth: 0,
            enclosing: SOURCE_START,
        }
    }

    pub fn build_compilation_unit(
        &mut self,
        node: &CstNode,
    ) -> Result<CompilationUnit, CompileError> {
        if node.kind != NodeKind::CompilationUnit {
            return Err(self.parse_error(
                node,
                &format!("Expected compilation unit, got {}", node.kind),
            ));
        }

        let package = self.visit_opt(node.child(Role::Package), Self::build_package)?;
        let imports = node
            .children(Role::Import)
            .map(|i| self.build_import(i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut statements = vec![];
        let mut methods = vec![];
        for child in node.children(Role::Statement) {
            if child.kind == NodeKind::MethodDeclaration {
                if !self.options.allow_script_methods {
                    return Err(CompileError::invalid(
                        "Method declarations are not allowed in this script",
                        child.source_span(),
                    ));
                }
                methods.push(self.build_method_declaration(child)?);
            } else {
                statements.extend(self.build_block_statement(child)?);
            }
        }

        let span = node.source_span();
        if !node.has(Role::Statement) && self.options.blank_script_return {
            trace!("blank script, adding return null");
            statements.push(Stmt::new(StmtKind::Return(Expr::null(span)), span));
        }

        Ok(CompilationUnit {
            package,
            imports,
            statements,
            methods,
            span,
        })
    }

    fn build_package(&mut self, node: &CstNode) -> Result<PackageDecl, CompileError> {
        let name = self.qualified_name(self.required(node, Role::Name)?);
        let annotations = self.build_annotations(node)?;
        Ok(PackageDecl {
            name: format!("{name}."),
            annotations,
            span: node.source_span(),
        })
    }

    fn build_import(&mut self, node: &CstNode) -> Result<ImportDecl, CompileError> {
        let name_node = self.required(node, Role::Name)?;
        let parts: Vec<&str> = name_node
            .tokens(Role::Part)
            .map(|t| t.text.as_str())
            .collect();
        let qualified = parts.join(".");
        let alias = node.token(Role::Alias).map(|t| t.text.clone());
        let annotations = self.build_annotations(node)?;

        let (kind, class_name, member, alias) =
            match (node.has(Role::Static), node.has(Role::Star)) {
                (true, true) => (ImportKind::StaticStar, qualified, None, None),
                (true, false) => {
                    let Some((member, class)) = parts.split_last() else {
                        return Err(self.parse_error(node, "Missing imported member"));
                    };
                    let member = member.to_string();
                    let alias = alias.unwrap_or_else(|| member.clone());
                    (ImportKind::Static, class.join("."), Some(member), Some(alias))
                }
                (false, true) => (ImportKind::Star, format!("{qualified}."), None, None),
                (false, false) => {
                    let Some(last) = parts.last() else {
                        return Err(self.parse_error(node, "Missing imported class"));
                    };
                    let alias = alias.unwrap_or_else(|| last.to_string());
                    (ImportKind::Regular, qualified, None, Some(alias))
                }
            };

        trace!(%kind, class_name, "import");
        Ok(ImportDecl {
            kind,
            class_name,
            member,
            alias,
            annotations,
            span: node.source_span(),
        })
    }

    /// `Part` tokens of a qualified name joined with dots.
    fn qualified_name(&self, node: &CstNode) -> String {
        node.tokens(Role::Part)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Run `f` one nesting level deeper, failing once the configured limit is passed.
    ///
    /// Each level runs with at least [`RED_ZONE`] bytes of stack left, growing onto a fresh
    /// segment when the current one runs low, so the limit is reached before the thread's
    /// own stack is.
    fn nested<T>(
        &mut self,
        node: &CstNode,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= self.options.max_depth {
            return Err(CompileError::NestingTooDeep {
                limit: self.options.max_depth,
                span: self.span_of(node),
            });
        }
        let outer = self.enclosing;
        self.enclosing = self.span_of(node);
        self.depth += 1;
        let result = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || f(self));
        self.depth -= 1;
        self.enclosing = outer;
        result
    }

    /// Lower an optional child. An absent node lowers to `None` instead of failing.
    fn visit_opt<T>(
        &mut self,
        node: Option<&CstNode>,
        f: impl FnOnce(&mut Self, &CstNode) -> Result<T, CompileError>,
    ) -> Result<Option<T>, CompileError> {
        node.map(|n| f(self, n)).transpose()
    }

    fn required<'n>(&self, node: &'n CstNode, role: Role) -> Result<&'n CstNode, CompileError> {
        node.child(role)
            .ok_or_else(|| self.parse_error(node, &format!("Missing {role} in {}", node.kind)))
    }

    fn required_token<'n>(&self, node: &'n CstNode, role: Role) -> Result<&'n Token, CompileError> {
        node.token(role)
            .ok_or_else(|| self.parse_error(node, &format!("Missing {role} in {}", node.kind)))
    }

    /// The node's span, or the enclosing one when the node has no tokens.
    fn span_of(&self, node: &CstNode) -> Span {
        node.source_span_or(self.enclosing)
    }

    /// A structural error carrying the node's text.
    fn parse_error(&self, node: &CstNode, message: &str) -> CompileError {
        CompileError::structural(message, node.text(), self.span_of(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;
    use crate::cst::TokenKind;
    use crate::testing::dsl::*;
    use crate::testing::lay_out;
    use gravel_common::{ErrorKind, ErrorSink};
    use pretty_assertions::assert_eq;

    fn lower_unit(root: CstNode) -> Result<CompilationUnit, CompileError> {
        let tree = lay_out(root).tree;
        lower(&tree, LowerOptions::default(), &mut ErrorSink::new())
    }

    #[test]
    fn test_blank_script_returns_null() {
        let unit = lower_unit(unit(vec![])).unwrap();
        assert_eq!(unit.statements.len(), 1);
        let StmtKind::Return(value) = &unit.statements[0].kind else {
            panic!("expected return, got {:?}", unit.statements[0]);
        };
        assert!(matches!(value.kind, ExprKind::Constant(_)));
        assert_eq!(value.span, unit.span);
    }

    #[test]
    fn test_blank_script_return_can_be_disabled() {
        let tree = lay_out(unit(vec![])).tree;
        let options = LowerOptions {
            blank_script_return: false,
            ..Default::default()
        };
        let unit = lower(&tree, options, &mut ErrorSink::new()).unwrap();
        assert!(unit.statements.is_empty());
    }

    #[test]
    fn test_package_and_imports() {
        let root = unit(vec![expr_stmt(ident("x"))])
            .with_node(Role::Package, package(&["org", "example"]))
            .with_node(Role::Import, import(&["java", "util", "List"], false, false, None))
            .with_node(Role::Import, import(&["java", "io"], false, true, None))
            .with_node(Role::Import, import(&["java", "lang", "Math", "max"], true, false, Some("mx")))
            .with_node(Role::Import, import(&["java", "lang", "Math"], true, true, None));
        // Children are matched by role, so their order in the vector does not matter here.
        let unit = lower_unit(root).unwrap();

        assert_eq!(unit.package.as_ref().map(|p| p.name.as_str()), Some("org.example."));
        let summary: Vec<_> = unit
            .imports
            .iter()
            .map(|i| (i.kind, i.class_name.as_str(), i.member.as_deref(), i.alias.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ImportKind::Regular, "java.util.List", None, Some("List")),
                (ImportKind::Star, "java.io.", None, None),
                (ImportKind::Static, "java.lang.Math", Some("max"), Some("mx")),
                (ImportKind::StaticStar, "java.lang.Math", None, None),
            ]
        );
    }

    #[test]
    fn test_static_import_alias_defaults_to_member() {
        let root = unit(vec![]).with_node(
            Role::Import,
            import(&["java", "lang", "Math", "max"], true, false, None),
        );
        let unit = lower_unit(root).unwrap();
        assert_eq!(unit.imports[0].alias.as_deref(), Some("max"));
    }

    #[test]
    fn test_syntax_error_is_relayed() {
        let tree = lay_out(unit(vec![expr_stmt(ident("x"))]))
            .tree
            .with_diagnostic(ParserDiagnostic::Ambiguity { start: 0, stop: 1 })
            .with_diagnostic(ParserDiagnostic::SyntaxError {
                message: "unexpected token: }".into(),
                line: 3,
                column: 4,
            });
        let mut sink = ErrorSink::new();
        let err = lower(&tree, LowerOptions::default(), &mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.span(), Span::point(3, 5));
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(sink.errors()[0].message, "unexpected token: }");
    }

    #[test]
    fn test_notices_alone_do_not_fail() {
        let tree = lay_out(unit(vec![expr_stmt(ident("x"))]))
            .tree
            .with_diagnostic(ParserDiagnostic::ContextSensitivity { start: 0, stop: 0 });
        let mut sink = ErrorSink::new();
        assert!(lower(&tree, LowerOptions::default(), &mut sink).is_ok());
        assert!(!sink.has_errors());
    }

    #[test]
    fn test_wrong_root_kind() {
        let root = CstNode::new(NodeKind::Block).with_token(
            Role::Punct,
            Token::new(TokenKind::Punct, "{", 1, 0),
        );
        let mut sink = ErrorSink::new();
        let err = lower(&SyntaxTree::new(root), LowerOptions::default(), &mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(sink.has_errors());
    }

    #[test]
    fn test_script_methods_can_be_rejected() {
        let root = unit(vec![method("foo", None, vec![], block(vec![]))]);
        let tree = lay_out(root).tree;
        let options = LowerOptions {
            allow_script_methods: false,
            ..Default::default()
        };
        let err = lower(&tree, options, &mut ErrorSink::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_default_depth_limit_fits_small_stack() {
        let limit = LowerOptions::default().max_depth;
        let worker = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let expr = (0..=limit).fold(int("1"), |inner, _| paren(inner));
                let tree = lay_out(unit(vec![expr_stmt(expr)])).tree;
                lower(&tree, LowerOptions::default(), &mut ErrorSink::new()).unwrap_err()
            })
            .unwrap();
        let err = worker.join().unwrap();
        assert!(matches!(err, CompileError::NestingTooDeep { limit: 512, .. }));
    }

    #[test]
    fn test_tokenless_node_error_points_at_enclosing_expression() {
        let root = unit(vec![
            expr_stmt(ident("a")),
            expr_stmt(paren(CstNode::new(NodeKind::ParExpression))),
        ]);
        let err = lower_unit(root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.span().start(), (2, 1));
        assert_eq!(err.span().end_line, 2);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: LowerOptions = serde_json::from_str(r#"{"max_depth": 16}"#).unwrap();
        assert_eq!(options.max_depth, 16);
        assert!(options.blank_script_return);
        assert!(options.allow_script_methods);
    }
}
