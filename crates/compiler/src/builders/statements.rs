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
use crate::ast::{CatchClause, Expr, ExprKind, Parameter, Stmt, StmtKind, TypeRef};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, NodeKind, Role};
use crate::position::{SpanSource, configure};
use gravel_common::{CompileError, Span};
use tracing::trace;

impl AstBuilder {
    /// Lower a statement that may expand into several (multi-name declarations) or carry labels.
    pub(crate) fn build_block_statement(
        &mut self,
        node: &CstNode,
    ) -> Result<Vec<Stmt>, CompileError> {
        match node.kind {
            NodeKind::LocalVariableDeclaration => self.build_local_variable_declaration(node),
            NodeKind::Labeled => {
                let label = self.required_token(node, Role::Label)?.text.clone();
                let mut statements = self.build_block_statement(self.required(node, Role::Statement)?)?;
                for statement in &mut statements {
                    statement.labels.push(label.clone());
                }
                Ok(statements)
            }
            NodeKind::TypeDeclaration => Err(self.parse_error(node, "Unsupported type declaration")),
            NodeKind::MethodDeclaration => Err(self.parse_error(
                node,
                "Method declarations are only allowed at the top level of a script",
            )),
            _ => Ok(vec![self.build_statement(node)?]),
        }
    }

    /// Lower a statement in a position that holds exactly one; expansions are wrapped in a block.
    pub(crate) fn build_statement(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        self.nested(node, |b| b.build_statement_inner(node))
    }

    fn build_statement_inner(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        trace!(kind = %node.kind, "statement");
        let span = self.span_of(node);
        let kind = match node.kind {
            NodeKind::Block => return self.build_block(node),
            NodeKind::Assert => {
                let condition = self.build_condition(self.required(node, Role::Condition)?)?;
                let message = node
                    .child(Role::Message)
                    .map(|m| self.build_expression(m))
                    .transpose()?;
                StmtKind::Assert { condition, message }
            }
            NodeKind::If => {
                let condition = self.build_condition(self.required(node, Role::Condition)?)?;
                let then = self.build_statement(self.required(node, Role::Then)?)?;
                let otherwise = match node.child(Role::Else) {
                    Some(e) => self.build_statement(e)?,
                    None => Stmt::empty(span),
                };
                StmtKind::If {
                    condition,
                    then: then.boxed(),
                    otherwise: otherwise.boxed(),
                }
            }
            NodeKind::For => return self.build_for(node),
            NodeKind::While => {
                let condition = self.build_condition(self.required(node, Role::Condition)?)?;
                let body = self.build_statement(self.required(node, Role::Body)?)?;
                StmtKind::While {
                    condition,
                    body: body.boxed(),
                }
            }
            NodeKind::Try => return self.build_try(node),
            NodeKind::Switch => return self.build_switch(node),
            NodeKind::Synchronized => {
                let lock = self.build_expression(self.required(node, Role::Condition)?)?;
                let body = self.build_statement(self.required(node, Role::Body)?)?;
                StmtKind::Synchronized {
                    lock,
                    body: body.boxed(),
                }
            }
            NodeKind::Return => StmtKind::Return(match node.child(Role::Expression) {
                Some(e) => self.build_expression(e)?,
                None => Expr::null(span),
            }),
            NodeKind::Throw => {
                StmtKind::Throw(self.build_expression(self.required(node, Role::Expression)?)?)
            }
            NodeKind::Break => StmtKind::Break(node.token(Role::Label).map(|t| t.text.clone())),
            NodeKind::Continue => {
                StmtKind::Continue(node.token(Role::Label).map(|t| t.text.clone()))
            }
            NodeKind::ExpressionStatement => {
                StmtKind::Expression(self.build_expression(self.required(node, Role::Expression)?)?)
            }
            NodeKind::Labeled
            | NodeKind::LocalVariableDeclaration
            | NodeKind::TypeDeclaration
            | NodeKind::MethodDeclaration => {
                let mut statements = self.build_block_statement(node)?;
                if statements.len() == 1 {
                    if let Some(statement) = statements.pop() {
                        return Ok(statement);
                    }
                }
                StmtKind::Block(statements)
            }
            _ => return Err(self.parse_error(node, "Unsupported statement")),
        };
        Ok(Stmt::new(kind, span))
    }

    /// `{ ... }`
    pub(crate) fn build_block(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        let statements = self.build_statement_list(node)?;
        Ok(Stmt::new(StmtKind::Block(statements), node.source_span()))
    }

    /// A brace-less statement list, or an empty block spanned by `fallback` when there is none.
    pub(crate) fn build_block_statements(
        &mut self,
        node: Option<&CstNode>,
        fallback: Span,
    ) -> Result<Stmt, CompileError> {
        let Some(node) = node else {
            return Ok(Stmt::new(StmtKind::Block(vec![]), fallback));
        };
        let statements = self.build_statement_list(node)?;
        Ok(Stmt::new(StmtKind::Block(statements), node.source_span_or(fallback)))
    }

    fn build_statement_list(&mut self, node: &CstNode) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = vec![];
        for child in node.children(Role::Statement) {
            statements.extend(self.build_block_statement(child)?);
        }
        Ok(statements)
    }

    /// Wrap a condition as a boolean test spanned by the condition's own node.
    fn build_condition(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let condition = self.build_expression(node)?;
        Ok(Expr::new(ExprKind::Boolean(condition.boxed()), node.source_span()))
    }

    fn build_for(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        let control = self.required(node, Role::Control)?;
        let body = self.build_statement(self.required(node, Role::Body)?)?;
        let (variable, collection) = match control.kind {
            NodeKind::EnhancedForControl => {
                let name = self.required_token(control, Role::Name)?;
                let ty = match control.child(Role::Type) {
                    Some(t) => self.build_type(t)?,
                    None => TypeRef::dynamic(name.source_span()),
                };
                let parameter = Parameter {
                    name: name.text.clone(),
                    ty,
                    modifiers: 0,
                    annotations: vec![],
                    default_value: None,
                    span: name.source_span(),
                };
                let collection = self.build_expression(self.required(control, Role::Expression)?)?;
                (Some(parameter), collection)
            }
            NodeKind::ClassicForControl => {
                let span = control.source_span();
                let init = match control.child(Role::Init) {
                    Some(init) => self.build_for_init(init)?,
                    None => Expr::empty(span),
                };
                let condition = match control.child(Role::Condition) {
                    Some(c) => self.build_expression(c)?,
                    None => Expr::empty(span),
                };
                let update = match control.child(Role::Update) {
                    Some(u) => configure(self.build_expression(self.required(u, Role::Expression)?)?, u),
                    None => Expr::empty(span),
                };
                let header = Expr::new(ExprKind::ClosureList(vec![init, condition, update]), span);
                (None, header)
            }
            _ => return Err(self.parse_error(control, "Unsupported for control")),
        };
        Ok(Stmt::new(
            StmtKind::For {
                variable,
                collection,
                body: body.boxed(),
            },
            node.source_span(),
        ))
    }

    fn build_for_init(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        if let Some(declaration) = node.child(Role::Statement) {
            let mut declarations: Vec<Expr> = self
                .build_local_variable_declaration(declaration)?
                .into_iter()
                .filter_map(|s| match s.kind {
                    StmtKind::Expression(e) => Some(e),
                    _ => None,
                })
                .collect();
            if declarations.len() == 1 {
                if let Some(single) = declarations.pop() {
                    return Ok(configure(single, node));
                }
            }
            return Ok(Expr::new(ExprKind::ClosureList(declarations), node.source_span()));
        }
        let expr = self.build_expression(self.required(node, Role::Expression)?)?;
        Ok(configure(expr, node))
    }

    fn build_try(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        let span = node.source_span();
        let body = self.build_block(self.required(node, Role::Body)?)?;

        let mut catches = vec![];
        for clause in node.children(Role::Catch) {
            let name = self.required_token(clause, Role::Name)?;
            let block = self.build_block(self.required(clause, Role::Body)?)?;
            let types: Vec<TypeRef> = match clause.child(Role::CatchType) {
                Some(list) => list
                    .children(Role::Element)
                    .map(|t| self.build_qualified_class_name(t))
                    .collect(),
                None => vec![],
            };
            let types = if types.is_empty() {
                vec![TypeRef::dynamic(name.source_span())]
            } else {
                types
            };
            // One clause per alternative of a multi-catch, all sharing the block.
            for ty in types {
                catches.push(CatchClause {
                    parameter: Parameter {
                        name: name.text.clone(),
                        ty,
                        modifiers: 0,
                        annotations: vec![],
                        default_value: None,
                        span: name.source_span(),
                    },
                    body: block.clone(),
                    span: block.span,
                });
            }
        }

        let finally = match node.child(Role::Finally) {
            Some(f) => {
                let inner = self.build_block(self.required(f, Role::Body)?)?;
                Stmt::new(StmtKind::Block(vec![inner]), f.source_span())
            }
            None => Stmt::empty(span),
        };

        Ok(Stmt::new(
            StmtKind::TryCatch {
                body: body.boxed(),
                catches,
                finally: finally.boxed(),
            },
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExprKind, Stmt, StmtKind, TypeKind};
    use crate::testing::dsl::*;
    use crate::testing::{lay_out, lower_unit};
    use crate::unparse::unparse_expr;
    use gravel_common::{ErrorKind, Span};
    use pretty_assertions::assert_eq;

    fn single(statement: crate::cst::CstNode) -> Stmt {
        let mut unit = lower_unit(unit(vec![statement])).unwrap();
        assert_eq!(unit.statements.len(), 1, "{:?}", unit.statements);
        unit.statements.remove(0)
    }

    #[test]
    fn test_if_without_else_gets_empty() {
        let stmt = single(if_stmt(ident("a"), block(vec![expr_stmt(ident("b"))]), None));
        let StmtKind::If { condition, then, otherwise } = stmt.kind else {
            panic!("expected if");
        };
        assert!(matches!(condition.kind, ExprKind::Boolean(_)));
        // `if ( a )`: the condition keeps its parentheses in the span.
        assert_eq!(condition.span, Span::new(1, 4, 1, 9));
        assert!(matches!(then.kind, StmtKind::Block(ref b) if b.len() == 1));
        assert!(otherwise.is_empty());
    }

    #[test]
    fn test_while_and_assert() {
        let stmt = single(while_stmt(boolean(true), block(vec![])));
        assert!(matches!(stmt.kind, StmtKind::While { .. }));

        let stmt = single(assert_stmt(ident("ok"), Some(string("'failed'"))));
        let StmtKind::Assert { condition, message } = stmt.kind else {
            panic!("expected assert");
        };
        assert!(matches!(condition.kind, ExprKind::Boolean(_)));
        assert_eq!(message.map(|m| unparse_expr(&m)), Some("failed".to_string()));
    }

    #[test]
    fn test_return_defaults_to_null() {
        let stmt = single(return_stmt(None));
        assert!(matches!(stmt.kind, StmtKind::Return(ref e) if unparse_expr(e) == "null"));
    }

    #[test]
    fn test_break_continue_labels() {
        assert_eq!(single(break_stmt(Some("outer"))).kind, StmtKind::Break(Some("outer".into())));
        assert_eq!(single(continue_stmt(None)).kind, StmtKind::Continue(None));
    }

    #[test]
    fn test_labels_copy_to_every_declaration() {
        let root = unit(vec![labeled(
            "here",
            local_var(
                vec![modifier("def")],
                None,
                vec![declarator("a", None), declarator("b", None)],
            ),
        )]);
        let unit = lower_unit(root).unwrap();
        assert_eq!(unit.statements.len(), 2);
        for statement in &unit.statements {
            assert_eq!(statement.labels, vec!["here".to_string()]);
        }
    }

    #[test]
    fn test_nested_labels_inner_first() {
        let stmt = single(labeled("a", labeled("b", expr_stmt(ident("x")))));
        assert_eq!(stmt.labels, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_enhanced_for() {
        let stmt = single(for_in(
            Some(class_type(&["String"])),
            "s",
            ident("names"),
            block(vec![]),
        ));
        let StmtKind::For { variable, collection, .. } = stmt.kind else {
            panic!("expected for");
        };
        let variable = variable.unwrap();
        assert_eq!(variable.name, "s");
        assert_eq!(variable.ty.name(), "String");
        assert_eq!(unparse_expr(&collection), "names");
    }

    #[test]
    fn test_untyped_enhanced_for_is_dynamic() {
        let stmt = single(for_in(None, "x", ident("xs"), block(vec![])));
        let StmtKind::For { variable: Some(variable), .. } = stmt.kind else {
            panic!("expected for-in");
        };
        assert_eq!(variable.ty.kind, TypeKind::Dynamic);
    }

    #[test]
    fn test_classic_for_header() {
        let stmt = single(for_classic(
            Some(for_init_decl(local_var(
                vec![],
                Some(primitive_type("int")),
                vec![declarator("i", Some(init_expr(int("0"))))],
            ))),
            Some(binary(ident("i"), "<", int("10"))),
            Some(postfix(ident("i"), "++")),
            block(vec![]),
        ));
        let StmtKind::For { variable, collection, .. } = stmt.kind else {
            panic!("expected for");
        };
        assert!(variable.is_none());
        let ExprKind::ClosureList(parts) = &collection.kind else {
            panic!("expected closure list, got {collection:?}");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0].kind, ExprKind::Declaration(_)));
        assert_eq!(unparse_expr(&parts[1]), "i < 10");
        assert_eq!(unparse_expr(&parts[2]), "i++");
    }

    #[test]
    fn test_classic_for_empty_header() {
        let stmt = single(for_classic(None, None, None, block(vec![])));
        let StmtKind::For { collection, .. } = stmt.kind else {
            panic!("expected for");
        };
        let ExprKind::ClosureList(parts) = &collection.kind else {
            panic!("expected closure list");
        };
        assert!(parts.iter().all(|p| matches!(p.kind, ExprKind::Empty)));
    }

    #[test]
    fn test_multi_catch_expands() {
        let stmt = single(try_stmt(
            block(vec![expr_stmt(ident("risky"))]),
            vec![
                catch(&[&["IOException"], &["java", "sql", "SQLException"]], "e", block(vec![])),
                catch(&[], "any", block(vec![])),
            ],
            Some(block(vec![expr_stmt(ident("cleanup"))])),
        ));
        let StmtKind::TryCatch { catches, finally, .. } = stmt.kind else {
            panic!("expected try");
        };
        let types: Vec<_> = catches.iter().map(|c| c.parameter.ty.name()).collect();
        assert_eq!(
            types,
            vec!["IOException", "java.sql.SQLException", "java.lang.Object"]
        );
        assert_eq!(catches[0].body, catches[1].body);
        assert_eq!(catches[0].span, catches[0].body.span);
        let StmtKind::Block(inner) = &finally.kind else {
            panic!("expected finally block");
        };
        assert!(matches!(inner[0].kind, StmtKind::Block(_)));
    }

    #[test]
    fn test_try_without_finally() {
        let stmt = single(try_stmt(block(vec![]), vec![catch(&[], "e", block(vec![]))], None));
        let StmtKind::TryCatch { finally, .. } = stmt.kind else {
            panic!("expected try");
        };
        assert!(finally.is_empty());
    }

    #[test]
    fn test_synchronized_and_throw() {
        let stmt = single(synchronized(ident("lock"), block(vec![throw_stmt(ident("e"))])));
        let StmtKind::Synchronized { lock, body } = stmt.kind else {
            panic!("expected synchronized");
        };
        assert_eq!(unparse_expr(&lock), "(lock)");
        let StmtKind::Block(inner) = &body.kind else {
            panic!("expected block");
        };
        assert!(matches!(inner[0].kind, StmtKind::Throw(_)));
    }

    #[test]
    fn test_declaration_in_single_statement_position_is_wrapped() {
        let stmt = single(if_stmt(
            ident("c"),
            local_var(vec![modifier("def")], None, vec![declarator("a", None), declarator("b", None)]),
            None,
        ));
        let StmtKind::If { then, .. } = stmt.kind else {
            panic!("expected if");
        };
        assert!(matches!(then.kind, StmtKind::Block(ref b) if b.len() == 2));
    }

    #[test]
    fn test_type_declaration_is_rejected() {
        let err = lower_unit(unit(vec![type_decl("class", "Foo")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.message().starts_with("Unsupported type declaration"));
    }

    #[test]
    fn test_nested_method_is_rejected() {
        let root = unit(vec![block(vec![method("m", None, vec![], block(vec![]))])]);
        assert_eq!(lower_unit(root).unwrap_err().kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_statement_spans_follow_source() {
        let laid_out = lay_out(unit(vec![expr_stmt(ident("a")), return_stmt(Some(int("1")))]));
        assert_eq!(laid_out.source, "a\nreturn 1");
        let unit = lower_unit(unit(vec![expr_stmt(ident("a")), return_stmt(Some(int("1")))])).unwrap();
        assert_eq!(unit.statements[1].span, Span::new(2, 1, 2, 9));
    }
}
