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
use crate::ast::{
    Annotation, Declaration, Expr, ExprKind, MethodDecl, Parameter, Stmt, StmtKind, TupleSlot,
    TypeKind, TypeRef, Variable,
};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, Role, TokenKind};
use crate::modifiers::{ModifierKind, ModifierNode, ModifierSet};
use crate::position::{SpanSource, configure};
use gravel_common::flags::ACC_PUBLIC;
use gravel_common::{CompileError, Span};
use indexmap::IndexMap;
use std::rc::Rc;
use std::str::FromStr;
use tracing::trace;

const TUPLE_REQUIRES_DEF: &str =
    "keyword def is required to declare tuple, e.g. def (int a, int b) = [1, 2]";

impl AstBuilder {
    pub(crate) fn build_modifiers(
        &mut self,
        node: Option<&CstNode>,
    ) -> Result<ModifierSet, CompileError> {
        let Some(node) = node else {
            return Ok(ModifierSet::default());
        };
        let mut modifiers = vec![];
        for modifier in node.children(Role::Modifier) {
            if let Some(annotation) = modifier.child(Role::Annotation) {
                modifiers.push(ModifierNode::annotation(self.build_annotation(annotation)?));
                continue;
            }
            let keyword = self.required_token(modifier, Role::Keyword)?;
            let kind = ModifierKind::from_str(&keyword.text)
                .ok()
                .filter(|k| *k != ModifierKind::Annotation)
                .ok_or_else(|| self.parse_error(modifier, "Unsupported modifier"))?;
            modifiers.push(ModifierNode::keyword(kind, keyword.source_span()));
        }
        Ok(ModifierSet::new(modifiers))
    }

    /// Annotations written directly on a package or import.
    pub(crate) fn build_annotations(&mut self, node: &CstNode) -> Result<Vec<Annotation>, CompileError> {
        node.children(Role::Annotation)
            .map(|a| self.build_annotation(a))
            .collect()
    }

    pub(crate) fn build_annotation(&mut self, node: &CstNode) -> Result<Annotation, CompileError> {
        let class_name = self.qualified_name(self.required(node, Role::Name)?);
        let mut members = IndexMap::new();
        for pair in node.children(Role::Pair) {
            let name = self.required_token(pair, Role::Name)?;
            let value = self.build_element_value(self.required(pair, Role::Value)?)?;
            if members.insert(name.text.clone(), value).is_some() {
                return Err(CompileError::invalid(
                    format!("Duplicate annotation member: {}", name.text),
                    name.source_span(),
                ));
            }
        }
        if let Some(value) = node.child(Role::Value) {
            members.insert("value".to_string(), self.build_element_value(value)?);
        }
        Ok(Annotation {
            class_name,
            members,
            span: node.source_span(),
        })
    }

    fn build_element_value(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        if let Some(expression) = node.child(Role::Expression) {
            return self.build_expression(expression);
        }
        if let Some(annotation) = node.child(Role::Annotation) {
            let annotation = self.build_annotation(annotation)?;
            return Ok(Expr::new(ExprKind::AnnotationConstant(annotation), node.source_span()));
        }
        if let Some(array) = node.child(Role::Array) {
            let elements = array
                .children(Role::Element)
                .map(|e| self.build_element_value(e))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Expr::new(
                ExprKind::List {
                    elements,
                    wrapped: false,
                },
                array.source_span(),
            ));
        }
        Err(self.parse_error(node, "Unsupported annotation value"))
    }

    /// One expression statement per declared name.
    pub(crate) fn build_local_variable_declaration(
        &mut self,
        node: &CstNode,
    ) -> Result<Vec<Stmt>, CompileError> {
        let modifiers = self.build_modifiers(node.child(Role::Modifiers))?;
        if let Some(pairs) = node.child(Role::Tuple) {
            return self.build_tuple_declaration(node, pairs, &modifiers);
        }

        let declarators: Vec<&CstNode> = node.children(Role::Declarator).collect();
        if declarators.is_empty() {
            return Err(self.parse_error(node, "Unsupported local variable declaration"));
        }
        let construct = node.source_span();
        let mut statements = vec![];
        for (i, declarator) in declarators.iter().enumerate() {
            let name = self.required_token(declarator, Role::Name)?;
            let ty = match node.child(Role::Type) {
                Some(t) => self.build_type(t)?,
                None => TypeRef::dynamic(name.source_span()),
            };
            let initializer =
                self.build_variable_initializer(declarator.child(Role::Initializer), declarator.source_span())?;
            let mut declaration = Declaration {
                variable: Variable {
                    name: name.text.clone(),
                    ty,
                    modifiers: 0,
                },
                variable_span: name.source_span(),
                initializer: Rc::new(initializer),
                tuple: None,
                annotations: vec![],
            };
            modifiers.apply_to_declaration(&mut declaration);

            // A lone declarator covers the whole construct; in a list the first one also takes
            // the modifiers and type in front of it.
            let span = match (declarators.len(), i) {
                (1, _) => construct,
                (_, 0) => declarator.source_span().with_start_of(&construct),
                _ => declarator.source_span(),
            };
            trace!(name = %name.text, "local variable");
            let expr = Expr::new(ExprKind::Declaration(Box::new(declaration)), span);
            statements.push(Stmt::new(StmtKind::Expression(expr), span));
        }
        Ok(statements)
    }

    fn build_tuple_declaration(
        &mut self,
        node: &CstNode,
        pairs: &CstNode,
        modifiers: &ModifierSet,
    ) -> Result<Vec<Stmt>, CompileError> {
        let span = node.source_span();
        if !modifiers.contains(ModifierKind::Def) {
            return Err(self.parse_error(node, TUPLE_REQUIRES_DEF));
        }
        let initializer = Rc::new(self.build_variable_initializer(node.child(Role::Initializer), span)?);
        let slots: Vec<&CstNode> = pairs.children(Role::Pair).collect();
        let arity = slots.len();

        let mut statements = vec![];
        for (index, slot) in slots.into_iter().enumerate() {
            let name = self.required_token(slot, Role::Name)?;
            let ty = match slot.child(Role::Type) {
                Some(t) => self.build_type(t)?,
                None => TypeRef::dynamic(name.source_span()),
            };
            let mut declaration = Declaration {
                variable: Variable {
                    name: name.text.clone(),
                    ty,
                    modifiers: 0,
                },
                variable_span: slot.source_span(),
                initializer: Rc::clone(&initializer),
                tuple: Some(TupleSlot { index, arity }),
                annotations: vec![],
            };
            modifiers.apply_to_declaration(&mut declaration);
            let expr = Expr::new(ExprKind::Declaration(Box::new(declaration)), span);
            statements.push(Stmt::new(StmtKind::Expression(expr), span));
        }
        Ok(statements)
    }

    fn build_variable_initializer(
        &mut self,
        node: Option<&CstNode>,
        fallback: Span,
    ) -> Result<Expr, CompileError> {
        let Some(node) = node else {
            return Ok(Expr::empty(fallback));
        };
        if let Some(array) = node.child(Role::Array) {
            let elements = array
                .children(Role::Element)
                .map(|e| self.build_variable_initializer(Some(e), e.source_span()))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Expr::new(
                ExprKind::List {
                    elements,
                    wrapped: false,
                },
                node.source_span(),
            ));
        }
        let expr = self.build_expression(self.required(node, Role::Expression)?)?;
        Ok(configure(expr, node))
    }

    pub(crate) fn build_method_declaration(&mut self, node: &CstNode) -> Result<MethodDecl, CompileError> {
        let modifiers = self.build_modifiers(node.child(Role::Modifiers))?;
        let name_token = self.required_token(node, Role::Name)?;
        let name = if name_token.kind == TokenKind::StringLiteral {
            self.string_value(name_token, node)?
        } else {
            name_token.text.clone()
        };

        let return_type_node = node.child(Role::ReturnType);
        let return_type = match return_type_node {
            None => TypeRef::dynamic(name_token.source_span()),
            Some(rt) => match rt.child(Role::Type) {
                Some(t) => self.build_type(t)?,
                None if rt.token(Role::Keyword).is_some_and(|k| k.is("void")) => {
                    TypeRef::new(TypeKind::Void, rt.source_span())
                }
                None => return Err(self.parse_error(rt, "Unsupported return type")),
            },
        };

        let parameters = self
            .required(node, Role::Parameters)?
            .children(Role::Parameter)
            .map(|p| self.build_formal_parameter(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exceptions = match node.child(Role::Throws) {
            Some(list) => list
                .children(Role::Element)
                .map(|e| self.build_qualified_class_name(e))
                .collect(),
            None => vec![],
        };
        let body = self.visit_opt(node.child(Role::Body), Self::build_block)?;

        let synthetic_public = modifiers
            .visibility_facts(return_type_node.is_some(), false)
            .is_synthetic_public();
        let mut method = MethodDecl {
            name,
            modifiers: 0,
            return_type,
            parameters,
            exceptions,
            body,
            annotations: vec![],
            synthetic_public,
            span: node.source_span(),
        };
        modifiers.apply_to_method(&mut method);
        if !modifiers.contains_visibility_modifier() {
            method.modifiers |= ACC_PUBLIC;
        }
        trace!(name = %method.name, modifiers = method.modifiers, "method");
        Ok(method)
    }

    pub(crate) fn build_formal_parameter(&mut self, node: &CstNode) -> Result<Parameter, CompileError> {
        let modifiers = self.build_modifiers(node.child(Role::Modifiers))?;
        let name = self.required_token(node, Role::Name)?;
        let mut ty = match node.child(Role::Type) {
            Some(t) => self.build_type(t)?,
            None => TypeRef::dynamic(name.source_span()),
        };
        if let Some(ellipsis) = node.token(Role::Ellipsis) {
            ty = configure(ty.array_of(), ellipsis);
        }
        let default_value = self.visit_opt(node.child(Role::Default), Self::build_expression)?;
        let mut parameter = Parameter {
            name: name.text.clone(),
            ty,
            modifiers: 0,
            annotations: vec![],
            default_value,
            span: node.source_span(),
        };
        modifiers.apply_to_parameter(&mut parameter);
        Ok(parameter)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExprKind, MethodDecl, StmtKind, TypeKind};
    use crate::cst::{CstNode, Role};
    use crate::testing::dsl::*;
    use crate::testing::lower_unit;
    use crate::unparse::unparse_expr;
    use gravel_common::flags::*;
    use gravel_common::{ErrorKind, Span};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn declarations(node: CstNode) -> Vec<crate::ast::Expr> {
        lower_unit(unit(vec![node]))
            .unwrap()
            .statements
            .into_iter()
            .map(|s| match s.kind {
                StmtKind::Expression(e) => e,
                other => panic!("expected expression statement, got {other:?}"),
            })
            .collect()
    }

    fn lower_method(node: CstNode) -> MethodDecl {
        let mut unit = lower_unit(unit(vec![node])).unwrap();
        assert_eq!(unit.methods.len(), 1);
        unit.methods.remove(0)
    }

    #[test]
    fn test_multiple_declarators() {
        // int a = 1 , b
        let exprs = declarations(local_var(
            vec![],
            Some(primitive_type("int")),
            vec![declarator("a", Some(init_expr(int("1")))), declarator("b", None)],
        ));
        assert_eq!(exprs.len(), 2);
        let ExprKind::Declaration(a) = &exprs[0].kind else {
            panic!("expected declaration");
        };
        let ExprKind::Declaration(b) = &exprs[1].kind else {
            panic!("expected declaration");
        };
        assert_eq!(a.variable.ty.name(), "int");
        assert_eq!(b.variable.ty.name(), "int");
        assert!(matches!(b.initializer.kind, ExprKind::Empty));
        // The first declaration starts at the type, the second at its own name.
        assert_eq!(exprs[0].span, Span::new(1, 1, 1, 10));
        assert_eq!(exprs[1].span, Span::new(1, 13, 1, 14));
        assert_eq!(a.variable_span, Span::new(1, 5, 1, 6));
    }

    #[test]
    fn test_single_declarator_spans_construct() {
        let exprs = declarations(local_var(
            vec![modifier("final")],
            None,
            vec![declarator("x", Some(init_expr(int("1"))))],
        ));
        assert_eq!(exprs[0].span, Span::new(1, 1, 1, 12));
        let ExprKind::Declaration(d) = &exprs[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(d.variable.modifiers, ACC_FINAL);
        assert_eq!(d.variable.ty.kind, TypeKind::Dynamic);
    }

    #[test]
    fn test_tuple_declaration_shares_initializer() {
        let exprs = declarations(tuple_decl(
            vec![modifier("def")],
            vec![pair(Some(primitive_type("int")), "a"), pair(None, "b")],
            init_expr(list(vec![elem(int("1")), elem(int("2"))])),
        ));
        assert_eq!(exprs.len(), 2);
        let decls: Vec<_> = exprs
            .iter()
            .map(|e| match &e.kind {
                ExprKind::Declaration(d) => d.clone(),
                other => panic!("expected declaration, got {other:?}"),
            })
            .collect();
        assert_eq!(decls[0].tuple.map(|t| (t.index, t.arity)), Some((0, 2)));
        assert_eq!(decls[1].tuple.map(|t| (t.index, t.arity)), Some((1, 2)));
        assert_eq!(decls[0].variable.ty.name(), "int");
        assert_eq!(*decls[0].initializer, *decls[1].initializer);
        assert_eq!(unparse_expr(&decls[0].initializer), "[1, 2]");
        assert_eq!(exprs[0].span, exprs[1].span);
    }

    #[test]
    fn test_tuple_shares_one_allocation() {
        let exprs = declarations(tuple_decl(
            vec![modifier("def")],
            vec![pair(None, "a"), pair(None, "b")],
            init_expr(ident("pair")),
        ));
        let (ExprKind::Declaration(a), ExprKind::Declaration(b)) = (&exprs[0].kind, &exprs[1].kind)
        else {
            panic!("expected declarations");
        };
        assert!(Rc::ptr_eq(&a.initializer, &b.initializer));
    }

    #[test]
    fn test_tuple_without_def_is_structural() {
        let err = lower_unit(unit(vec![tuple_decl(
            vec![modifier("final")],
            vec![pair(None, "a")],
            init_expr(ident("xs")),
        )]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.message().starts_with("keyword def is required to declare tuple"));
    }

    #[test]
    fn test_array_initializer() {
        let exprs = declarations(local_var(
            vec![],
            Some(array_type(primitive_type("int"), 1)),
            vec![declarator("xs", Some(init_array(vec![init_expr(int("1")), init_expr(int("2"))])))],
        ));
        let ExprKind::Declaration(d) = &exprs[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(unparse_expr(&d.initializer), "[1, 2]");
        assert_eq!(d.variable.ty.name(), "int[]");
    }

    #[test]
    fn test_annotated_declaration() {
        let exprs = declarations(local_var(
            vec![annotation_modifier(annotation(&["Field"], vec![])), modifier("def")],
            None,
            vec![declarator("x", None)],
        ));
        let ExprKind::Declaration(d) = &exprs[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(d.annotations.len(), 1);
        assert_eq!(d.annotations[0].class_name, "Field");
        assert_eq!(d.variable.modifiers, 0);
    }

    #[test]
    fn test_annotation_members() {
        let exprs = declarations(local_var(
            vec![annotation_modifier(annotation(
                &["groovy", "transform", "Field"],
                vec![
                    ("name", ev_expr(string("'x'"))),
                    ("tags", ev_array(vec![ev_expr(string("'a'")), ev_expr(string("'b'"))])),
                    ("nested", ev_annotation(annotation(&["Inner"], vec![]))),
                ],
            ))],
            Some(class_type(&["String"])),
            vec![declarator("s", None)],
        ));
        let ExprKind::Declaration(d) = &exprs[0].kind else {
            panic!("expected declaration");
        };
        let annotation = &d.annotations[0];
        assert_eq!(annotation.class_name, "groovy.transform.Field");
        let keys: Vec<_> = annotation.members.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "tags", "nested"]);
        assert!(matches!(annotation.members["tags"].kind, ExprKind::List { .. }));
        assert!(matches!(annotation.members["nested"].kind, ExprKind::AnnotationConstant(_)));
    }

    #[test]
    fn test_single_annotation_value() {
        let root = unit(vec![]).with_node(
            Role::Package,
            package(&["p"]).with_node(Role::Annotation, annotation_value(&["Deprecated"], ev_expr(boolean(true)))),
        );
        let unit = lower_unit(root).unwrap();
        let package = unit.package.unwrap();
        assert_eq!(package.annotations[0].members.len(), 1);
        assert!(package.annotations[0].members.contains_key("value"));
    }

    #[test]
    fn test_duplicate_annotation_member_is_invalid() {
        let err = lower_unit(unit(vec![local_var(
            vec![annotation_modifier(annotation(
                &["A"],
                vec![("x", ev_expr(int("1"))), ("x", ev_expr(int("2")))],
            ))],
            None,
            vec![declarator("v", None)],
        )]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_unknown_modifier_is_structural() {
        let err = lower_unit(unit(vec![local_var(vec![modifier("sealed")], None, vec![declarator("v", None)])]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_untyped_method_is_public() {
        let method = lower_method(method_full(
            vec![modifier("def")],
            None,
            "greet",
            vec![param(None, "name")],
            vec![],
            Some(block(vec![])),
        ));
        assert_eq!(method.name, "greet");
        assert_eq!(method.modifiers, ACC_PUBLIC);
        assert!(method.synthetic_public);
        assert_eq!(method.return_type.kind, TypeKind::Dynamic);
        assert_eq!(method.parameters[0].ty.kind, TypeKind::Dynamic);
    }

    #[test]
    fn test_private_static_method() {
        let method = lower_method(method_full(
            vec![modifier("private"), modifier("static")],
            Some(void_return()),
            "run",
            vec![],
            vec![&["java", "io", "IOException"]],
            Some(block(vec![return_stmt(None)])),
        ));
        assert_eq!(method.modifiers, ACC_PRIVATE | ACC_STATIC);
        assert!(!method.synthetic_public);
        assert_eq!(method.return_type.kind, TypeKind::Void);
        assert_eq!(method.exceptions[0].name(), "java.io.IOException");
        assert!(method.body.is_some());
    }

    #[test]
    fn test_typed_method_without_modifiers() {
        let method = lower_method(method(
            "size",
            Some(return_type(primitive_type("int"))),
            vec![],
            block(vec![]),
        ));
        assert_eq!(method.modifiers, ACC_PUBLIC);
        assert!(!method.synthetic_public);
    }

    #[test]
    fn test_def_with_return_type_is_synthetic_public() {
        let method = lower_method(method_full(
            vec![modifier("def")],
            Some(return_type(class_type(&["String"]))),
            "name",
            vec![],
            vec![],
            Some(block(vec![])),
        ));
        assert!(method.synthetic_public);
    }

    #[test]
    fn test_abstract_method_has_no_body() {
        let method = lower_method(method_full(
            vec![modifier("abstract")],
            Some(void_return()),
            "todo",
            vec![],
            vec![],
            None,
        ));
        assert!(method.body.is_none());
        assert_eq!(method.modifiers, ACC_ABSTRACT | ACC_PUBLIC);
    }

    #[test]
    fn test_string_method_name() {
        let method = lower_method(method("'with space'", None, vec![], block(vec![])));
        assert_eq!(method.name, "with space");
    }

    #[test]
    fn test_parameters() {
        let method = lower_method(method(
            "m",
            None,
            vec![
                param_full(vec![modifier("final")], Some(class_type(&["String"])), true, "rest", None),
                param_full(vec![], None, false, "x", Some(int("1"))),
            ],
            block(vec![]),
        ));
        let rest = &method.parameters[0];
        assert_eq!(rest.ty.name(), "String[]");
        assert_eq!(rest.modifiers, ACC_FINAL);
        let x = &method.parameters[1];
        assert_eq!(x.default_value.as_ref().map(unparse_expr), Some("1".to_string()));
    }
}
