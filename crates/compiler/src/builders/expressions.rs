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
    Arguments, ArgumentsKind, BinaryOp, CALL_METHOD, ClosureParams, Constant, ConstantValue, Expr,
    ExprKind, IncDec, MapEntry, MethodCall, PropertyAccess, TypeKind, TypeRef,
};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, NodeKind, Role, Token, TokenKind};
use crate::literals::strings::{gstring_begin, gstring_end, gstring_part};
use crate::literals::{EscapeMode, Number, clean_string_literal, parse_decimal, parse_integer};
use crate::position::{SpanSource, configure};
use crate::unparse::{constant_text, unparse_expr};
use gravel_common::CompileError;
use std::str::FromStr;
use tracing::trace;

const LHS_NOT_VARIABLE: &str = "The LHS of an assignment should be a variable";

impl AstBuilder {
    pub(crate) fn build_expression(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        self.nested(node, |b| b.build_expression_inner(node))
    }

    fn build_expression_inner(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        trace!(kind = %node.kind, "expression");
        let span = self.span_of(node);
        let kind = match node.kind {
            NodeKind::Path => return self.build_path(node),
            NodeKind::CommandExpression => return self.build_command_expression(node),
            NodeKind::ExpressionListElement => return self.build_list_element(node),
            NodeKind::Postfix => {
                let expr = self.build_expression(self.required(node, Role::Operand)?)?;
                let op = self.inc_dec(node)?;
                ExprKind::Postfix {
                    expr: expr.boxed(),
                    op,
                }
            }
            NodeKind::UnaryAdd => return self.build_unary_add(node),
            NodeKind::UnaryNot => {
                let operand = self.build_expression(self.required(node, Role::Operand)?)?;
                match self.required_token(node, Role::Operator)?.text.as_str() {
                    "!" => ExprKind::Not(operand.boxed()),
                    "~" => ExprKind::BitwiseNegation(operand.boxed()),
                    _ => return Err(self.parse_error(node, "Unsupported unary operation")),
                }
            }
            NodeKind::Cast => {
                let ty = self.build_type(self.required(node, Role::Type)?)?;
                let expr = self.build_expression(self.required(node, Role::Operand)?)?;
                ExprKind::Cast {
                    ty,
                    expr: expr.boxed(),
                    coerce: false,
                }
            }
            NodeKind::Binary => return self.build_binary(node),
            NodeKind::TypeTest => {
                let left = self.build_expression(self.required(node, Role::Left)?)?;
                let type_node = self.required(node, Role::Type)?;
                let ty = self.build_type(type_node)?;
                match self.required_token(node, Role::Operator)?.text.as_str() {
                    "as" => ExprKind::Cast {
                        ty,
                        expr: left.boxed(),
                        coerce: true,
                    },
                    "instanceof" => ExprKind::Binary {
                        left: left.boxed(),
                        op: BinaryOp::InstanceOf,
                        right: Expr::new(ExprKind::Class(ty), type_node.source_span()).boxed(),
                    },
                    _ => return Err(self.parse_error(node, "Unsupported relational expression")),
                }
            }
            NodeKind::Conditional => {
                let condition_node = self.required(node, Role::Condition)?;
                let condition = self.build_expression(condition_node)?;
                let otherwise = self.build_expression(self.required(node, Role::Else)?)?;
                if node.token(Role::Operator).is_some_and(|t| t.is("?:")) {
                    ExprKind::Elvis {
                        condition: condition.boxed(),
                        otherwise: otherwise.boxed(),
                    }
                } else {
                    let then = self.build_expression(self.required(node, Role::Then)?)?;
                    let test = Expr::new(
                        ExprKind::Boolean(condition.boxed()),
                        condition_node.source_span(),
                    );
                    ExprKind::Ternary {
                        condition: test.boxed(),
                        then: then.boxed(),
                        otherwise: otherwise.boxed(),
                    }
                }
            }
            NodeKind::Assignment => return self.build_assignment(node),
            NodeKind::Identifier => {
                let name = self.required_token(node, Role::Identifier)?;
                return Ok(Expr::variable(name.text.clone(), span));
            }
            NodeKind::Literal => return self.build_literal(node),
            NodeKind::GString => return self.build_gstring(node),
            NodeKind::Creator => return self.build_creator(node),
            NodeKind::This => return Ok(Expr::this(span)),
            NodeKind::Super => return Ok(Expr::variable("super", span)),
            NodeKind::ParExpression => {
                let inner = self.build_expression(self.required(node, Role::Expression)?)?;
                let mut expr = configure(inner, node);
                expr.parenthesized = true;
                return Ok(expr);
            }
            NodeKind::List => ExprKind::List {
                elements: self.build_list_elements(node)?,
                wrapped: false,
            },
            NodeKind::Map => ExprKind::Map(
                node.children(Role::Entry)
                    .map(|e| self.build_map_entry(e))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            NodeKind::BuiltInType => {
                let name = self.required_token(node, Role::Primitive)?;
                return Ok(Expr::variable(name.text.clone(), span));
            }
            NodeKind::Closure => return self.build_closure(node),
            _ => return Err(self.parse_error(node, "Unsupported expression")),
        };
        Ok(Expr::new(kind, span))
    }

    fn inc_dec(&self, node: &CstNode) -> Result<IncDec, CompileError> {
        let op = self.required_token(node, Role::Operator)?;
        IncDec::from_str(&op.text)
            .map_err(|_| self.parse_error(node, "Unsupported increment or decrement"))
    }

    /// `+x`, `-x`, `++x`, `--x`. A bare constant operand of `+` or `-` is folded.
    fn build_unary_add(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let op = self.required_token(node, Role::Operator)?.text.clone();
        let operand_node = self.required(node, Role::Operand)?;
        let operand = self.build_expression(operand_node)?;
        let span = node.source_span();
        let foldable = !operand.parenthesized && matches!(operand.kind, ExprKind::Constant(_));

        let kind = match op.as_str() {
            "+" if foldable => return Ok(configure(operand, node)),
            "+" => ExprKind::UnaryPlus(operand.boxed()),
            "-" if foldable => {
                let ExprKind::Constant(constant) = operand.kind else {
                    return Err(self.parse_error(node, "Unsupported unary operation"));
                };
                let ConstantValue::Number(number) = &constant.value else {
                    return Err(CompileError::structural(
                        "Unexpected value",
                        constant_text(&constant),
                        span,
                    ));
                };
                // A literal operand is reread with its sign so `-2147483648` stays an int.
                let negated = match self.negated_literal(operand_node)? {
                    Some(negated) => negated,
                    None => number.negate(),
                };
                ExprKind::Constant(Constant::number(negated, false))
            }
            "-" => ExprKind::UnaryMinus(operand.boxed()),
            "++" | "--" => ExprKind::Prefix {
                op: self.inc_dec(node)?,
                expr: operand.boxed(),
            },
            _ => return Err(self.parse_error(node, "Unsupported unary operation")),
        };
        Ok(Expr::new(kind, span))
    }

    fn build_binary(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let left = self.build_expression(self.required(node, Role::Left)?)?;
        let right = self.build_expression(self.required(node, Role::Right)?)?;
        // Shift operators arrive as separate `<`/`>` tokens.
        let op: String = node.tokens(Role::Operator).map(|t| t.text.as_str()).collect();
        let kind = match op.as_str() {
            ".." | "..<" => ExprKind::Range {
                from: left.boxed(),
                to: right.boxed(),
                inclusive: op == "..",
            },
            _ => {
                let op = BinaryOp::from_str(&op)
                    .map_err(|_| self.parse_error(node, "Unsupported binary operator"))?;
                ExprKind::Binary {
                    left: left.boxed(),
                    op,
                    right: right.boxed(),
                }
            }
        };
        Ok(Expr::new(kind, node.source_span()))
    }

    fn build_assignment(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let left_node = self.required(node, Role::Left)?;
        let left = self.build_expression(left_node)?;
        let assignable = !left.parenthesized
            && left
                .as_variable()
                .is_some_and(|v| v.name != "this" && v.name != "super");
        if !assignable {
            return Err(CompileError::invalid(LHS_NOT_VARIABLE, left_node.source_span()));
        }
        let op_token = self.required_token(node, Role::Operator)?;
        let op = BinaryOp::from_str(&op_token.text)
            .ok()
            .filter(BinaryOp::is_assignment)
            .ok_or_else(|| self.parse_error(node, "Unsupported assignment operator"))?;
        let right = self.build_expression(self.required(node, Role::Right)?)?;
        Ok(Expr::new(
            ExprKind::Binary {
                left: left.boxed(),
                op,
                right: right.boxed(),
            },
            node.source_span(),
        ))
    }

    /// The value of a numeric literal node with its sign flipped, or `None` for any other node.
    fn negated_literal(&self, node: &CstNode) -> Result<Option<Number>, CompileError> {
        if node.kind != NodeKind::Literal {
            return Ok(None);
        }
        let Some(token) = node.token(Role::Literal) else {
            return Ok(None);
        };
        let text = match token.text.strip_prefix('-') {
            Some(positive) => positive.to_string(),
            None => format!("-{}", token.text),
        };
        match token.kind {
            TokenKind::IntegerLiteral | TokenKind::FloatingPointLiteral => {
                self.parse_number(token.kind, &text, node).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn parse_number(&self, kind: TokenKind, text: &str, node: &CstNode) -> Result<Number, CompileError> {
        let number = if kind == TokenKind::IntegerLiteral {
            parse_integer(text)
        } else {
            parse_decimal(text)
        };
        number.map_err(|e| self.parse_error(node, &e.to_string()))
    }

    fn build_literal(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let token = self.required_token(node, Role::Literal)?;
        let constant = match token.kind {
            TokenKind::IntegerLiteral | TokenKind::FloatingPointLiteral => {
                let number = self.parse_number(token.kind, &token.text, node)?;
                Constant::number(number, !token.text.starts_with('-'))
            }
            TokenKind::StringLiteral => Constant::string_literal(self.string_value(token, node)?),
            TokenKind::BooleanLiteral => Constant::boolean(token.is("true")),
            TokenKind::NullLiteral => Constant::null(),
            _ => return Err(self.parse_error(node, "Unsupported literal")),
        };
        Ok(Expr::constant(constant, node.source_span()))
    }

    /// Decoded content of a string literal token.
    pub(crate) fn string_value(&self, token: &Token, node: &CstNode) -> Result<String, CompileError> {
        clean_string_literal(&token.text)
            .ok_or_else(|| self.parse_error(node, "Malformed string literal"))
    }

    fn build_gstring(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let begin = self.required_token(node, Role::Begin)?;
        let end = self.required_token(node, Role::End)?;
        let mode = EscapeMode::of(&begin.text);

        let segment = |text: String, token: &Token| {
            Expr::constant(Constant::string(text), token.source_span())
        };
        let mut strings = vec![segment(gstring_begin(&begin.text, mode), begin)];
        for part in node.tokens(Role::Part) {
            strings.push(segment(gstring_part(&part.text, mode), part));
        }
        strings.push(segment(gstring_end(&end.text, mode), end));

        let values = node
            .children(Role::Value)
            .map(|v| self.build_gstring_value(v))
            .collect::<Result<Vec<_>, _>>()?;

        let mut verbatim = String::new();
        for (i, string) in strings.iter().enumerate() {
            if let Some(text) = string.as_constant().and_then(Constant::as_str) {
                verbatim.push_str(text);
            }
            if let Some(value) = values.get(i) {
                verbatim.push('$');
                verbatim.push_str(&unparse_expr(value));
            }
        }

        Ok(Expr::new(
            ExprKind::GString {
                verbatim,
                strings,
                values,
            },
            node.source_span(),
        ))
    }

    fn build_gstring_value(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let span = node.source_span();
        if let Some(path) = node.child(Role::Path) {
            let name = self.required_token(path, Role::Identifier)?;
            let mut expr = Expr::variable(name.text.clone(), name.source_span());
            for part in path.tokens(Role::PathPart) {
                let property = part.text.strip_prefix('.').unwrap_or(&part.text);
                expr = Expr::new(
                    ExprKind::Property(PropertyAccess {
                        object: expr.boxed(),
                        property: Expr::constant(Constant::string(property), part.source_span())
                            .boxed(),
                        safe: false,
                        spread_safe: false,
                        pending_generics: None,
                    }),
                    part.source_span(),
                );
            }
            return Ok(configure(expr, node));
        }
        if let Some(expression) = node.child(Role::Expression) {
            let expr = self.build_expression(expression)?;
            return Ok(configure(expr, node));
        }
        if let Some(closure_node) = node.child(Role::Closure) {
            let closure = self.build_closure(closure_node)?;
            if closure_node.has(Role::Arrow) {
                return Ok(configure(closure, node));
            }
            // `${ stmts }` is evaluated in place rather than kept as a lazy closure.
            let method = Expr::constant(Constant::string(CALL_METHOD), span);
            return Ok(Expr::new(
                ExprKind::MethodCall(MethodCall {
                    object: closure.boxed(),
                    method: method.boxed(),
                    arguments: Arguments::positional(vec![], span),
                    implicit_this: false,
                    safe: false,
                    spread_safe: false,
                    generics: None,
                }),
                span,
            ));
        }
        Ok(Expr::null(span))
    }

    fn build_creator(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let ty = self.build_created_name(self.required(node, Role::Name)?)?;
        let span = node.source_span();
        if let Some(arguments) = node.child(Role::Arguments) {
            let arguments = self.build_arguments(arguments)?;
            return Ok(Expr::new(ExprKind::ConstructorCall { ty, arguments }, span));
        }
        if !node.has(Role::Dimension) && !node.has(Role::EmptyDimension) {
            return Err(self.parse_error(node, "Unsupported creator"));
        }
        let mut sizes = node
            .children(Role::Dimension)
            .map(|d| self.build_expression(d))
            .collect::<Result<Vec<_>, _>>()?;
        sizes.extend(
            node.tokens(Role::EmptyDimension)
                .map(|t| Expr::null(t.source_span())),
        );
        Ok(Expr::new(
            ExprKind::Array {
                element_type: ty,
                sizes,
            },
            span,
        ))
    }

    fn build_created_name(&mut self, node: &CstNode) -> Result<TypeRef, CompileError> {
        if let Some(primitive) = node.token(Role::Primitive) {
            return Ok(TypeRef::new(
                TypeKind::Primitive(primitive.text.clone()),
                node.source_span(),
            ));
        }
        let mut ty = self.build_qualified_class_name(self.required(node, Role::Name)?);
        if let Some(arguments) = node.child(Role::TypeArguments) {
            let arguments = self.build_type_arguments(arguments)?;
            if let TypeKind::Class { generics, .. } = &mut ty.kind {
                *generics = Some(arguments);
            }
        }
        Ok(configure(ty, node))
    }

    /// `*expr` or `expr` inside a list, argument list or subscript.
    pub(crate) fn build_list_element(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let expr = self.build_expression(self.required(node, Role::Expression)?)?;
        if node.has(Role::Spread) {
            return Ok(Expr::new(ExprKind::Spread(expr.boxed()), node.source_span()));
        }
        Ok(configure(expr, node))
    }

    fn build_list_elements(&mut self, node: &CstNode) -> Result<Vec<Expr>, CompileError> {
        node.children(Role::Element)
            .map(|e| self.build_list_element(e))
            .collect()
    }

    pub(crate) fn build_map_entry(&mut self, node: &CstNode) -> Result<MapEntry, CompileError> {
        let value = self.build_expression(self.required(node, Role::Value)?)?;
        let span = node.source_span();
        if node.has(Role::Spread) {
            let key = Expr::new(ExprKind::SpreadMap(value.clone().boxed()), span);
            return Ok(MapEntry { key, value, span });
        }
        let label = self.required(node, Role::Label)?;
        let key = if let Some(word) = label.token(Role::Keyword) {
            Expr::constant(Constant::string(word.text.clone()), word.source_span())
        } else {
            let key = self.build_expression(self.required(label, Role::Primary)?)?;
            match key.as_variable() {
                Some(variable) if !key.parenthesized => {
                    Expr::constant(Constant::string(variable.name.clone()), key.span)
                }
                _ => key,
            }
        };
        Ok(MapEntry {
            key: configure(key, label),
            value,
            span,
        })
    }

    /// `( ... )` of a call. Named entries make the whole list named.
    pub(crate) fn build_arguments(&mut self, node: &CstNode) -> Result<Arguments, CompileError> {
        match node.child(Role::List) {
            Some(list) => Ok(configure(self.build_argument_list(list)?, node)),
            None => Ok(Arguments::positional(vec![], node.source_span())),
        }
    }

    pub(crate) fn build_argument_list(&mut self, node: &CstNode) -> Result<Arguments, CompileError> {
        let span = node.source_span();
        if node.has(Role::Entry) {
            let entries = node
                .children(Role::Entry)
                .map(|e| self.build_map_entry(e))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Arguments {
                kind: ArgumentsKind::Named(entries),
                span,
            });
        }
        Ok(Arguments::positional(self.build_list_elements(node)?, span))
    }

    /// Subscript contents: one element stands alone, several become a wrapped list.
    pub(crate) fn build_index_args(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let mut elements = self.build_list_elements(node)?;
        let span = node.source_span();
        let index = match elements.len() {
            1 if matches!(elements[0].kind, ExprKind::Spread(_)) => Expr::new(
                ExprKind::List {
                    elements,
                    wrapped: false,
                },
                span,
            ),
            1 => match elements.pop() {
                Some(single) => configure(single, node),
                None => Expr::empty(span),
            },
            _ => Expr::new(
                ExprKind::List {
                    elements,
                    wrapped: true,
                },
                span,
            ),
        };
        Ok(index)
    }

    pub(crate) fn build_closure(&mut self, node: &CstNode) -> Result<Expr, CompileError> {
        let span = node.source_span();
        let parameters = if node.has(Role::Arrow) {
            ClosureParams::Explicit(
                node.children(Role::Parameter)
                    .map(|p| self.build_formal_parameter(p))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            ClosureParams::Implicit
        };
        let code = self.build_block_statements(node.child(Role::Body), span)?;
        Ok(Expr::new(
            ExprKind::Closure {
                parameters,
                code: code.boxed(),
            },
            span,
        ))
    }
}
