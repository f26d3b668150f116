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
//! Terse constructors for concrete syntax trees.
//!
//! Each function builds one production with the child roles the lowering expects, including
//! the punctuation a parser would have kept. Positions are left at 0:0 for [`super::lay_out`].

use crate::cst::{CstNode, NodeKind, Role, Token, TokenKind};

pub fn t(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text, 0, 0)
}

fn node(kind: NodeKind) -> CstNode {
    CstNode::new(kind)
}

fn punct(node: CstNode, text: &str) -> CstNode {
    node.with_token(Role::Punct, t(TokenKind::Punct, text))
}

fn keyword(node: CstNode, text: &str) -> CstNode {
    node.with_token(Role::Keyword, t(TokenKind::Keyword, text))
}

fn operator(node: CstNode, text: &str) -> CstNode {
    node.with_token(Role::Operator, t(TokenKind::Operator, text))
}

fn with_nodes(mut node: CstNode, role: Role, children: Vec<CstNode>) -> CstNode {
    for child in children {
        node = node.with_node(role, child);
    }
    node
}

/// Comma-separated children.
fn with_list(mut node: CstNode, role: Role, children: Vec<CstNode>) -> CstNode {
    for (i, child) in children.into_iter().enumerate() {
        if i > 0 {
            node = punct(node, ",");
        }
        node = node.with_node(role, child);
    }
    node
}

// Names

pub fn qname(parts: &[&str]) -> CstNode {
    dotted(NodeKind::QualifiedName, parts)
}

pub fn qcn(parts: &[&str]) -> CstNode {
    dotted(NodeKind::QualifiedClassName, parts)
}

fn dotted(kind: NodeKind, parts: &[&str]) -> CstNode {
    let mut n = node(kind);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            n = punct(n, ".");
        }
        n = n.with_token(Role::Part, t(TokenKind::Identifier, part));
    }
    n
}

// Compilation unit

pub fn unit(statements: Vec<CstNode>) -> CstNode {
    with_nodes(node(NodeKind::CompilationUnit), Role::Statement, statements)
}

pub fn package(parts: &[&str]) -> CstNode {
    keyword(node(NodeKind::PackageDeclaration), "package").with_node(Role::Name, qname(parts))
}

pub fn import(parts: &[&str], is_static: bool, star: bool, alias: Option<&str>) -> CstNode {
    let mut n = keyword(node(NodeKind::ImportDeclaration), "import");
    if is_static {
        n = n.with_token(Role::Static, t(TokenKind::Keyword, "static"));
    }
    n = n.with_node(Role::Name, qname(parts));
    if star {
        n = punct(n, ".").with_token(Role::Star, t(TokenKind::Operator, "*"));
    }
    if let Some(alias) = alias {
        n = keyword(n, "as").with_token(Role::Alias, t(TokenKind::Identifier, alias));
    }
    n
}

// Primaries

pub fn ident(name: &str) -> CstNode {
    node(NodeKind::Identifier).with_token(Role::Identifier, t(TokenKind::Identifier, name))
}

fn literal(kind: TokenKind, text: &str) -> CstNode {
    node(NodeKind::Literal).with_token(Role::Literal, t(kind, text))
}

pub fn int(text: &str) -> CstNode {
    literal(TokenKind::IntegerLiteral, text)
}

pub fn float(text: &str) -> CstNode {
    literal(TokenKind::FloatingPointLiteral, text)
}

/// A string literal; `text` includes its delimiters.
pub fn string(text: &str) -> CstNode {
    literal(TokenKind::StringLiteral, text)
}

pub fn boolean(value: bool) -> CstNode {
    literal(TokenKind::BooleanLiteral, if value { "true" } else { "false" })
}

pub fn null() -> CstNode {
    literal(TokenKind::NullLiteral, "null")
}

pub fn this() -> CstNode {
    keyword(node(NodeKind::This), "this")
}

pub fn super_() -> CstNode {
    keyword(node(NodeKind::Super), "super")
}

pub fn builtin(name: &str) -> CstNode {
    node(NodeKind::BuiltInType).with_token(Role::Primitive, t(TokenKind::BuiltInPrimitiveType, name))
}

pub fn paren(expr: CstNode) -> CstNode {
    punct(punct(node(NodeKind::ParExpression), "(").with_node(Role::Expression, expr), ")")
}

pub fn elem(expr: CstNode) -> CstNode {
    node(NodeKind::ExpressionListElement).with_node(Role::Expression, expr)
}

pub fn spread_elem(expr: CstNode) -> CstNode {
    node(NodeKind::ExpressionListElement)
        .with_token(Role::Spread, t(TokenKind::Operator, "*"))
        .with_node(Role::Expression, expr)
}

pub fn list(elements: Vec<CstNode>) -> CstNode {
    punct(with_list(punct(node(NodeKind::List), "["), Role::Element, elements), "]")
}

pub fn map(entries: Vec<CstNode>) -> CstNode {
    let n = punct(node(NodeKind::Map), "[");
    let n = if entries.is_empty() {
        punct(n, ":")
    } else {
        with_list(n, Role::Entry, entries)
    };
    punct(n, "]")
}

/// `label: value` where the label is a primary expression.
pub fn entry(label: CstNode, value: CstNode) -> CstNode {
    let label = node(NodeKind::MapEntryLabel).with_node(Role::Primary, label);
    punct(node(NodeKind::MapEntry).with_node(Role::Label, label), ":").with_node(Role::Value, value)
}

/// `keyword: value`, e.g. `in: x`.
pub fn keyword_entry(word: &str, value: CstNode) -> CstNode {
    let label = keyword(node(NodeKind::MapEntryLabel), word);
    punct(node(NodeKind::MapEntry).with_node(Role::Label, label), ":").with_node(Role::Value, value)
}

pub fn spread_entry(value: CstNode) -> CstNode {
    let n = node(NodeKind::MapEntry).with_token(Role::Spread, t(TokenKind::Operator, "*"));
    punct(n, ":").with_node(Role::Value, value)
}

/// `{ params -> statements }`; without an arrow the parameters must be empty.
pub fn closure(params: Vec<CstNode>, arrow: bool, statements: Vec<CstNode>) -> CstNode {
    let mut n = with_list(punct(node(NodeKind::Closure), "{"), Role::Parameter, params);
    if arrow {
        n = n.with_token(Role::Arrow, t(TokenKind::Operator, "->"));
    }
    if !statements.is_empty() {
        n = n.with_node(
            Role::Body,
            with_nodes(node(NodeKind::BlockStatements), Role::Statement, statements),
        );
    }
    punct(n, "}")
}

/// An interpolated string. `values` interleave with `parts`: begin, value, part, value, ..., end.
pub fn gstring(begin: &str, values: Vec<CstNode>, parts: &[&str], end: &str) -> CstNode {
    let mut n = node(NodeKind::GString).with_token(Role::Begin, t(TokenKind::GStringBegin, begin));
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            if let Some(part) = parts.get(i - 1) {
                n = n.with_token(Role::Part, t(TokenKind::GStringPart, part));
            }
        }
        n = n.with_node(Role::Value, value);
    }
    n.with_token(Role::End, t(TokenKind::GStringEnd, end))
}

/// `$name.a.b` inside a GString.
pub fn gval_path(name: &str, parts: &[&str]) -> CstNode {
    let mut path = node(NodeKind::GStringPath).with_token(Role::Identifier, t(TokenKind::Identifier, name));
    for part in parts {
        path = path.with_token(Role::PathPart, t(TokenKind::GStringPathPart, &format!(".{part}")));
    }
    node(NodeKind::GStringValue).with_node(Role::Path, path)
}

/// `${expr}`
pub fn gval_expr(expr: CstNode) -> CstNode {
    punct(punct(node(NodeKind::GStringValue), "{").with_node(Role::Expression, expr), "}")
}

/// `${ closure }` with the closure's own braces.
pub fn gval_closure(closure: CstNode) -> CstNode {
    node(NodeKind::GStringValue).with_node(Role::Closure, closure)
}

/// `${}`
pub fn gval_empty() -> CstNode {
    punct(punct(node(NodeKind::GStringValue), "{"), "}")
}

pub fn created_name(parts: &[&str], type_arguments: Option<CstNode>) -> CstNode {
    let mut n = node(NodeKind::CreatedName).with_node(Role::Name, qcn(parts));
    if let Some(args) = type_arguments {
        n = n.with_node(Role::TypeArguments, args);
    }
    n
}

pub fn created_primitive(name: &str) -> CstNode {
    node(NodeKind::CreatedName).with_token(Role::Primitive, t(TokenKind::BuiltInPrimitiveType, name))
}

/// `new Name(args)`
pub fn new_object(name: CstNode, arguments: CstNode) -> CstNode {
    keyword(node(NodeKind::Creator), "new")
        .with_node(Role::Name, name)
        .with_node(Role::Arguments, arguments)
}

/// `new Name[d1][d2][]...`
pub fn new_array(name: CstNode, dimensions: Vec<CstNode>, empty_dimensions: usize) -> CstNode {
    let mut n = keyword(node(NodeKind::Creator), "new").with_node(Role::Name, name);
    for dimension in dimensions {
        n = punct(punct(n, "[").with_node(Role::Dimension, dimension), "]");
    }
    for _ in 0..empty_dimensions {
        n = n.with_token(Role::EmptyDimension, t(TokenKind::Punct, "[]"));
    }
    n
}

// Arguments and paths

pub fn arg_list(elements: Vec<CstNode>) -> CstNode {
    with_list(node(NodeKind::ArgumentList), Role::Element, elements.into_iter().map(elem).collect())
}

pub fn named_arg_list(entries: Vec<CstNode>) -> CstNode {
    with_list(node(NodeKind::ArgumentList), Role::Entry, entries)
}

/// `( args )`; an empty vector gives `()`.
pub fn args(elements: Vec<CstNode>) -> CstNode {
    let n = punct(node(NodeKind::Arguments), "(");
    let n = if elements.is_empty() {
        n
    } else {
        n.with_node(Role::List, arg_list(elements))
    };
    punct(n, ")")
}

pub fn named_args(entries: Vec<CstNode>) -> CstNode {
    punct(
        punct(node(NodeKind::Arguments), "(").with_node(Role::List, named_arg_list(entries)),
        ")",
    )
}

pub fn path(primary: CstNode, elements: Vec<CstNode>) -> CstNode {
    with_nodes(node(NodeKind::Path).with_node(Role::Primary, primary), Role::Element, elements)
}

fn name_part(name: &str) -> CstNode {
    node(NodeKind::NamePart).with_token(Role::Identifier, t(TokenKind::Identifier, name))
}

/// A member access with operator `op` (`.`, `?.`, `*.` or `.&`).
pub fn member(op: &str, name: &str) -> CstNode {
    operator(node(NodeKind::PathElement), op).with_node(Role::NamePart, name_part(name))
}

pub fn dot(name: &str) -> CstNode {
    member(".", name)
}

/// `op@name`
pub fn attr(op: &str, name: &str) -> CstNode {
    operator(node(NodeKind::PathElement), op)
        .with_token(Role::At, t(TokenKind::Operator, "@"))
        .with_node(Role::NamePart, name_part(name))
}

/// `.<T>name`
pub fn dot_generic(name: &str, type_arguments: CstNode) -> CstNode {
    operator(node(NodeKind::PathElement), ".")
        .with_node(Role::TypeArguments, type_arguments)
        .with_node(Role::NamePart, name_part(name))
}

/// `."literal"`
pub fn dot_string(text: &str) -> CstNode {
    let part = node(NodeKind::NamePart).with_token(Role::Literal, t(TokenKind::StringLiteral, text));
    operator(node(NodeKind::PathElement), ".").with_node(Role::NamePart, part)
}

/// `.keyword`, e.g. `.class`
pub fn dot_keyword(word: &str) -> CstNode {
    let part = keyword(node(NodeKind::NamePart), word);
    operator(node(NodeKind::PathElement), ".").with_node(Role::NamePart, part)
}

/// `.(expr)` or `."$x"`
pub fn dot_dynamic(expr: CstNode) -> CstNode {
    let part = node(NodeKind::NamePart).with_node(Role::Dynamic, expr);
    operator(node(NodeKind::PathElement), ".").with_node(Role::NamePart, part)
}

pub fn call(elements: Vec<CstNode>) -> CstNode {
    node(NodeKind::PathElement).with_node(Role::Arguments, args(elements))
}

pub fn call_named(entries: Vec<CstNode>) -> CstNode {
    node(NodeKind::PathElement).with_node(Role::Arguments, named_args(entries))
}

pub fn closure_el(closure: CstNode) -> CstNode {
    node(NodeKind::PathElement).with_node(Role::Closure, closure)
}

fn index_with(op: &str, elements: Vec<CstNode>) -> CstNode {
    let index = with_list(node(NodeKind::IndexArgs), Role::Element, elements);
    punct(operator(node(NodeKind::PathElement), op).with_node(Role::Index, index), "]")
}

/// `[e1, e2]`; pass [`spread_elem`] or [`elem`] nodes.
pub fn index(elements: Vec<CstNode>) -> CstNode {
    index_with("[", elements)
}

pub fn safe_index(elements: Vec<CstNode>) -> CstNode {
    index_with("?[", elements)
}

// Command expressions

pub fn command(base: CstNode, arguments: Option<Vec<CstNode>>, rest: Vec<CstNode>) -> CstNode {
    let mut n = node(NodeKind::CommandExpression).with_node(Role::Base, base);
    if let Some(arguments) = arguments {
        n = n.with_node(Role::Arguments, arg_list(arguments));
    }
    with_nodes(n, Role::CommandArgument, rest)
}

pub fn cmd_arg(primary: CstNode) -> CstNode {
    node(NodeKind::CommandArgument).with_node(Role::Primary, primary)
}

pub fn cmd_arg_call(primary: CstNode, arguments: Vec<CstNode>) -> CstNode {
    cmd_arg(primary).with_node(Role::Arguments, arg_list(arguments))
}

pub fn cmd_arg_path(primary: CstNode, elements: Vec<CstNode>) -> CstNode {
    with_nodes(cmd_arg(primary), Role::Element, elements)
}

// Operators

pub fn binary(left: CstNode, op: &str, right: CstNode) -> CstNode {
    operator(node(NodeKind::Binary).with_node(Role::Left, left), op).with_node(Role::Right, right)
}

/// A binary expression whose operator arrives as several tokens (`>` `>` for a shift).
pub fn binary_split(left: CstNode, ops: &[&str], right: CstNode) -> CstNode {
    let mut n = node(NodeKind::Binary).with_node(Role::Left, left);
    for op in ops {
        n = operator(n, op);
    }
    n.with_node(Role::Right, right)
}

pub fn assign(left: CstNode, op: &str, right: CstNode) -> CstNode {
    operator(node(NodeKind::Assignment).with_node(Role::Left, left), op)
        .with_node(Role::Right, right)
}

pub fn postfix(operand: CstNode, op: &str) -> CstNode {
    operator(node(NodeKind::Postfix).with_node(Role::Operand, operand), op)
}

/// `+x`, `-x`, `++x`, `--x`
pub fn unary(op: &str, operand: CstNode) -> CstNode {
    operator(node(NodeKind::UnaryAdd), op).with_node(Role::Operand, operand)
}

/// `!x`, `~x`
pub fn not(op: &str, operand: CstNode) -> CstNode {
    operator(node(NodeKind::UnaryNot), op).with_node(Role::Operand, operand)
}

pub fn cast(ty: CstNode, operand: CstNode) -> CstNode {
    punct(punct(node(NodeKind::Cast), "(").with_node(Role::Type, ty), ")")
        .with_node(Role::Operand, operand)
}

/// `x instanceof T` or `x as T`
pub fn type_test(left: CstNode, op: &str, ty: CstNode) -> CstNode {
    operator(node(NodeKind::TypeTest).with_node(Role::Left, left), op).with_node(Role::Type, ty)
}

pub fn ternary(condition: CstNode, then: CstNode, otherwise: CstNode) -> CstNode {
    let n = node(NodeKind::Conditional).with_node(Role::Condition, condition);
    punct(punct(n, "?").with_node(Role::Then, then), ":").with_node(Role::Else, otherwise)
}

pub fn elvis(condition: CstNode, otherwise: CstNode) -> CstNode {
    operator(node(NodeKind::Conditional).with_node(Role::Condition, condition), "?:")
        .with_node(Role::Else, otherwise)
}

// Types

pub fn class_type(parts: &[&str]) -> CstNode {
    node(NodeKind::Type).with_node(
        Role::Class,
        node(NodeKind::ClassOrInterfaceType).with_node(Role::Name, qcn(parts)),
    )
}

pub fn generic_type(parts: &[&str], arguments: CstNode) -> CstNode {
    node(NodeKind::Type).with_node(
        Role::Class,
        node(NodeKind::ClassOrInterfaceType)
            .with_node(Role::Name, qcn(parts))
            .with_node(Role::TypeArguments, arguments),
    )
}

pub fn primitive_type(name: &str) -> CstNode {
    node(NodeKind::Type).with_token(Role::Primitive, t(TokenKind::BuiltInPrimitiveType, name))
}

/// Append `[]` dimensions to a type.
pub fn array_type(ty: CstNode, dimensions: usize) -> CstNode {
    (0..dimensions).fold(ty, |n, _| n.with_token(Role::Dimension, t(TokenKind::Punct, "[]")))
}

/// `<a, b>`; no arguments gives a diamond.
pub fn type_args(arguments: Vec<CstNode>) -> CstNode {
    punct(with_list(punct(node(NodeKind::TypeArguments), "<"), Role::Argument, arguments), ">")
}

pub fn type_arg(ty: CstNode) -> CstNode {
    node(NodeKind::TypeArgument).with_node(Role::Type, ty)
}

/// `?`, `? extends T` or `? super T`
pub fn wildcard(bound: Option<(&str, CstNode)>) -> CstNode {
    let n = node(NodeKind::TypeArgument).with_token(Role::Question, t(TokenKind::Operator, "?"));
    match bound {
        Some((word, ty)) => keyword(n, word).with_node(Role::Type, ty),
        None => n,
    }
}

// Statements

pub fn expr_stmt(expr: CstNode) -> CstNode {
    node(NodeKind::ExpressionStatement).with_node(Role::Expression, expr)
}

pub fn block(statements: Vec<CstNode>) -> CstNode {
    punct(with_nodes(punct(node(NodeKind::Block), "{"), Role::Statement, statements), "}")
}

pub fn block_statements(statements: Vec<CstNode>) -> CstNode {
    with_nodes(node(NodeKind::BlockStatements), Role::Statement, statements)
}

pub fn if_stmt(condition: CstNode, then: CstNode, otherwise: Option<CstNode>) -> CstNode {
    let n = keyword(node(NodeKind::If), "if")
        .with_node(Role::Condition, paren(condition))
        .with_node(Role::Then, then);
    match otherwise {
        Some(otherwise) => keyword(n, "else").with_node(Role::Else, otherwise),
        None => n,
    }
}

pub fn while_stmt(condition: CstNode, body: CstNode) -> CstNode {
    keyword(node(NodeKind::While), "while")
        .with_node(Role::Condition, paren(condition))
        .with_node(Role::Body, body)
}

/// `for (T name in collection) body`
pub fn for_in(ty: Option<CstNode>, name: &str, collection: CstNode, body: CstNode) -> CstNode {
    let mut control = node(NodeKind::EnhancedForControl);
    if let Some(ty) = ty {
        control = control.with_node(Role::Type, ty);
    }
    let control = keyword(
        control.with_token(Role::Name, t(TokenKind::Identifier, name)),
        "in",
    )
    .with_node(Role::Expression, collection);
    for_with(control, body)
}

/// `for (init; condition; update) body`
pub fn for_classic(
    init: Option<CstNode>,
    condition: Option<CstNode>,
    update: Option<CstNode>,
    body: CstNode,
) -> CstNode {
    let mut control = node(NodeKind::ClassicForControl);
    if let Some(init) = init {
        control = control.with_node(Role::Init, init);
    }
    control = punct(control, ";");
    if let Some(condition) = condition {
        control = control.with_node(Role::Condition, condition);
    }
    control = punct(control, ";");
    if let Some(update) = update {
        control = control.with_node(
            Role::Update,
            node(NodeKind::ForUpdate).with_node(Role::Expression, update),
        );
    }
    for_with(control, body)
}

fn for_with(control: CstNode, body: CstNode) -> CstNode {
    punct(
        punct(keyword(node(NodeKind::For), "for"), "(").with_node(Role::Control, control),
        ")",
    )
    .with_node(Role::Body, body)
}

pub fn for_init_expr(expr: CstNode) -> CstNode {
    node(NodeKind::ForInit).with_node(Role::Expression, expr)
}

pub fn for_init_decl(declaration: CstNode) -> CstNode {
    node(NodeKind::ForInit).with_node(Role::Statement, declaration)
}

pub fn return_stmt(value: Option<CstNode>) -> CstNode {
    let n = keyword(node(NodeKind::Return), "return");
    match value {
        Some(value) => n.with_node(Role::Expression, value),
        None => n,
    }
}

pub fn throw_stmt(value: CstNode) -> CstNode {
    keyword(node(NodeKind::Throw), "throw").with_node(Role::Expression, value)
}

pub fn break_stmt(label: Option<&str>) -> CstNode {
    jump(NodeKind::Break, "break", label)
}

pub fn continue_stmt(label: Option<&str>) -> CstNode {
    jump(NodeKind::Continue, "continue", label)
}

fn jump(kind: NodeKind, word: &str, label: Option<&str>) -> CstNode {
    let n = keyword(node(kind), word);
    match label {
        Some(label) => n.with_token(Role::Label, t(TokenKind::Identifier, label)),
        None => n,
    }
}

pub fn labeled(label: &str, statement: CstNode) -> CstNode {
    punct(
        node(NodeKind::Labeled).with_token(Role::Label, t(TokenKind::Identifier, label)),
        ":",
    )
    .with_node(Role::Statement, statement)
}

pub fn assert_stmt(condition: CstNode, message: Option<CstNode>) -> CstNode {
    let n = keyword(node(NodeKind::Assert), "assert").with_node(Role::Condition, condition);
    match message {
        Some(message) => punct(n, ":").with_node(Role::Message, message),
        None => n,
    }
}

pub fn synchronized(lock: CstNode, body: CstNode) -> CstNode {
    keyword(node(NodeKind::Synchronized), "synchronized")
        .with_node(Role::Condition, paren(lock))
        .with_node(Role::Body, body)
}

pub fn try_stmt(body: CstNode, catches: Vec<CstNode>, finally: Option<CstNode>) -> CstNode {
    let n = with_nodes(
        keyword(node(NodeKind::Try), "try").with_node(Role::Body, body),
        Role::Catch,
        catches,
    );
    match finally {
        Some(body) => n.with_node(
            Role::Finally,
            keyword(node(NodeKind::Finally), "finally").with_node(Role::Body, body),
        ),
        None => n,
    }
}

/// `catch (A | B name) body`; no types gives an untyped catch.
pub fn catch(types: &[&[&str]], name: &str, body: CstNode) -> CstNode {
    let mut n = punct(keyword(node(NodeKind::CatchClause), "catch"), "(");
    if !types.is_empty() {
        let mut catch_type = node(NodeKind::CatchType);
        for (i, parts) in types.iter().enumerate() {
            if i > 0 {
                catch_type = punct(catch_type, "|");
            }
            catch_type = catch_type.with_node(Role::Element, qcn(parts));
        }
        n = n.with_node(Role::CatchType, catch_type);
    }
    punct(n.with_token(Role::Name, t(TokenKind::Identifier, name)), ")").with_node(Role::Body, body)
}

pub fn switch(subject: CstNode, groups: Vec<CstNode>) -> CstNode {
    let n = keyword(node(NodeKind::Switch), "switch").with_node(Role::Condition, paren(subject));
    punct(with_nodes(punct(n, "{"), Role::Group, groups), "}")
}

pub fn group(labels: Vec<CstNode>, statements: Vec<CstNode>) -> CstNode {
    with_nodes(node(NodeKind::SwitchGroup), Role::Label, labels)
        .with_node(Role::Body, block_statements(statements))
}

pub fn case(expr: CstNode) -> CstNode {
    punct(keyword(node(NodeKind::SwitchLabel), "case").with_node(Role::Expression, expr), ":")
}

pub fn default_label() -> CstNode {
    punct(keyword(node(NodeKind::SwitchLabel), "default"), ":")
}

// Declarations

pub fn modifier(word: &str) -> CstNode {
    keyword(node(NodeKind::Modifier), word)
}

pub fn annotation_modifier(annotation: CstNode) -> CstNode {
    node(NodeKind::Modifier).with_node(Role::Annotation, annotation)
}

pub fn modifiers(items: Vec<CstNode>) -> CstNode {
    with_nodes(node(NodeKind::Modifiers), Role::Modifier, items)
}

/// `@Name(k1 = v1, k2 = v2)`; values are element values.
pub fn annotation(parts: &[&str], pairs: Vec<(&str, CstNode)>) -> CstNode {
    let mut n = punct(node(NodeKind::Annotation), "@").with_node(Role::Name, qcn(parts));
    if pairs.is_empty() {
        return n;
    }
    n = punct(n, "(");
    let pairs = pairs
        .into_iter()
        .map(|(name, value)| {
            punct(
                node(NodeKind::ElementValuePair).with_token(Role::Name, t(TokenKind::Identifier, name)),
                "=",
            )
            .with_node(Role::Value, value)
        })
        .collect();
    punct(with_list(n, Role::Pair, pairs), ")")
}

/// `@Name(value)`
pub fn annotation_value(parts: &[&str], value: CstNode) -> CstNode {
    punct(
        punct(punct(node(NodeKind::Annotation), "@").with_node(Role::Name, qcn(parts)), "(")
            .with_node(Role::Value, value),
        ")",
    )
}

pub fn ev_expr(expr: CstNode) -> CstNode {
    node(NodeKind::ElementValue).with_node(Role::Expression, expr)
}

pub fn ev_annotation(annotation: CstNode) -> CstNode {
    node(NodeKind::ElementValue).with_node(Role::Annotation, annotation)
}

pub fn ev_array(values: Vec<CstNode>) -> CstNode {
    let array = punct(with_list(punct(node(NodeKind::ElementValueArray), "{"), Role::Element, values), "}");
    node(NodeKind::ElementValue).with_node(Role::Array, array)
}

/// `[modifiers] [type] declarators`
pub fn local_var(
    modifier_list: Vec<CstNode>,
    ty: Option<CstNode>,
    declarators: Vec<CstNode>,
) -> CstNode {
    let mut n = node(NodeKind::LocalVariableDeclaration);
    if !modifier_list.is_empty() {
        n = n.with_node(Role::Modifiers, modifiers(modifier_list));
    }
    if let Some(ty) = ty {
        n = n.with_node(Role::Type, ty);
    }
    with_list(n, Role::Declarator, declarators)
}

pub fn declarator(name: &str, initializer: Option<CstNode>) -> CstNode {
    let n = node(NodeKind::VariableDeclarator).with_token(Role::Name, t(TokenKind::Identifier, name));
    match initializer {
        Some(initializer) => punct(n, "=").with_node(Role::Initializer, initializer),
        None => n,
    }
}

pub fn init_expr(expr: CstNode) -> CstNode {
    node(NodeKind::VariableInitializer).with_node(Role::Expression, expr)
}

/// `{a, b}` array initializer; elements are variable initializers.
pub fn init_array(elements: Vec<CstNode>) -> CstNode {
    let array = punct(with_list(punct(node(NodeKind::ArrayInitializer), "{"), Role::Element, elements), "}");
    node(NodeKind::VariableInitializer).with_node(Role::Array, array)
}

/// `def (A a, b) = initializer`
pub fn tuple_decl(modifier_list: Vec<CstNode>, pairs: Vec<CstNode>, initializer: CstNode) -> CstNode {
    let mut n = node(NodeKind::LocalVariableDeclaration);
    if !modifier_list.is_empty() {
        n = n.with_node(Role::Modifiers, modifiers(modifier_list));
    }
    let tuple = punct(with_list(punct(node(NodeKind::TypeNamePairs), "("), Role::Pair, pairs), ")");
    punct(n.with_node(Role::Tuple, tuple), "=").with_node(Role::Initializer, initializer)
}

pub fn pair(ty: Option<CstNode>, name: &str) -> CstNode {
    let mut n = node(NodeKind::TypeNamePair);
    if let Some(ty) = ty {
        n = n.with_node(Role::Type, ty);
    }
    n.with_token(Role::Name, t(TokenKind::Identifier, name))
}

pub fn param(ty: Option<CstNode>, name: &str) -> CstNode {
    param_full(vec![], ty, false, name, None)
}

pub fn param_full(
    modifier_list: Vec<CstNode>,
    ty: Option<CstNode>,
    varargs: bool,
    name: &str,
    default: Option<CstNode>,
) -> CstNode {
    let mut n = node(NodeKind::FormalParameter);
    if !modifier_list.is_empty() {
        n = n.with_node(Role::Modifiers, modifiers(modifier_list));
    }
    if let Some(ty) = ty {
        n = n.with_node(Role::Type, ty);
    }
    if varargs {
        n = n.with_token(Role::Ellipsis, t(TokenKind::Punct, "..."));
    }
    n = n.with_token(Role::Name, t(TokenKind::Identifier, name));
    match default {
        Some(default) => punct(n, "=").with_node(Role::Default, default),
        None => n,
    }
}

pub fn return_type(ty: CstNode) -> CstNode {
    node(NodeKind::ReturnType).with_node(Role::Type, ty)
}

pub fn void_return() -> CstNode {
    keyword(node(NodeKind::ReturnType), "void")
}

/// `name(params) body` with no modifiers.
pub fn method(name: &str, returns: Option<CstNode>, params: Vec<CstNode>, body: CstNode) -> CstNode {
    method_full(vec![], returns, name, params, vec![], Some(body))
}

pub fn method_full(
    modifier_list: Vec<CstNode>,
    returns: Option<CstNode>,
    name: &str,
    params: Vec<CstNode>,
    throws: Vec<&[&str]>,
    body: Option<CstNode>,
) -> CstNode {
    let name_kind = if name.starts_with(['"', '\'']) {
        TokenKind::StringLiteral
    } else {
        TokenKind::Identifier
    };
    let mut n = node(NodeKind::MethodDeclaration);
    if !modifier_list.is_empty() {
        n = n.with_node(Role::Modifiers, modifiers(modifier_list));
    }
    if let Some(returns) = returns {
        n = n.with_node(Role::ReturnType, returns);
    }
    n = n.with_token(Role::Name, t(name_kind, name));
    let parameters = punct(with_list(punct(node(NodeKind::FormalParameters), "("), Role::Parameter, params), ")");
    n = n.with_node(Role::Parameters, parameters);
    if !throws.is_empty() {
        let list = with_list(
            node(NodeKind::QualifiedClassNameList),
            Role::Element,
            throws.iter().map(|parts| qcn(parts)).collect(),
        );
        n = keyword(n, "throws").with_node(Role::Throws, list);
    }
    match body {
        Some(body) => n.with_node(Role::Body, body),
        None => n,
    }
}

pub fn type_decl(word: &str, name: &str) -> CstNode {
    punct(
        punct(
            keyword(node(NodeKind::TypeDeclaration), word)
                .with_token(Role::Name, t(TokenKind::Identifier, name)),
            "{",
        ),
        "}",
    )
}
