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

use crate::literals::Number;
use gravel_common::Span;
use indexmap::IndexMap;
use std::rc::Rc;
use strum::{Display, EnumString, IntoStaticStr};

/// Name of the synthetic method used to invoke a callable value.
pub const CALL_METHOD: &str = "call";

/// Lets the position tracker re-stamp any node.
pub trait Located {
    fn span(&self) -> Span;
    fn set_span(&mut self, span: Span);
}

macro_rules! located {
    ($($t:ty),* $(,)?) => {
        $(
            impl Located for $t {
                fn span(&self) -> Span {
                    self.span
                }
                fn set_span(&mut self, span: Span) {
                    self.span = span;
                }
            }
        )*
    };
}

located!(
    Expr,
    Stmt,
    TypeRef,
    GenericsType,
    Parameter,
    MethodDecl,
    ImportDecl,
    PackageDecl,
    Annotation,
    MapEntry,
    Arguments,
    CatchClause,
    CaseStmt,
    CompilationUnit,
);

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
}

/// What kind of literal a constant came from. Drives unary-minus folding and map key handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LiteralTag {
    Numeric,
    String,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: ConstantValue,
    pub tag: LiteralTag,
    /// False for numbers written with a leading minus and for folded negations.
    pub keep_primitive_type: bool,
}

impl Constant {
    pub fn null() -> Self {
        Self {
            value: ConstantValue::Null,
            tag: LiteralTag::None,
            keep_primitive_type: false,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: ConstantValue::Str(value.into()),
            tag: LiteralTag::None,
            keep_primitive_type: false,
        }
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        Self {
            value: ConstantValue::Str(value.into()),
            tag: LiteralTag::String,
            keep_primitive_type: true,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            value: ConstantValue::Bool(value),
            tag: LiteralTag::None,
            keep_primitive_type: true,
        }
    }

    pub fn number(value: Number, keep_primitive_type: bool) -> Self {
        Self {
            value: ConstantValue::Number(value),
            tag: LiteralTag::Numeric,
            keep_primitive_type,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ConstantValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Power,
    #[strum(serialize = "<<")]
    LeftShift,
    #[strum(serialize = ">>")]
    RightShift,
    #[strum(serialize = ">>>")]
    RightShiftUnsigned,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "<=")]
    LessEq,
    #[strum(serialize = ">=")]
    GreaterEq,
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "instanceof")]
    InstanceOf,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "===")]
    Identical,
    #[strum(serialize = "!==")]
    NotIdentical,
    #[strum(serialize = "<=>")]
    Compare,
    #[strum(serialize = "=~")]
    FindRegex,
    #[strum(serialize = "==~")]
    MatchRegex,
    #[strum(serialize = "&")]
    BitAnd,
    #[strum(serialize = "^")]
    BitXor,
    #[strum(serialize = "|")]
    BitOr,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
    /// Subscript; `a[i]` and `a?[i]` are both lowered to a binary node.
    #[strum(serialize = "[")]
    Index,
    #[strum(serialize = "?[")]
    SafeIndex,
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "+=")]
    PlusAssign,
    #[strum(serialize = "-=")]
    MinusAssign,
    #[strum(serialize = "*=")]
    MultiplyAssign,
    #[strum(serialize = "/=")]
    DivideAssign,
    #[strum(serialize = "%=")]
    ModAssign,
    #[strum(serialize = "**=")]
    PowerAssign,
    #[strum(serialize = "<<=")]
    LeftShiftAssign,
    #[strum(serialize = ">>=")]
    RightShiftAssign,
    #[strum(serialize = ">>>=")]
    RightShiftUnsignedAssign,
    #[strum(serialize = "&=")]
    BitAndAssign,
    #[strum(serialize = "^=")]
    BitXorAssign,
    #[strum(serialize = "|=")]
    BitOrAssign,
    #[strum(serialize = "?=")]
    ElvisAssign,
}

impl BinaryOp {
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::PlusAssign
                | BinaryOp::MinusAssign
                | BinaryOp::MultiplyAssign
                | BinaryOp::DivideAssign
                | BinaryOp::ModAssign
                | BinaryOp::PowerAssign
                | BinaryOp::LeftShiftAssign
                | BinaryOp::RightShiftAssign
                | BinaryOp::RightShiftUnsignedAssign
                | BinaryOp::BitAndAssign
                | BinaryOp::BitXorAssign
                | BinaryOp::BitOrAssign
                | BinaryOp::ElvisAssign
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum IncDec {
    #[strum(serialize = "++")]
    Increment,
    #[strum(serialize = "--")]
    Decrement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A class name, fully qualified if written so.
    Class {
        name: String,
        /// `None` when no type arguments were written; an empty list for a diamond.
        generics: Option<Vec<GenericsType>>,
    },
    Primitive(String),
    Array(Box<TypeRef>),
    Void,
    /// No type was written (`def`, untyped parameters).
    Dynamic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeRef {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn class(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            TypeKind::Class {
                name: name.into(),
                generics: None,
            },
            span,
        )
    }

    pub fn dynamic(span: Span) -> Self {
        Self::new(TypeKind::Dynamic, span)
    }

    pub fn array_of(self) -> Self {
        let span = self.span;
        Self::new(TypeKind::Array(Box::new(self)), span)
    }

    pub fn name(&self) -> String {
        match &self.kind {
            TypeKind::Class { name, .. } => name.clone(),
            TypeKind::Primitive(name) => name.clone(),
            TypeKind::Array(component) => format!("{}[]", component.name()),
            TypeKind::Void => "void".to_string(),
            TypeKind::Dynamic => "java.lang.Object".to_string(),
        }
    }

    pub fn generics(&self) -> Option<&[GenericsType]> {
        match &self.kind {
            TypeKind::Class { generics, .. } => generics.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenericsKind {
    Type(TypeRef),
    /// `?`, `? extends T`, `? super T`
    Wildcard {
        upper_bound: Option<TypeRef>,
        lower_bound: Option<TypeRef>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericsType {
    pub kind: GenericsKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub class_name: String,
    pub members: IndexMap<String, Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleSlot {
    pub index: usize,
    pub arity: usize,
}

/// One declared name. Tuple declarations share their initializer between slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub variable: Variable,
    pub variable_span: Span,
    pub initializer: Rc<Expr>,
    pub tuple: Option<TupleSlot>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentsKind {
    Positional(Vec<Expr>),
    /// `name: value` pairs in a call.
    Named(Vec<MapEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    pub kind: ArgumentsKind,
    pub span: Span,
}

impl Arguments {
    pub fn positional(args: Vec<Expr>, span: Span) -> Self {
        Self {
            kind: ArgumentsKind::Positional(args),
            span,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ArgumentsKind::Positional(args) => args.is_empty(),
            ArgumentsKind::Named(entries) => entries.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub object: Box<Expr>,
    pub method: Box<Expr>,
    pub arguments: Arguments,
    pub implicit_this: bool,
    pub safe: bool,
    pub spread_safe: bool,
    pub generics: Option<Vec<GenericsType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess {
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    pub safe: bool,
    pub spread_safe: bool,
    /// Explicit type arguments written on the access (`obj.<T>m`); they only mean something
    /// once the access becomes a call.
    pub pending_generics: Option<Vec<GenericsType>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClosureParams {
    /// No arrow: the implicit `it` parameter.
    Implicit,
    Explicit(Vec<Parameter>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Constant(Constant),
    Variable(Variable),
    Declaration(Box<Declaration>),
    GString {
        verbatim: String,
        strings: Vec<Expr>,
        values: Vec<Expr>,
    },
    Property(PropertyAccess),
    Attribute(PropertyAccess),
    MethodPointer {
        object: Box<Expr>,
        method: Box<Expr>,
    },
    MethodCall(MethodCall),
    ConstructorCall {
        ty: TypeRef,
        arguments: Arguments,
    },
    Array {
        element_type: TypeRef,
        sizes: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Range {
        from: Box<Expr>,
        to: Box<Expr>,
        inclusive: bool,
    },
    Postfix {
        expr: Box<Expr>,
        op: IncDec,
    },
    Prefix {
        op: IncDec,
        expr: Box<Expr>,
    },
    UnaryPlus(Box<Expr>),
    UnaryMinus(Box<Expr>),
    Not(Box<Expr>),
    BitwiseNegation(Box<Expr>),
    /// Condition wrapper for `if`, `while`, `assert` and ternaries.
    Boolean(Box<Expr>),
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
        /// `as` coercion rather than a Java-style cast.
        coerce: bool,
    },
    Class(TypeRef),
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Elvis {
        condition: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Closure {
        parameters: ClosureParams,
        code: Box<Stmt>,
    },
    List {
        elements: Vec<Expr>,
        /// Index lists written with several subscripts, `a[1, 2]`.
        wrapped: bool,
    },
    Map(Vec<MapEntry>),
    Spread(Box<Expr>),
    SpreadMap(Box<Expr>),
    ArgumentList(Arguments),
    /// Classic `for` header: init, condition, update.
    ClosureList(Vec<Expr>),
    AnnotationConstant(Annotation),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Written inside parentheses.
    pub parenthesized: bool,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            parenthesized: false,
        }
    }

    pub fn constant(constant: Constant, span: Span) -> Self {
        Self::new(ExprKind::Constant(constant), span)
    }

    pub fn null(span: Span) -> Self {
        Self::constant(Constant::null(), span)
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Variable(Variable {
                name: name.into(),
                ty: TypeRef::dynamic(span),
                modifiers: 0,
            }),
            span,
        )
    }

    pub fn this(span: Span) -> Self {
        Self::variable("this", span)
    }

    pub fn empty(span: Span) -> Self {
        Self::new(ExprKind::Empty, span)
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            ExprKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_method_call(&self) -> Option<&MethodCall> {
        match &self.kind {
            ExprKind::MethodCall(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(&self.kind, ExprKind::Constant(c) if c.tag == LiteralTag::String)
    }

    pub fn is_numeric_literal(&self) -> bool {
        matches!(&self.kind, ExprKind::Constant(c) if c.tag == LiteralTag::Numeric)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: u32,
    pub annotations: Vec<Annotation>,
    pub default_value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub parameter: Parameter,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseStmt {
    pub expr: Expr,
    /// Empty for labels that fall through to the next label of their group.
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Expression(Expr),
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    If {
        condition: Expr,
        then: Box<Stmt>,
        otherwise: Box<Stmt>,
    },
    /// `variable` is `None` for the classic three-clause loop, whose header is a closure list.
    For {
        variable: Option<Parameter>,
        collection: Expr,
        body: Box<Stmt>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    TryCatch {
        body: Box<Stmt>,
        catches: Vec<CatchClause>,
        finally: Box<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<CaseStmt>,
        default: Box<Stmt>,
    },
    Synchronized {
        lock: Expr,
        body: Box<Stmt>,
    },
    Return(Expr),
    Throw(Expr),
    Break(Option<String>),
    Continue(Option<String>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub labels: Vec<String>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            kind,
            span,
            labels: vec![],
        }
    }

    pub fn empty(span: Span) -> Self {
        Self::new(StmtKind::Empty, span)
    }

    pub fn boxed(self) -> Box<Stmt> {
        Box::new(self)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, StmtKind::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: u32,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<TypeRef>,
    /// `None` for abstract or native declarations.
    pub body: Option<Stmt>,
    pub annotations: Vec<Annotation>,
    pub synthetic_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ImportKind {
    Regular,
    Star,
    Static,
    StaticStar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub kind: ImportKind,
    /// The imported class; for a star import, the package name with a trailing dot.
    pub class_name: String,
    /// Imported member of a static import.
    pub member: Option<String>,
    pub alias: Option<String>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl ImportDecl {
    pub fn is_static(&self) -> bool {
        matches!(self.kind, ImportKind::Static | ImportKind::StaticStar)
    }

    pub fn is_star(&self) -> bool {
        matches!(self.kind, ImportKind::Star | ImportKind::StaticStar)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    /// Dotted name with a trailing dot.
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub statements: Vec<Stmt>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use test_case::test_case;

    #[test_case("+", BinaryOp::Plus)]
    #[test_case(">>>", BinaryOp::RightShiftUnsigned)]
    #[test_case("==~", BinaryOp::MatchRegex)]
    #[test_case("?=", BinaryOp::ElvisAssign)]
    #[test_case("instanceof", BinaryOp::InstanceOf)]
    fn test_binary_op_from_token(text: &str, expected: BinaryOp) {
        assert_eq!(BinaryOp::from_str(text).unwrap(), expected);
        assert_eq!(expected.to_string(), text);
    }

    #[test]
    fn test_assignment_ops() {
        assert!(BinaryOp::Assign.is_assignment());
        assert!(BinaryOp::ElvisAssign.is_assignment());
        assert!(!BinaryOp::Equal.is_assignment());
    }

    #[test]
    fn test_type_names() {
        let span = Span::point(1, 1);
        let ty = TypeRef::class("String", span).array_of().array_of();
        assert_eq!(ty.name(), "String[][]");
        assert_eq!(TypeRef::dynamic(span).name(), "java.lang.Object");
    }
}
