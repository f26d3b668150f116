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

//! Concrete syntax tree as handed over by the parser.
//!
//! Every node is typed by the grammar production that produced it and holds its children in
//! source order, each tagged with the grammatical [`Role`] it plays in that production. Tokens
//! keep the parser's positions: 1-based line, 0-based column.
//!
//! The lowering reads the tree, it never rewrites it. The shapes it expects per node kind:
//!
//! | kind | children |
//! |------|----------|
//! | `CompilationUnit` | `Package`? `Import`* `Statement`* |
//! | `PackageDeclaration` | `Annotation`* `Keyword` `Name`(QualifiedName) |
//! | `ImportDeclaration` | `Annotation`* `Keyword` `Static`? `Name`(QualifiedName) `Star`? `Alias`? |
//! | `Path` | `Primary` `Element`(PathElement)* |
//! | `PathElement` | `Operator` `At`? `TypeArguments`? `NamePart` / `Arguments` / `Closure` / `Index` |
//! | `CommandExpression` | `Base`(Path) `Arguments`(ArgumentList)? `CommandArgument`* |
//! | `CommandArgument` | `Primary` then `Arguments`(ArgumentList)? or `Element`(PathElement)* |
//! | `SwitchGroup` | `Label`(SwitchLabel)+ `Body`(BlockStatements) |
//! | `LocalVariableDeclaration` | `Modifiers`? `Type`? (`Declarator`* or `Tuple` `Initializer`) |
//!
//! The remaining kinds are documented on [`NodeKind`].

use strum::{Display, IntoStaticStr};

/// Grammar productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum NodeKind {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    /// `Part` identifier tokens separated by dots.
    QualifiedName,
    QualifiedClassName,
    QualifiedClassNameList,

    // Statements
    Block,
    /// Statement list without braces (closure bodies, switch groups).
    BlockStatements,
    Assert,
    If,
    For,
    /// `Modifiers`? `Type`? `Name` `Keyword` `Expression`
    EnhancedForControl,
    /// `Init`(ForInit)? `Condition`? `Update`(ForUpdate)?
    ClassicForControl,
    ForInit,
    ForUpdate,
    While,
    Try,
    /// `Keyword` `Modifiers`? `CatchType`? `Name` `Body`
    CatchClause,
    CatchType,
    Finally,
    Switch,
    SwitchGroup,
    /// `Keyword`(case or default) `Expression`?
    SwitchLabel,
    Synchronized,
    Return,
    Throw,
    Break,
    Continue,
    /// `Label` token then `Statement`
    Labeled,
    ExpressionStatement,
    LocalVariableDeclaration,
    /// `Name` `Initializer`?
    VariableDeclarator,
    /// `Expression` or `Array`(ArrayInitializer)
    VariableInitializer,
    ArrayInitializer,
    /// `Pair`(TypeNamePair)*
    TypeNamePairs,
    TypeNamePair,
    /// `Modifiers`? `ReturnType`? `Name` `Parameters` `Throws`? `Body`?
    MethodDeclaration,
    ReturnType,
    FormalParameters,
    /// `Modifiers`? `Type`? `Ellipsis`? `Name` `Default`?
    FormalParameter,
    /// Class, interface, enum or trait declarations.
    TypeDeclaration,

    // Modifiers and annotations
    Modifiers,
    /// `Keyword` token or `Annotation` node
    Modifier,
    /// `Name`(QualifiedClassName) then `Pair`* or `Value`?
    Annotation,
    ElementValuePair,
    /// `Expression`, `Annotation` or `Array`
    ElementValue,
    ElementValueArray,

    // Types
    /// `Class`(ClassOrInterfaceType) or `Primitive` token, then `Dimension` tokens
    Type,
    ClassOrInterfaceType,
    /// `Argument`(TypeArgument)*; no arguments means a diamond
    TypeArguments,
    /// `Type`, or `Question` with optional `Keyword`(extends/super) and `Type`
    TypeArgument,

    // Expressions
    Path,
    PathElement,
    /// `Identifier`, `Literal`(string), `Keyword` token or `Dynamic` node
    NamePart,
    /// `List`(ArgumentList)?
    Arguments,
    /// `Element`(ExpressionListElement)* or `Entry`(MapEntry)*
    ArgumentList,
    /// `Element`(ExpressionListElement)*
    IndexArgs,
    /// `Spread`? `Expression`
    ExpressionListElement,
    /// `Operand` `Operator`
    Postfix,
    /// `Operator`(+ - ++ --) `Operand`
    UnaryAdd,
    /// `Operator`(! ~) `Operand`
    UnaryNot,
    /// `Type` `Operand`
    Cast,
    /// `Left` `Operator`+ `Right`; several `>` tokens spell a shift
    Binary,
    /// `Left` `Operator`(instanceof or as) `Type`
    TypeTest,
    /// `Condition` `Then` `Else`, or `Condition` `Operator`(?:) `Else`
    Conditional,
    /// `Left` `Operator` `Right`
    Assignment,
    CommandExpression,
    CommandArgument,

    // Primaries
    Identifier,
    Literal,
    /// `Begin` (`Value` `Part`)* `Value`? `End`
    GString,
    /// `Path`(GStringPath), `Expression`, `Closure` or nothing for `${}`
    GStringValue,
    /// `Identifier` `PathPart`*
    GStringPath,
    /// `Keyword` `Name`(CreatedName) then `Arguments` or `Dimension`* `EmptyDimension`*
    Creator,
    /// `Name`(QualifiedClassName) `TypeArguments`? or `Primitive` token
    CreatedName,
    This,
    Super,
    /// `Expression` inside parentheses
    ParExpression,
    List,
    /// `Entry`(MapEntry)*
    Map,
    /// `Spread` `Value`, or `Label`(MapEntryLabel) `Value`
    MapEntry,
    /// `Keyword` token or `Primary`
    MapEntryLabel,
    /// `void` or a primitive type name used as an expression
    BuiltInType,
    /// `Parameter`* `Arrow`? `Body`(BlockStatements)?
    Closure,
}

/// The grammatical role a child plays inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Role {
    Alias,
    Annotation,
    Argument,
    Arguments,
    Array,
    Arrow,
    At,
    Base,
    Begin,
    Body,
    CatchType,
    Catch,
    Class,
    Closure,
    CommandArgument,
    Condition,
    Control,
    Declarator,
    Default,
    Dimension,
    Dynamic,
    Element,
    Ellipsis,
    Else,
    EmptyDimension,
    End,
    Entry,
    Expression,
    Finally,
    Group,
    Identifier,
    Import,
    Index,
    Init,
    Initializer,
    Keyword,
    Label,
    Left,
    List,
    Literal,
    Message,
    Modifier,
    Modifiers,
    Name,
    NamePart,
    Operand,
    Operator,
    Package,
    Pair,
    Parameter,
    Parameters,
    Part,
    Path,
    PathPart,
    Primary,
    Primitive,
    Punct,
    Question,
    ReturnType,
    Right,
    Spread,
    Star,
    Statement,
    Static,
    Then,
    Throws,
    Tuple,
    Type,
    TypeArguments,
    Update,
    Value,
}

/// Lexical categories the lowering distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenKind {
    Identifier,
    Keyword,
    IntegerLiteral,
    FloatingPointLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    GStringBegin,
    GStringPart,
    GStringEnd,
    /// `.name` following an identifier inside a GString.
    GStringPathPart,
    BuiltInPrimitiveType,
    Operator,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based.
    pub line: usize,
    /// 0-based, in characters.
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CstElement {
    Node(CstNode),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    pub kind: NodeKind,
    pub children: Vec<(Role, CstElement)>,
}

impl CstNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: vec![],
        }
    }

    pub fn with_node(mut self, role: Role, node: CstNode) -> Self {
        self.children.push((role, CstElement::Node(node)));
        self
    }

    pub fn with_token(mut self, role: Role, token: Token) -> Self {
        self.children.push((role, CstElement::Token(token)));
        self
    }

    pub fn child(&self, role: Role) -> Option<&CstNode> {
        self.children(role).next()
    }

    pub fn children(&self, role: Role) -> impl Iterator<Item = &CstNode> {
        self.children.iter().filter_map(move |(r, e)| match e {
            CstElement::Node(n) if *r == role => Some(n),
            _ => None,
        })
    }

    pub fn token(&self, role: Role) -> Option<&Token> {
        self.tokens(role).next()
    }

    pub fn tokens(&self, role: Role) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(move |(r, e)| match e {
            CstElement::Token(t) if *r == role => Some(t),
            _ => None,
        })
    }

    /// True if any child, node or token, plays `role`.
    pub fn has(&self, role: Role) -> bool {
        self.children.iter().any(|(r, _)| *r == role)
    }

    pub fn first_token(&self) -> Option<&Token> {
        self.children.iter().find_map(|(_, e)| match e {
            CstElement::Token(t) => Some(t),
            CstElement::Node(n) => n.first_token(),
        })
    }

    pub fn last_token(&self) -> Option<&Token> {
        self.children.iter().rev().find_map(|(_, e)| match e {
            CstElement::Token(t) => Some(t),
            CstElement::Node(n) => n.last_token(),
        })
    }

    /// All tokens of the subtree, in source order.
    pub fn all_tokens(&self) -> Vec<&Token> {
        let mut out = vec![];
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for (_, e) in &self.children {
            match e {
                CstElement::Token(t) => out.push(t),
                CstElement::Node(n) => n.collect_tokens(out),
            }
        }
    }

    /// Token texts of the subtree concatenated without whitespace.
    pub fn text(&self) -> String {
        self.all_tokens().iter().map(|t| t.text.as_str()).collect()
    }
}

/// A non-fatal or fatal report from the parser. Start and stop are token indices for the
/// prediction notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserDiagnostic {
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
    },
    Ambiguity {
        start: usize,
        stop: usize,
    },
    AttemptingFullContext {
        start: usize,
        stop: usize,
    },
    ContextSensitivity {
        start: usize,
        stop: usize,
    },
}

/// Parser output: the tree and whatever the parser reported while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub root: CstNode,
    pub diagnostics: Vec<ParserDiagnostic>,
}

impl SyntaxTree {
    pub fn new(root: CstNode) -> Self {
        Self {
            root,
            diagnostics: vec![],
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: ParserDiagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(text: &str, column: usize) -> Token {
        Token::new(TokenKind::Identifier, text, 1, column)
    }

    #[test]
    fn test_role_queries() {
        let node = CstNode::new(NodeKind::QualifiedName)
            .with_token(Role::Part, tok("java", 0))
            .with_token(Role::Punct, tok(".", 4))
            .with_token(Role::Part, tok("util", 5));
        let parts: Vec<_> = node.tokens(Role::Part).map(|t| t.text.as_str()).collect();
        assert_eq!(parts, vec!["java", "util"]);
        assert!(node.has(Role::Punct));
        assert!(!node.has(Role::Star));
        assert_eq!(node.text(), "java.util");
    }

    #[test]
    fn test_first_last_token_descends() {
        let inner = CstNode::new(NodeKind::Identifier).with_token(Role::Identifier, tok("b", 2));
        let node = CstNode::new(NodeKind::Binary)
            .with_node(
                Role::Left,
                CstNode::new(NodeKind::Identifier).with_token(Role::Identifier, tok("a", 0)),
            )
            .with_token(Role::Operator, tok("+", 1))
            .with_node(Role::Right, inner);
        assert_eq!(node.first_token().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(node.last_token().map(|t| t.text.as_str()), Some("b"));
        assert!(CstNode::new(NodeKind::Block).first_token().is_none());
    }
}
