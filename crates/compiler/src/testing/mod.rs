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
//! Helpers for building syntax trees in tests.
//!
//! Fixtures are written with the constructors in [`dsl`], which leave every token at 0:0.
//! [`TreeBuilder`] then walks the tree in source order and gives each token a realistic
//! position, rebuilding the source text as it goes: tokens are separated by one space, each
//! statement of a block or unit starts a new line, and newlines inside a token move the cursor.

pub mod dsl;
pub mod test_macros;

use crate::ast::CompilationUnit;
use crate::builders::{LowerOptions, lower};
use crate::cst::{CstElement, CstNode, NodeKind, Role, SyntaxTree, Token};
use gravel_common::{CompileError, ErrorSink};

/// A laid-out tree and the source text its token positions refer to.
#[derive(Debug, Clone)]
pub struct LaidOut {
    pub tree: SyntaxTree,
    pub source: String,
}

pub struct TreeBuilder {
    line: usize,
    column: usize,
    source: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            line: 1,
            column: 0,
            source: String::new(),
        }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, mut root: CstNode) -> LaidOut {
        self.place_node(&mut root);
        LaidOut {
            tree: SyntaxTree::new(root),
            source: self.source,
        }
    }

    fn place_node(&mut self, node: &mut CstNode) {
        let statement_list = matches!(
            node.kind,
            NodeKind::CompilationUnit | NodeKind::Block | NodeKind::BlockStatements
        );
        let has_statements = node.has(Role::Statement);
        let last = node.children.len().saturating_sub(1);
        for (index, (role, element)) in node.children.iter_mut().enumerate() {
            let closer = *role == Role::Punct && index == last && has_statements;
            if statement_list
                && (closer || matches!(role, Role::Statement | Role::Package | Role::Import))
            {
                self.new_line();
            }
            match element {
                CstElement::Token(token) => self.place_token(token),
                CstElement::Node(child) => self.place_node(child),
            }
        }
    }

    fn new_line(&mut self) {
        if self.source.is_empty() || self.column == 0 {
            return;
        }
        self.source.push('\n');
        self.line += 1;
        self.column = 0;
    }

    fn place_token(&mut self, token: &mut Token) {
        if self.column > 0 {
            self.source.push(' ');
            self.column += 1;
        }
        token.line = self.line;
        token.column = self.column;
        self.source.push_str(&token.text);
        match token.text.rfind('\n') {
            Some(last) => {
                self.line += token.text.matches('\n').count();
                self.column = token.text[last + 1..].chars().count();
            }
            None => self.column += token.text.chars().count(),
        }
    }
}

pub fn lay_out(root: CstNode) -> LaidOut {
    TreeBuilder::new().build(root)
}

/// Lay out and lower a compilation unit with default options.
pub fn lower_unit(root: CstNode) -> Result<CompilationUnit, CompileError> {
    lower_unit_with(root, LowerOptions::default())
}

pub fn lower_unit_with(root: CstNode, options: LowerOptions) -> Result<CompilationUnit, CompileError> {
    let laid_out = lay_out(root);
    lower(&laid_out.tree, options, &mut ErrorSink::new())
}

#[cfg(test)]
mod tests {
    use super::dsl::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    #[test]
    fn test_layout_positions_tokens() {
        let laid_out = lay_out(unit(vec![expr_stmt(binary(ident("a"), "+", int("1")))]));
        assert_eq!(laid_out.source, "a + 1");
        let tokens = laid_out.tree.root.all_tokens();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, vec![(1, 0), (1, 2), (1, 4)]);
    }

    #[test]
    fn test_layout_statements_and_blocks() {
        let root = unit(vec![
            expr_stmt(ident("a")),
            while_stmt(ident("b"), block(vec![expr_stmt(ident("c"))])),
        ]);
        let laid_out = lay_out(root);
        let expected = unindent(
            "
            a
            while ( b ) {
            c
            }",
        );
        assert_eq!(laid_out.source, expected);
    }

    #[test]
    fn test_layout_multiline_token() {
        let root = unit(vec![expr_stmt(assign(
            ident("x"),
            "=",
            string("'''one\ntwo'''"),
        ))]);
        let laid_out = lay_out(root);
        assert_eq!(laid_out.source, "x = '''one\ntwo'''");
        let root = laid_out.tree.root;
        // Tokens after the literal would continue on line 2.
        let last = root.last_token().unwrap();
        assert_eq!((last.line, last.column), (1, 4));
    }
}
