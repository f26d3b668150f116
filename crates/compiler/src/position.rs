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

//! Source spans for produced nodes.

use crate::ast::Located;
use crate::cst::{CstNode, Token};
use gravel_common::Span;

/// Anything a span can be taken from: tree nodes, single tokens, or nodes that already have one.
pub trait SpanSource {
    fn source_span(&self) -> Span;

    /// The span, or `fallback` when there is nothing to take one from.
    fn source_span_or(&self, _fallback: Span) -> Span {
        self.source_span()
    }
}

/// Where a node with no position of its own and no enclosing node sits.
pub const SOURCE_START: Span = Span {
    start_line: 1,
    start_col: 1,
    end_line: 1,
    end_col: 1,
};

impl SpanSource for Span {
    fn source_span(&self) -> Span {
        *self
    }
}

impl SpanSource for Token {
    fn source_span(&self) -> Span {
        let start_col = self.column + 1;
        Span::new(
            self.line,
            start_col,
            self.line,
            start_col + self.text.chars().count(),
        )
    }
}

/// Runs from the first token's start to the end of the last token. A last token spanning
/// several lines (a closing multi-line string) ends inside its own final line. A node without
/// tokens takes the caller's fallback, or [`SOURCE_START`] through `source_span`.
impl SpanSource for CstNode {
    fn source_span(&self) -> Span {
        self.source_span_or(SOURCE_START)
    }

    fn source_span_or(&self, fallback: Span) -> Span {
        let (Some(start), Some(stop)) = (self.first_token(), self.last_token()) else {
            return fallback;
        };
        let newlines = stop.text.matches('\n').count();
        let (end_line, end_col) = if newlines == 0 {
            (stop.line, stop.column + 1 + stop.text.chars().count())
        } else {
            let chars: Vec<char> = stop.text.chars().collect();
            let last_newline = chars.iter().rposition(|c| *c == '\n').unwrap_or(0);
            (stop.line + newlines, chars.len() - last_newline)
        };
        Span::new(start.line, start.column + 1, end_line, end_col)
    }
}

impl<T: Located> SpanSource for T {
    fn source_span(&self) -> Span {
        self.span()
    }
}

/// Stamp `node` with the span of `origin`, replacing whatever it had.
pub fn configure<T: Located>(mut node: T, origin: &(impl SpanSource + ?Sized)) -> T {
    node.set_span(origin.source_span());
    node
}
