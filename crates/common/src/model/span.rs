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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A source region. Lines and columns are both 1-based; the end column points one past the
/// last character of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at the given position.
    pub fn point(line: usize, col: usize) -> Self {
        Self::new(line, col, line, col)
    }

    /// The span covering `self` and `other`, assuming `self` starts first.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start_line, self.start_col, other.end_line, other.end_col)
    }

    /// Same end, start moved to `start`'s start.
    pub fn with_start_of(&self, start: &Span) -> Span {
        Span::new(start.start_line, start.start_col, self.end_line, self.end_col)
    }

    pub fn start(&self) -> (usize, usize) {
        (self.start_line, self.start_col)
    }

    pub fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_col)
    }

    pub fn is_multiline(&self) -> bool {
        self.end_line > self.start_line
    }

    /// Translate line/column into a pair of character offsets into `source`, clamped to the
    /// source length. Used when rendering diagnostics.
    pub fn char_range(&self, source: &str) -> std::ops::Range<usize> {
        let start = offset_of(source, self.start_line, self.start_col);
        let end = offset_of(source, self.end_line, self.end_col).max(start);
        start..end
    }
}

fn offset_of(source: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        let len = text.chars().count();
        if idx + 1 == line {
            return offset + col.saturating_sub(1).min(len);
        }
        offset += len;
    }
    offset
}

impl Default for Span {
    fn default() -> Self {
        Span::point(1, 1)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}
