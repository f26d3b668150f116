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

use crate::model::span::Span;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;
use tracing::debug;

/// Broad classification of a lowering failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The tree has a shape the lowering does not handle.
    Structural,
    /// A locally detectable rule violation (duplicate default, bad assignment target...).
    Invalid,
    /// Relayed from the parser.
    Upstream,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CompileError {
    #[error("{message}: {text} @ {span}")]
    Structural {
        message: String,
        text: String,
        span: Span,
    },
    #[error("{message} @ {span}")]
    Invalid { message: String, span: Span },
    #[error("Failure to parse program @ {span}: {message}")]
    Upstream { message: String, span: Span },
    #[error("Nesting too deep (limit {limit}) @ {span}")]
    NestingTooDeep { limit: usize, span: Span },
}

impl CompileError {
    pub fn structural(message: impl Into<String>, text: impl Into<String>, span: Span) -> Self {
        CompileError::Structural {
            message: message.into(),
            text: text.into(),
            span,
        }
    }

    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        CompileError::Invalid {
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Structural { .. } | CompileError::NestingTooDeep { .. } => {
                ErrorKind::Structural
            }
            CompileError::Invalid { .. } => ErrorKind::Invalid,
            CompileError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Structural { span, .. }
            | CompileError::Invalid { span, .. }
            | CompileError::Upstream { span, .. }
            | CompileError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// The user-facing message, without position information.
    pub fn message(&self) -> String {
        match self {
            CompileError::Structural { message, text, .. } => format!("{message}: {text}"),
            CompileError::Invalid { message, .. } | CompileError::Upstream { message, .. } => {
                message.clone()
            }
            CompileError::NestingTooDeep { limit, .. } => {
                format!("nesting too deep, exceeded limit of {limit}")
            }
        }
    }

    pub fn to_record(&self) -> SyntaxErrorRecord {
        SyntaxErrorRecord::new(self.message(), self.span())
    }
}

/// The structured error submitted to an [`ErrorCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxErrorRecord {
    pub message: String,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl SyntaxErrorRecord {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            start_line: span.start_line,
            start_col: span.start_col,
            end_line: span.end_line,
            end_col: span.end_col,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

impl From<&CompileError> for SyntaxErrorRecord {
    fn from(value: &CompileError) -> Self {
        value.to_record()
    }
}

/// Destination for syntax errors found while lowering a compilation unit.
pub trait ErrorCollector {
    /// Record an error that ends processing of the unit.
    fn add_fatal_error(&mut self, record: SyntaxErrorRecord);

    fn has_errors(&self) -> bool;
}

/// Collects submitted records in order.
#[derive(Debug, Default, Clone)]
pub struct ErrorSink {
    errors: Vec<SyntaxErrorRecord>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[SyntaxErrorRecord] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SyntaxErrorRecord> {
        self.errors
    }
}

impl ErrorCollector for ErrorSink {
    fn add_fatal_error(&mut self, record: SyntaxErrorRecord) {
        debug!(
            line = record.start_line,
            column = record.start_col,
            "fatal syntax error: {}",
            record.message
        );
        self.errors.push(record);
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structural_record() {
        let err = CompileError::structural("Unsupported statement", "foo bar", Span::new(2, 3, 2, 10));
        let record = err.to_record();
        assert_eq!(record.message, "Unsupported statement: foo bar");
        assert_eq!(record.span(), Span::new(2, 3, 2, 10));
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.kind().to_string(), "structural");
    }

    #[test]
    fn test_sink_collects_in_order() {
        let mut sink = ErrorSink::new();
        assert!(!sink.has_errors());
        sink.add_fatal_error(SyntaxErrorRecord::new("first", Span::point(1, 1)));
        sink.add_fatal_error(SyntaxErrorRecord::new("second", Span::point(2, 1)));
        assert!(sink.has_errors());
        let messages: Vec<_> = sink.errors().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_nesting_message() {
        let err = CompileError::NestingTooDeep {
            limit: 4,
            span: Span::point(1, 1),
        };
        assert_eq!(err.message(), "nesting too deep, exceeded limit of 4");
    }
}
