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
//! Rendering of syntax error records against the source they were produced from.

use std::io::{self, Write};
use std::ops::Range;

use ariadne::{CharSet, Config, Label, Report, ReportKind, Source};
use gravel_common::{Span, SyntaxErrorRecord};

/// Verbosity levels for rendering diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticVerbosity {
    /// Single-line summary only.
    Summary,
    /// Summary with the offending source region.
    SourceContext,
}

/// Rendering options for syntax error diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticRenderOptions {
    pub verbosity: DiagnosticVerbosity,
    pub use_graphics: bool,
    pub use_color: bool,
}

impl Default for DiagnosticRenderOptions {
    fn default() -> Self {
        Self {
            verbosity: DiagnosticVerbosity::Summary,
            use_graphics: false,
            use_color: false,
        }
    }
}

/// Format a record according to the requested options, one output line per entry.
///
/// Without source text only the summary line can be produced.
pub fn format_syntax_error(
    record: &SyntaxErrorRecord,
    source: Option<&str>,
    source_name: &str,
    options: DiagnosticRenderOptions,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Syntax error @ {}/{}: {}",
        record.start_line, record.start_col, record.message
    )];
    if options.verbosity == DiagnosticVerbosity::Summary {
        return lines;
    }
    let Some(source) = source else {
        return lines;
    };

    if options.use_graphics {
        let report = render_syntax_error(record, source, source_name, options.use_color);
        lines.extend(report.lines().map(str::to_string));
    } else {
        lines.extend(render_plain_context(record, source));
    }
    lines
}

/// Render a record as an ariadne report.
pub fn render_syntax_error(
    record: &SyntaxErrorRecord,
    source: &str,
    source_name: &str,
    use_color: bool,
) -> String {
    let report = build_report(record, source, source_name, use_color);
    let mut out = Vec::new();
    if report
        .write((source_name, Source::from(source)), &mut out)
        .is_err()
    {
        return record.message.clone();
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Write a record straight to stderr, keeping ariadne's colors.
pub fn emit_syntax_error(
    record: &SyntaxErrorRecord,
    source: Option<&str>,
    source_name: &str,
    use_color: bool,
) {
    let Some(source) = source else {
        eprintln!("Syntax error: {}", record.message);
        return;
    };
    let report = build_report(record, source, source_name, use_color);
    let mut stderr = io::stderr().lock();
    let _ = report.write((source_name, Source::from(source)), &mut stderr);
    let _ = stderr.flush();
}

fn build_report<'a>(
    record: &SyntaxErrorRecord,
    source: &str,
    source_name: &'a str,
    use_color: bool,
) -> Report<'static, (&'a str, Range<usize>)> {
    let range = char_range(source, record.span());
    Report::build(ReportKind::Error, (source_name, range.clone()))
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_char_set(CharSet::Unicode),
        )
        .with_message(&record.message)
        .with_label(Label::new((source_name, range)).with_message("lowering stopped here"))
        .finish()
}

fn render_plain_context(record: &SyntaxErrorRecord, source: &str) -> Vec<String> {
    let Some(line) = source.lines().nth(record.start_line.saturating_sub(1)) else {
        return vec![];
    };
    let start = record.start_col.saturating_sub(1).min(line.chars().count());
    let marked: String = line
        .chars()
        .take(start)
        .chain(" ⚠ ".chars())
        .chain(line.chars().skip(start))
        .collect();
    vec![
        format!("   line {} column {}:", record.start_line, record.start_col),
        format!("   {marked}"),
    ]
}

/// Character offsets of a span. Positions past the end of a line or of the source clamp.
fn char_range(source: &str, span: Span) -> Range<usize> {
    let start = char_offset(source, span.start_line, span.start_col);
    let end = char_offset(source, span.end_line, span.end_col).max(start);
    start..end
}

fn char_offset(source: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        let width = text.chars().count();
        if i + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']).chars().count();
            return offset + col.saturating_sub(1).min(content);
        }
        offset += width;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "def x = 1\nswitch (x) {\n  default: 1\n}\n";

    fn record() -> SyntaxErrorRecord {
        SyntaxErrorRecord::new("default should appear last", Span::new(3, 3, 3, 10))
    }

    #[test]
    fn test_char_offsets() {
        assert_eq!(char_offset(SOURCE, 1, 1), 0);
        assert_eq!(char_offset(SOURCE, 2, 1), 10);
        assert_eq!(char_range(SOURCE, Span::new(3, 3, 3, 10)), 25..32);
        // Clamped to the end of the line.
        assert_eq!(char_offset(SOURCE, 1, 99), 9);
    }

    #[test]
    fn test_multibyte_columns_count_characters() {
        let source = "def é = 'ü'\nfoo";
        assert_eq!(char_offset(source, 2, 1), 12);
    }

    #[test]
    fn test_summary() {
        let lines = format_syntax_error(&record(), Some(SOURCE), "script.groovy", Default::default());
        assert_eq!(lines, vec!["Syntax error @ 3/3: default should appear last".to_string()]);
    }

    #[test]
    fn test_plain_context() {
        let options = DiagnosticRenderOptions {
            verbosity: DiagnosticVerbosity::SourceContext,
            ..Default::default()
        };
        let lines = format_syntax_error(&record(), Some(SOURCE), "script.groovy", options);
        assert_eq!(lines[1], "   line 3 column 3:");
        assert_eq!(lines[2], "      ⚠ default: 1");
    }

    #[test]
    fn test_graphical_report_names_source() {
        let rendered = render_syntax_error(&record(), SOURCE, "script.groovy", false);
        assert!(rendered.contains("default should appear last"));
        assert!(rendered.contains("script.groovy"));
        assert!(rendered.contains("lowering stopped here"));
    }

    #[test]
    fn test_missing_source_falls_back_to_summary() {
        let options = DiagnosticRenderOptions {
            verbosity: DiagnosticVerbosity::SourceContext,
            use_graphics: true,
            use_color: false,
        };
        let lines = format_syntax_error(&record(), None, "script.groovy", options);
        assert_eq!(lines.len(), 1);
    }
}
