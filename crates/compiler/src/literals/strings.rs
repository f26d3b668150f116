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

//! String literal decoding.
//!
//! Quoted strings (`'..'`, `".."`, and their triple forms) resolve the usual backslash escapes.
//! Slashy strings (`/../`) only know `\/`, unicode escapes and line continuations; dollar-slashy
//! strings (`$/../$`) use `$$` and `$/` instead of backslashes. Decoding is a single left to
//! right pass, so the output of one escape is never re-read as the start of another.

use lazy_static::lazy_static;
use std::collections::HashMap;
use strum::Display;

lazy_static! {
    static ref STANDARD_ESCAPES: HashMap<char, char> = HashMap::from([
        ('b', '\u{8}'),
        ('t', '\t'),
        ('n', '\n'),
        ('f', '\u{c}'),
        ('r', '\r'),
        ('"', '"'),
        ('\'', '\''),
        ('\\', '\\'),
        ('$', '$'),
    ]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StringStyle {
    SingleQuoted,
    DoubleQuoted,
    TripleSingleQuoted,
    TripleDoubleQuoted,
    Slashy,
    DollarSlashy,
}

/// Which escape table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EscapeMode {
    Standard,
    Slashy,
    DollarSlashy,
}

impl StringStyle {
    /// Classify a literal by its opening delimiter.
    pub fn of(text: &str) -> Option<StringStyle> {
        if text.starts_with("'''") {
            Some(StringStyle::TripleSingleQuoted)
        } else if text.starts_with("\"\"\"") {
            Some(StringStyle::TripleDoubleQuoted)
        } else if text.starts_with("$/") {
            Some(StringStyle::DollarSlashy)
        } else if text.starts_with('\'') {
            Some(StringStyle::SingleQuoted)
        } else if text.starts_with('"') {
            Some(StringStyle::DoubleQuoted)
        } else if text.starts_with('/') {
            Some(StringStyle::Slashy)
        } else {
            None
        }
    }

    pub fn escape_mode(&self) -> EscapeMode {
        match self {
            StringStyle::Slashy => EscapeMode::Slashy,
            StringStyle::DollarSlashy => EscapeMode::DollarSlashy,
            _ => EscapeMode::Standard,
        }
    }

    pub fn delimiters(&self) -> (&'static str, &'static str) {
        match self {
            StringStyle::SingleQuoted => ("'", "'"),
            StringStyle::DoubleQuoted => ("\"", "\""),
            StringStyle::TripleSingleQuoted => ("'''", "'''"),
            StringStyle::TripleDoubleQuoted => ("\"\"\"", "\"\"\""),
            StringStyle::Slashy => ("/", "/"),
            StringStyle::DollarSlashy => ("$/", "/$"),
        }
    }

    /// Multi-line capable styles normalize CRLF line breaks.
    pub fn strips_cr(&self) -> bool {
        !matches!(self, StringStyle::SingleQuoted | StringStyle::DoubleQuoted)
    }
}

impl EscapeMode {
    pub fn of(text: &str) -> EscapeMode {
        if text.starts_with('/') {
            EscapeMode::Slashy
        } else if text.starts_with("$/") {
            EscapeMode::DollarSlashy
        } else {
            EscapeMode::Standard
        }
    }
}

pub fn remove_cr(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Remove `open` chars from the front and `close` chars from the back; anything too short to
/// hold both delimiters is empty.
fn strip(text: &str, open: usize, close: usize) -> &str {
    if text.len() <= open + close {
        return "";
    }
    text.get(open..text.len() - close).unwrap_or("")
}

/// Decode a complete string literal token. `None` if the text does not start with a string
/// delimiter.
pub fn clean_string_literal(text: &str) -> Option<String> {
    let style = StringStyle::of(text)?;
    let text = if style.strips_cr() {
        remove_cr(text)
    } else {
        text.to_string()
    };
    let (open, close) = style.delimiters();
    Some(replace_escapes(
        strip(&text, open.len(), close.len()),
        style.escape_mode(),
    ))
}

/// Decode the leading segment of an interpolated string (`"abc$`, `/abc$`, `$/abc$`...).
pub fn gstring_begin(text: &str, mode: EscapeMode) -> String {
    let (open, cr) = if text.starts_with("\"\"\"") {
        (3, true)
    } else if text.starts_with("$/") {
        (2, true)
    } else {
        (1, mode == EscapeMode::Slashy)
    };
    let text = if cr { remove_cr(text) } else { text.to_string() };
    replace_escapes(strip(&text, open, 1), mode)
}

/// Decode a middle segment, which carries only its trailing `$`.
pub fn gstring_part(text: &str, mode: EscapeMode) -> String {
    let text = remove_cr(text);
    replace_escapes(strip(&text, 0, 1), mode)
}

/// Decode the closing segment (`abc"`, `abc"""`, `abc/`, `abc/$`).
pub fn gstring_end(text: &str, mode: EscapeMode) -> String {
    let (close, cr) = if text.ends_with("\"\"\"") {
        (3, true)
    } else if text.ends_with("/$") && mode == EscapeMode::DollarSlashy {
        (2, true)
    } else {
        (1, mode == EscapeMode::Slashy)
    };
    let text = if cr { remove_cr(text) } else { text.to_string() };
    replace_escapes(strip(&text, 0, close), mode)
}

fn hex_escape(chars: &[char], at: usize) -> Option<char> {
    let digits: String = chars.get(at..at + 4)?.iter().collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

/// Length of a backslash line continuation starting at `at` (the backslash), if any.
fn line_continuation(chars: &[char], at: usize) -> Option<usize> {
    match (chars.get(at + 1), chars.get(at + 2)) {
        (Some('\n'), _) => Some(2),
        (Some('\r'), Some('\n')) => Some(3),
        _ => None,
    }
}

/// Octal escape `\0` to `\377`: up to three digits, three only if the first is 0 to 3.
fn octal_escape(chars: &[char], at: usize) -> Option<(char, usize)> {
    let first = *chars.get(at)?;
    if !('0'..='7').contains(&first) {
        return None;
    }
    let max = if first <= '3' { 3 } else { 2 };
    let digits: String = chars[at..]
        .iter()
        .take(max)
        .take_while(|c| ('0'..='7').contains(*c))
        .collect();
    let value = u32::from_str_radix(&digits, 8).ok()?;
    Some((char::from_u32(value)?, digits.len()))
}

pub fn replace_escapes(text: &str, mode: EscapeMode) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match (mode, c) {
            (_, '\\') => {
                if let Some(skip) = line_continuation(&chars, i) {
                    i += skip;
                    continue;
                }
                let Some(&next) = chars.get(i + 1) else {
                    out.push(c);
                    i += 1;
                    continue;
                };
                if next == 'u' {
                    if let Some(decoded) = hex_escape(&chars, i + 2) {
                        out.push(decoded);
                        i += 6;
                        continue;
                    }
                }
                match mode {
                    EscapeMode::Standard => {
                        if let Some(decoded) = STANDARD_ESCAPES.get(&next) {
                            out.push(*decoded);
                            i += 2;
                        } else if let Some((decoded, len)) = octal_escape(&chars, i + 1) {
                            out.push(decoded);
                            i += 1 + len;
                        } else {
                            out.push(c);
                            i += 1;
                        }
                    }
                    EscapeMode::Slashy if next == '/' => {
                        out.push('/');
                        i += 2;
                    }
                    _ => {
                        out.push(c);
                        i += 1;
                    }
                }
            }
            (EscapeMode::DollarSlashy, '$') => match chars.get(i + 1) {
                Some('$') => {
                    out.push('$');
                    i += 2;
                }
                Some('/') => {
                    out.push('/');
                    i += 2;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Write `value` as a literal of the given style; decoding the result yields `value` again.
pub fn quote(value: &str, style: StringStyle) -> String {
    let (open, close) = style.delimiters();
    let mut out = String::from(open);
    for c in value.chars() {
        match style.escape_mode() {
            EscapeMode::Standard => match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '$' => out.push_str("\\$"),
                '\n' if matches!(
                    style,
                    StringStyle::TripleSingleQuoted | StringStyle::TripleDoubleQuoted
                ) =>
                {
                    out.push('\n')
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if c.is_control() => push_unicode_escape(&mut out, c),
                c => out.push(c),
            },
            EscapeMode::Slashy => match c {
                '/' => out.push_str("\\/"),
                '\\' | '\r' | '$' => push_unicode_escape(&mut out, c),
                c => out.push(c),
            },
            EscapeMode::DollarSlashy => match c {
                '$' => out.push_str("$$"),
                '/' => out.push_str("$/"),
                '\\' | '\r' => push_unicode_escape(&mut out, c),
                c => out.push(c),
            },
        }
    }
    out.push_str(close);
    out
}

fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{unit:04X}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("'abc'", "abc")]
    #[test_case("\"a\\tb\"", "a\tb")]
    #[test_case("''", "")]
    #[test_case("\"\"", "")]
    #[test_case("''''''", "")]
    #[test_case("'''a\r\nb'''", "a\nb")]
    #[test_case("\"\"\"x\"\"\"", "x")]
    #[test_case("'\\u0041\\101'", "AA")]
    #[test_case("'\\0'", "\0")]
    #[test_case("'a\\\nb'", "ab")]
    #[test_case("'\\q'", "\\q")]
    #[test_case("\"\\$x\"", "$x")]
    #[test_case("/a\\/b\\d/", "a/b\\d")]
    #[test_case("/\\u0041/", "A")]
    #[test_case("$/a$$b$/c/$", "a$b/c")]
    #[test_case("$//$", "")]
    #[test_case("$/x\\n/$", "x\\n")]
    fn test_clean_string_literal(text: &str, expected: &str) {
        assert_eq!(clean_string_literal(text).unwrap(), expected);
    }

    #[test]
    fn test_not_a_string() {
        assert_eq!(clean_string_literal("abc"), None);
    }

    #[test]
    fn test_escaped_backslash_is_not_reread() {
        // `\\u0041` is a backslash followed by the text `u0041`.
        assert_eq!(clean_string_literal("'\\\\u0041'").unwrap(), "\\u0041");
    }

    #[test]
    fn test_octal_width() {
        assert_eq!(clean_string_literal("'\\377'").unwrap(), "\u{ff}");
        // A leading 4 to 7 only takes two digits.
        assert_eq!(clean_string_literal("'\\477'").unwrap(), "\u{27}7");
    }

    #[test]
    fn test_gstring_segments() {
        assert_eq!(gstring_begin("\"Hello $", EscapeMode::Standard), "Hello ");
        assert_eq!(gstring_begin("\"\"\"a\r\nb$", EscapeMode::Standard), "a\nb");
        assert_eq!(gstring_begin("$/x$", EscapeMode::DollarSlashy), "x");
        assert_eq!(gstring_begin("\"$", EscapeMode::Standard), "");
        assert_eq!(gstring_part(", $", EscapeMode::Standard), ", ");
        assert_eq!(gstring_part("$", EscapeMode::Standard), "");
        assert_eq!(gstring_end("!\"", EscapeMode::Standard), "!");
        assert_eq!(gstring_end("\"\"\"", EscapeMode::Standard), "");
        assert_eq!(gstring_end("a/$", EscapeMode::DollarSlashy), "a");
        assert_eq!(gstring_end("\\/x/", EscapeMode::Slashy), "/x");
    }

    #[test]
    fn test_quote_examples() {
        assert_eq!(quote("it's", StringStyle::SingleQuoted), "'it\\'s'");
        assert_eq!(quote("a/b", StringStyle::Slashy), "/a\\/b/");
        assert_eq!(quote("$/", StringStyle::DollarSlashy), "$/$$$//$");
    }
}
