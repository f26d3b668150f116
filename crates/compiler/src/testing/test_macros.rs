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
//! Assertion macros for lowering tests. Each reports the call site on failure.

/// Lower a unit fixture, failing the test on error. Evaluates to the compilation unit.
#[macro_export]
macro_rules! assert_lowers_ok {
    ($root:expr) => {
        match $crate::testing::lower_unit($root) {
            Ok(unit) => unit,
            Err(e) => panic!("Expected lowering to succeed, got {} at {}:{}", e, file!(), line!()),
        }
    };
}

/// Lower a unit fixture expecting failure. Evaluates to the error.
#[macro_export]
macro_rules! assert_lowering_fails {
    ($root:expr) => {
        match $crate::testing::lower_unit($root) {
            Ok(unit) => panic!(
                "Expected lowering to fail, got {:?} at {}:{}",
                unit,
                file!(),
                line!()
            ),
            Err(e) => e,
        }
    };
}

/// Lower a unit fixture expecting an error of `kind` whose message starts with `prefix`.
#[macro_export]
macro_rules! assert_lowering_error {
    ($root:expr, $kind:expr, $prefix:expr) => {{
        let error = $crate::assert_lowering_fails!($root);
        assert_eq!(
            error.kind(),
            $kind,
            "Unexpected error kind for {} at {}:{}",
            error,
            file!(),
            line!()
        );
        assert!(
            error.message().starts_with($prefix),
            "Expected message starting with {:?}, got {:?} at {}:{}",
            $prefix,
            error.message(),
            file!(),
            line!()
        );
        error
    }};
}

/// Lower a unit fixture and compare its top-level statements, unparsed one per entry.
#[macro_export]
macro_rules! assert_unparses {
    ($root:expr, [$($expected:expr),* $(,)?]) => {{
        let unit = $crate::assert_lowers_ok!($root);
        let actual: Vec<String> = unit.statements.iter().map($crate::unparse::unparse_stmt).collect();
        let expected: Vec<String> = vec![$($expected.to_string()),*];
        assert_eq!(actual, expected, "Unparsed statements differ at {}:{}", file!(), line!());
        unit
    }};
}
