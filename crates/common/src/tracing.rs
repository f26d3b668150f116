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

//! Shared tracing initialization for tools and tests that embed the lowering pass

use std::sync::Once;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// How the global subscriber formats and where it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is unset: DEBUG when set, INFO otherwise.
    pub debug_fallback: bool,
    /// Include the file and line of each event.
    pub source_locations: bool,
    /// Route output through the libtest capture instead of stdout.
    pub test_writer: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug_fallback: false,
            source_locations: true,
            test_writer: false,
        }
    }
}

fn build_filter(debug_fallback: bool) -> Result<EnvFilter, eyre::Report> {
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => Ok(env_filter),
        Err(_) => {
            let level = if debug_fallback { "debug" } else { "info" };
            Ok(EnvFilter::try_new(level)?)
        }
    }
}

/// Install the global subscriber.
///
/// - Uses `RUST_LOG` environment variable when available
/// - Falls back to the level `config.debug_fallback` picks
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), eyre::Report> {
    let filter = build_filter(config.debug_fallback)?;
    let layer = fmt::layer()
        .compact()
        .with_ansi(!config.test_writer)
        .with_file(config.source_locations)
        .with_target(false)
        .with_line_number(config.source_locations)
        .with_span_events(fmt::format::FmtSpan::NONE);

    if config.test_writer {
        tracing_subscriber::registry()
            .with(layer.with_test_writer())
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry().with(layer).with(filter).try_init()?;
    }
    Ok(())
}

static TEST_TRACING: Once = Once::new();

/// Tracing for test binaries: captured per test, filtered by `RUST_LOG`, installed at most once.
///
/// Another subscriber installed first wins; this one is then skipped.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let _ = init_tracing(TracingConfig {
            debug_fallback: false,
            source_locations: false,
            test_writer: true,
        });
    });
}
