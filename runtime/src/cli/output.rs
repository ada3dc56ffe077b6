// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output mode flags and terminal helpers shared by all commands.
//!
//! Global flags are stored in environment variables by `main` so every
//! command sees the same mode without threading it through.

use serde::Serialize;

pub const JSON_ENV: &str = "RECORD_SCOUT_JSON";
pub const QUIET_ENV: &str = "RECORD_SCOUT_QUIET";

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

pub fn is_json() -> bool {
    flag(JSON_ENV)
}

pub fn is_quiet() -> bool {
    flag(QUIET_ENV)
}

/// Progress bars only make sense for a human watching a terminal.
pub fn show_progress() -> bool {
    !is_json() && !is_quiet()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// Status markers for check-style output.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\x1b[32m[OK]\x1b[0m"
        } else {
            "[OK]"
        }
    }

    pub fn fail_sym(&self) -> &'static str {
        if self.color {
            "\x1b[31m[!!]\x1b[0m"
        } else {
            "[!!]"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
