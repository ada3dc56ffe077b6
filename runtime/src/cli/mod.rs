// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the record-scout binary.

pub mod doctor;
pub mod exclusions_cmd;
pub mod logging;
pub mod output;
pub mod progress_bar;
pub mod run_cmd;
