// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record Scout runtime: Chromium-backed documents, browser sessions,
//! configuration resolution, and the command-line interface.

pub mod cli;
pub mod config;
pub mod renderer;
pub mod session;
