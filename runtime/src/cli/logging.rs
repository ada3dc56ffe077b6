// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if verbose {
        "record_scout=debug,record_scout_runtime=debug"
    } else if quiet {
        "warn"
    } else {
        "record_scout=info,record_scout_runtime=info,warn"
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `--log-level` wins over `RUST_LOG`, which wins over the mode default.
pub fn init(json: bool, quiet: bool, verbose: bool, level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose))),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);
    // A second init (tests) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
