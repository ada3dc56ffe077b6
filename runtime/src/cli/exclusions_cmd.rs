// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! `record-scout exclusions`: inspect and extend the persisted exclusion list.

use crate::cli::output;
use crate::config;
use anyhow::Result;
use record_scout::store::ExclusionStore;
use std::path::{Path, PathBuf};

fn store_path(config_path: Option<&Path>, file: Option<&Path>) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file.to_path_buf());
    }
    let (config, _) = config::load(config_path)?;
    Ok(config.exclusion_file)
}

/// Print every listed identity.
pub async fn run_list(config_path: Option<&Path>, file: Option<&Path>) -> Result<()> {
    let store = ExclusionStore::load(store_path(config_path, file)?);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": store.path(),
            "count": store.len(),
            "entries": store.sorted(),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        eprintln!("  {} ({} entries)", store.path().display(), store.len());
    }
    for entry in store.sorted() {
        println!("{entry}");
    }
    Ok(())
}

/// Append `name` unless it is already listed.
pub async fn run_add(config_path: Option<&Path>, file: Option<&Path>, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("identity must not be empty");
    }
    let mut store = ExclusionStore::load(store_path(config_path, file)?);
    let added = store.append(name)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": store.path(),
            "identity": name.trim().to_lowercase(),
            "added": added,
        }));
    } else if !output::is_quiet() {
        if added {
            println!("  Added {:?} to {}", name.trim(), store.path().display());
        } else {
            println!("  {:?} is already listed", name.trim());
        }
    }
    Ok(())
}
