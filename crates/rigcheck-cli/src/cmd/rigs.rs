use crate::output::{print_json, print_table};
use anyhow::Context;
use rigcheck_core::config::Config;
use rigcheck_core::discovery::{discover_workers, rigs_to_scan, Worker};
use rigcheck_core::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct RigListing {
    rigs: Vec<RigEntry>,
    town_store: Option<PathBuf>,
}

#[derive(Serialize)]
struct RigEntry {
    name: String,
    workers: Vec<Worker>,
}

pub fn run(root: &Path, rig: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let rigs = rigs_to_scan(root, rig, &config.ignore_dirs).context("failed to discover rigs")?;

    let entries: Vec<RigEntry> = rigs
        .into_iter()
        .map(|name| RigEntry {
            workers: discover_workers(root, &name, &config.store_marker),
            name,
        })
        .collect();
    let town_store = Some(paths::town_store(root, &config.store_marker)).filter(|p| p.is_dir());

    if json {
        return print_json(&RigListing {
            rigs: entries,
            town_store,
        });
    }

    if entries.is_empty() {
        println!("No rigs configured.");
        return Ok(());
    }

    let mut rows = Vec::new();
    for entry in &entries {
        if entry.workers.is_empty() {
            rows.push(vec![
                entry.name.clone(),
                "-".to_string(),
                "-".to_string(),
                "(no worker stores)".to_string(),
            ]);
        }
        for w in &entry.workers {
            rows.push(vec![
                w.rig.clone(),
                w.label.clone(),
                w.kind.to_string(),
                w.store.display().to_string(),
            ]);
        }
    }
    if let Some(store) = &town_store {
        rows.push(vec![
            "town".to_string(),
            "-".to_string(),
            "-".to_string(),
            store.display().to_string(),
        ]);
    }
    print_table(&["RIG", "WORKER", "KIND", "STORE"], rows);
    Ok(())
}
