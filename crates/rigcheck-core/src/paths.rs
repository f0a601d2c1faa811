use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RIGCHECK_DIR: &str = ".rigcheck";
pub const CONFIG_FILE: &str = ".rigcheck/config.yaml";

/// Directory name that marks a record store inside a worker or the town root.
pub const DEFAULT_STORE_MARKER: &str = ".beads";
pub const ISSUES_FILE: &str = "issues.jsonl";

pub const POLECATS_DIR: &str = "polecats";
pub const CREW_DIR: &str = "crew";

/// Town-level directories that are never rigs.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["mayor", "deacon"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn rigcheck_dir(root: &Path) -> PathBuf {
    root.join(RIGCHECK_DIR)
}

pub fn rig_dir(town_root: &Path, rig: &str) -> PathBuf {
    town_root.join(rig)
}

pub fn town_store(town_root: &Path, marker: &str) -> PathBuf {
    town_root.join(marker)
}

pub fn issues_file(store: &Path) -> PathBuf {
    store.join(ISSUES_FILE)
}
