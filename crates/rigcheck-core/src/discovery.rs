use crate::error::{Result, RigcheckError};
use crate::paths;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// WorkerKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Primary worker under `polecats/`.
    Polecat,
    /// Auxiliary worker under `crew/`.
    Crew,
}

impl WorkerKind {
    /// Scan order within a rig.
    pub fn all() -> &'static [WorkerKind] {
        &[WorkerKind::Polecat, WorkerKind::Crew]
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            WorkerKind::Polecat => paths::POLECATS_DIR,
            WorkerKind::Crew => paths::CREW_DIR,
        }
    }

    pub fn label_prefix(self) -> &'static str {
        match self {
            WorkerKind::Polecat => "",
            WorkerKind::Crew => "crew/",
        }
    }

    pub fn label(self, name: &str) -> String {
        format!("{}{name}", self.label_prefix())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerKind::Polecat => "polecat",
            WorkerKind::Crew => "crew",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worker {
    pub rig: String,
    pub name: String,
    /// Display label: the bare name for polecats, `crew/<name>` for crew.
    pub label: String,
    pub kind: WorkerKind,
    /// Store-marker directory, e.g. `<rig>/polecats/nux/.beads`.
    pub store: PathBuf,
}

// ---------------------------------------------------------------------------
// Rig discovery
// ---------------------------------------------------------------------------

/// Every rig directory under the town root, sorted by name. Hidden entries
/// and `ignore_dirs` are skipped.
pub fn discover_rigs(town_root: &Path, ignore_dirs: &[String]) -> Result<Vec<String>> {
    let discovery_err = |source| RigcheckError::Discovery {
        path: town_root.to_path_buf(),
        source,
    };

    let mut rigs = Vec::new();
    for entry in std::fs::read_dir(town_root).map_err(discovery_err)? {
        let entry = entry.map_err(discovery_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || ignore_dirs.iter().any(|d| *d == name) {
            continue;
        }
        if entry.path().is_dir() {
            rigs.push(name);
        }
    }
    rigs.sort();
    Ok(rigs)
}

/// The rigs one scan covers. A named rig bypasses discovery entirely.
pub fn rigs_to_scan(
    town_root: &Path,
    rig_name: Option<&str>,
    ignore_dirs: &[String],
) -> Result<Vec<String>> {
    match rig_name.map(str::trim).filter(|r| !r.is_empty()) {
        Some(rig) => Ok(vec![rig.to_string()]),
        None => discover_rigs(town_root, ignore_dirs),
    }
}

// ---------------------------------------------------------------------------
// Worker discovery
// ---------------------------------------------------------------------------

/// Workers of one kind: every `<rig_root>/<kind dir>/*/<marker>` directory,
/// in glob order.
pub fn workers_of_kind(
    rig_root: &Path,
    rig: &str,
    kind: WorkerKind,
    marker: &str,
) -> Result<Vec<Worker>> {
    let base = glob::Pattern::escape(&rig_root.join(kind.dir_name()).to_string_lossy());
    let pattern = format!("{base}/*/{}", glob::Pattern::escape(marker));

    let mut workers = Vec::new();
    for entry in glob::glob(&pattern)? {
        let store = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(rig, kind = %kind, error = %e, "skipping unreadable worker path");
                continue;
            }
        };
        if !store.is_dir() {
            continue;
        }
        let Some(name) = store
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        workers.push(Worker {
            rig: rig.to_string(),
            label: kind.label(&name),
            name,
            kind,
            store,
        });
    }
    Ok(workers)
}

/// All workers in a rig: polecats first, then crew. A failure for one kind is
/// logged and does not prevent scanning the other.
pub fn discover_workers(town_root: &Path, rig: &str, marker: &str) -> Vec<Worker> {
    let rig_root = paths::rig_dir(town_root, rig);
    let mut workers = Vec::new();
    for &kind in WorkerKind::all() {
        match workers_of_kind(&rig_root, rig, kind, marker) {
            Ok(found) => workers.extend(found),
            Err(e) => warn!(rig, kind = %kind, error = %e, "worker discovery failed"),
        }
    }
    workers
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
