use std::path::{Path, PathBuf};

/// Directories that mark a town root, in priority order.
const TOWN_MARKERS: &[&str] = &[".rigcheck", "mayor"];

/// Resolve the town root directory.
///
/// Priority:
/// 1. `--root` flag / `RIGCHECK_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.rigcheck/`
/// 3. Walk upward from `cwd` looking for `mayor/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    TOWN_MARKERS
        .iter()
        .find_map(|marker| find_upward(&cwd, marker))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_marker_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("mayor")).unwrap();
        let deep = dir.path().join("gastown/polecats/nux");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_upward(&deep, "mayor").as_deref(), Some(dir.path()));
        assert_eq!(find_upward(&deep, ".rigcheck-missing"), None);
    }

    #[test]
    fn rigcheck_dir_outranks_mayor() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("mayor")).unwrap();
        let inner = dir.path().join("sub");
        std::fs::create_dir_all(inner.join(".rigcheck")).unwrap();
        let found = TOWN_MARKERS
            .iter()
            .find_map(|m| find_upward(&inner, m));
        assert_eq!(found.as_deref(), Some(inner.as_path()));
    }
}
