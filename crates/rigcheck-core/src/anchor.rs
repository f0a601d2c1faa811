use crate::attachment::attached_unit;
use crate::error::Result;
use crate::store::{Record, RecordStore, STATUS_IN_PROGRESS, STATUS_PINNED};
use crate::timefmt::{format_duration, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::debug;

/// Title reported for an attachment whose unit can no longer be fetched.
pub const MISSING_UNIT_TITLE: &str = "(molecule not found)";

/// Label used for findings from the town-level store.
pub const TOWN_LABEL: &str = "town";

// ---------------------------------------------------------------------------
// ScanWindow
// ---------------------------------------------------------------------------

/// Fixed time reference for one scan: everything not updated since `cutoff`
/// is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub threshold: Duration,
}

impl ScanWindow {
    pub fn new(now: DateTime<Utc>, threshold: Duration) -> Self {
        Self {
            now,
            cutoff: now - threshold,
            threshold,
        }
    }

    /// Duration reported for an unresolvable attachment. Always exceeds the
    /// threshold.
    pub fn unresolvable_duration(&self) -> Duration {
        (self.now - self.cutoff) + self.threshold
    }
}

// ---------------------------------------------------------------------------
// StaleAttachment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StaleAttachment {
    /// Empty for the town-level store.
    pub rig: String,
    pub worker: Option<String>,
    pub anchor_id: String,
    pub anchor_title: String,
    pub assignee: Option<String>,
    pub unit_id: String,
    pub unit_title: String,
    /// `None` when the unit could not be fetched.
    pub last_updated: Option<DateTime<Utc>>,
    pub stale_for: Duration,
}

impl StaleAttachment {
    /// `rig`, `rig/worker`, or `town`.
    pub fn location(&self) -> String {
        let rig = if self.rig.is_empty() {
            TOWN_LABEL
        } else {
            self.rig.as_str()
        };
        match &self.worker {
            Some(worker) => format!("{rig}/{worker}"),
            None => rig.to_string(),
        }
    }

    /// One report line:
    /// `<location>: <anchor> → <unit> (assignee: <x>) (stale for <d>)`.
    pub fn detail_line(&self) -> String {
        let assignee = self
            .assignee
            .as_deref()
            .map(|a| format!(" (assignee: {a})"))
            .unwrap_or_default();
        format!(
            "{}: {} → {}{} (stale for {})",
            self.location(),
            self.anchor_title,
            self.unit_title,
            assignee,
            format_duration(self.stale_for)
        )
    }
}

// ---------------------------------------------------------------------------
// Anchor classification
// ---------------------------------------------------------------------------

/// Where a store sits in the town, carried onto its findings.
#[derive(Debug, Clone, Copy)]
pub struct StoreOrigin<'a> {
    pub rig: &'a str,
    pub worker: Option<&'a str>,
}

impl StoreOrigin<'static> {
    pub fn town() -> Self {
        Self {
            rig: "",
            worker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorState {
    /// The anchor declares no attached unit.
    NoAttachment,
    /// The attached unit was fetched.
    Resolvable(Record),
    /// The anchor names a unit that cannot be fetched.
    Unresolvable { unit_id: String, error: String },
}

pub fn classify_anchor<S: RecordStore + ?Sized>(
    store: &S,
    location: &Path,
    anchor: &Record,
) -> AnchorState {
    let Some(unit_id) = attached_unit(anchor) else {
        return AnchorState::NoAttachment;
    };
    match store.show(location, &unit_id) {
        Ok(unit) => AnchorState::Resolvable(unit),
        Err(e) => AnchorState::Unresolvable {
            unit_id,
            error: e.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Store scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreScan {
    pub findings: Vec<StaleAttachment>,
    /// Anchors that declared an attachment, stale or not.
    pub checked: usize,
}

fn finding(
    origin: StoreOrigin<'_>,
    anchor: &Record,
    unit_id: String,
    unit_title: String,
    last_updated: Option<DateTime<Utc>>,
    stale_for: Duration,
) -> StaleAttachment {
    StaleAttachment {
        rig: origin.rig.to_string(),
        worker: origin.worker.map(str::to_string),
        anchor_id: anchor.id.clone(),
        anchor_title: anchor.title.clone(),
        assignee: anchor.assignee().map(str::to_string),
        unit_id,
        unit_title,
        last_updated,
        stale_for,
    }
}

/// Evaluate every pinned anchor in one store.
///
/// Fails only when the store cannot be read or listed; everything past that
/// point is folded into the returned [`StoreScan`]. When the backend offers a
/// snapshot, the whole pass is answered from it.
pub fn scan_store<S: RecordStore + ?Sized>(
    store: &S,
    location: &Path,
    window: &ScanWindow,
    origin: StoreOrigin<'_>,
) -> Result<StoreScan> {
    match store.snapshot(location)? {
        Some(snapshot) => scan_records(&snapshot, location, window, origin),
        None => scan_records(store, location, window, origin),
    }
}

fn scan_records<S: RecordStore + ?Sized>(
    store: &S,
    location: &Path,
    window: &ScanWindow,
    origin: StoreOrigin<'_>,
) -> Result<StoreScan> {
    let anchors = store.list(location, STATUS_PINNED)?;
    let mut scan = StoreScan::default();

    for anchor in &anchors {
        match classify_anchor(store, location, anchor) {
            AnchorState::NoAttachment => {}
            AnchorState::Unresolvable { unit_id, error } => {
                scan.checked += 1;
                debug!(anchor = %anchor.id, unit = %unit_id, %error, "attached unit unresolvable");
                scan.findings.push(finding(
                    origin,
                    anchor,
                    unit_id,
                    MISSING_UNIT_TITLE.to_string(),
                    None,
                    window.unresolvable_duration(),
                ));
            }
            AnchorState::Resolvable(unit) => {
                scan.checked += 1;
                let updated_at = match parse_timestamp(&unit.updated_at) {
                    Ok(ts) => ts,
                    Err(e) => {
                        debug!(anchor = %anchor.id, unit = %unit.id, error = %e, "skipping anchor");
                        continue;
                    }
                };
                if unit.status == STATUS_IN_PROGRESS && updated_at < window.cutoff {
                    scan.findings.push(finding(
                        origin,
                        anchor,
                        unit.id,
                        unit.title,
                        Some(updated_at),
                        window.now - updated_at,
                    ));
                }
            }
        }
    }

    Ok(scan)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RigcheckError;
    use crate::store::JsonlStore;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn window() -> ScanWindow {
        ScanWindow::new(now(), Duration::hours(1))
    }

    fn anchor(id: &str, unit: Option<&str>) -> String {
        let description = unit
            .map(|u| format!("attached_molecule: {u}"))
            .unwrap_or_default();
        serde_json::json!({
            "id": id,
            "title": format!("hook {id}"),
            "status": "pinned",
            "assignee": "gastown/nux",
            "description": description,
        })
        .to_string()
    }

    fn unit(id: &str, status: &str, updated_at: &str) -> String {
        serde_json::json!({
            "id": id,
            "title": format!("work {id}"),
            "status": status,
            "updated_at": updated_at,
        })
        .to_string()
    }

    fn store(lines: &[String]) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".beads")).unwrap();
        std::fs::write(dir.path().join(".beads/issues.jsonl"), lines.join("\n")).unwrap();
        dir
    }

    fn scan(dir: &TempDir) -> StoreScan {
        let origin = StoreOrigin {
            rig: "gastown",
            worker: Some("nux"),
        };
        scan_store(&JsonlStore, &dir.path().join(".beads"), &window(), origin).unwrap()
    }

    fn ago(d: Duration) -> String {
        (now() - d).to_rfc3339()
    }

    #[test]
    fn window_cutoff_and_synthetic_duration() {
        let w = window();
        assert_eq!(w.cutoff, now() - Duration::hours(1));
        assert_eq!(w.unresolvable_duration(), Duration::hours(2));
        assert!(w.unresolvable_duration() > w.threshold);
    }

    #[test]
    fn synthetic_duration_exceeds_any_positive_threshold() {
        for threshold in [Duration::seconds(1), Duration::minutes(5), Duration::hours(24)] {
            let w = ScanWindow::new(now(), threshold);
            assert!(w.unresolvable_duration() > w.threshold, "{threshold}");
        }
    }

    #[test]
    fn anchor_without_attachment_is_not_counted() {
        let dir = store(&[anchor("gt-1", None)]);
        let result = scan(&dir);
        assert_eq!(result.checked, 0);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn stale_in_progress_unit_is_reported() {
        let dir = store(&[
            anchor("gt-1", Some("mol-1")),
            unit("mol-1", "in_progress", &ago(Duration::hours(2))),
        ]);
        let result = scan(&dir);
        assert_eq!(result.checked, 1);
        assert_eq!(result.findings.len(), 1);
        let f = &result.findings[0];
        assert_eq!(f.stale_for, Duration::hours(2));
        assert_eq!(f.unit_title, "work mol-1");
        assert_eq!(f.assignee.as_deref(), Some("gastown/nux"));
        assert_eq!(
            f.detail_line(),
            "gastown/nux: hook gt-1 → work mol-1 (assignee: gastown/nux) (stale for 2h0m0s)"
        );
    }

    #[test]
    fn fresh_or_finished_units_are_not_reported() {
        let dir = store(&[
            anchor("gt-1", Some("mol-1")),
            anchor("gt-2", Some("mol-2")),
            anchor("gt-3", Some("mol-3")),
            anchor("gt-4", Some("mol-4")),
            unit("mol-1", "in_progress", &ago(Duration::minutes(30))),
            unit("mol-2", "closed", &ago(Duration::hours(10))),
            unit("mol-3", "open", &ago(Duration::hours(10))),
            unit("mol-4", "in_progress", &ago(Duration::hours(1))),
        ]);
        let result = scan(&dir);
        assert_eq!(result.checked, 4);
        assert!(result.findings.is_empty(), "{:?}", result.findings);
    }

    #[test]
    fn missing_unit_is_reported_as_very_stale() {
        let dir = store(&[anchor("gt-1", Some("mol-404"))]);
        let result = scan(&dir);
        assert_eq!(result.checked, 1);
        let f = &result.findings[0];
        assert_eq!(f.unit_id, "mol-404");
        assert_eq!(f.unit_title, MISSING_UNIT_TITLE);
        assert_eq!(f.last_updated, None);
        assert!(f.stale_for > Duration::hours(1));
    }

    #[test]
    fn unparseable_timestamp_is_counted_but_skipped() {
        let dir = store(&[
            anchor("gt-1", Some("mol-1")),
            unit("mol-1", "in_progress", "not-a-date"),
        ]);
        let result = scan(&dir);
        assert_eq!(result.checked, 1);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn every_anchor_yields_at_most_one_finding() {
        let dir = store(&[
            anchor("gt-1", Some("mol-1")),
            anchor("gt-2", Some("mol-1")),
            unit("mol-1", "in_progress", &ago(Duration::hours(3))),
        ]);
        let result = scan(&dir);
        assert_eq!(result.checked, 2);
        let anchors: Vec<&str> = result.findings.iter().map(|f| f.anchor_id.as_str()).collect();
        assert_eq!(anchors, ["gt-1", "gt-2"]);
    }

    #[test]
    fn unlistable_store_fails() {
        let dir = TempDir::new().unwrap();
        let err = scan_store(
            &JsonlStore,
            &dir.path().join(".beads"),
            &window(),
            StoreOrigin::town(),
        )
        .unwrap_err();
        assert!(matches!(err, RigcheckError::StoreUnavailable { .. }));
    }

    /// Backend whose direct reads always fail but which hands out a
    /// snapshot; a scan must be served entirely from the snapshot.
    struct SnapshotOnly(crate::store::Snapshot);

    impl RecordStore for SnapshotOnly {
        fn list(&self, location: &Path, _status: &str) -> Result<Vec<Record>> {
            Err(RigcheckError::StoreUnavailable {
                location: location.to_path_buf(),
                reason: "direct list".to_string(),
            })
        }

        fn show(&self, location: &Path, _id: &str) -> Result<Record> {
            Err(RigcheckError::StoreUnavailable {
                location: location.to_path_buf(),
                reason: "direct show".to_string(),
            })
        }

        fn snapshot(&self, _location: &Path) -> Result<Option<crate::store::Snapshot>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[test]
    fn scan_reads_from_snapshot() {
        let mut hook = Record::new("gt-1", "hook", STATUS_PINNED);
        hook.description = Some("attached_molecule: mol-1".to_string());
        let mut mol = Record::new("mol-1", "work", STATUS_IN_PROGRESS);
        mol.updated_at = ago(Duration::hours(2));
        let store = SnapshotOnly(crate::store::Snapshot::new(vec![hook, mol]));

        let result = scan_store(&store, Path::new("/town/.beads"), &window(), StoreOrigin::town())
            .unwrap();
        assert_eq!(result.checked, 1);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].unit_title, "work");
    }

    #[test]
    fn classify_reports_each_state() {
        let dir = store(&[
            anchor("gt-1", None),
            anchor("gt-2", Some("mol-1")),
            anchor("gt-3", Some("mol-404")),
            unit("mol-1", "in_progress", "2026-01-01"),
        ]);
        let location = dir.path().join(".beads");
        let anchors = JsonlStore.list(&location, STATUS_PINNED).unwrap();
        let states: Vec<AnchorState> = anchors
            .iter()
            .map(|a| classify_anchor(&JsonlStore, &location, a))
            .collect();
        assert_eq!(states[0], AnchorState::NoAttachment);
        assert!(matches!(&states[1], AnchorState::Resolvable(r) if r.id == "mol-1"));
        assert!(matches!(
            &states[2],
            AnchorState::Unresolvable { unit_id, .. } if unit_id == "mol-404"
        ));
    }

    #[test]
    fn town_findings_are_labelled_town() {
        let dir = store(&[anchor("hq-1", Some("mol-404"))]);
        let result = scan_store(
            &JsonlStore,
            &dir.path().join(".beads"),
            &window(),
            StoreOrigin::town(),
        )
        .unwrap();
        assert_eq!(result.findings[0].location(), "town");
        assert!(result.findings[0]
            .detail_line()
            .starts_with("town: hook hq-1 → (molecule not found) (assignee: gastown/nux)"));
    }
}
