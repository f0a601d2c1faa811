//! The `stale-attachments` health check.
//!
//! Walks every rig's worker stores plus the town-level store, resolves each
//! pinned anchor's attached unit, and reports units that have sat
//! `in_progress` past the threshold. A store that cannot be read is skipped;
//! only an unreadable town root fails the check.

use crate::anchor::{scan_store, ScanWindow, StaleAttachment, StoreOrigin, StoreScan};
use crate::check::{Check, CheckContext, CheckResult, CheckStatus};
use crate::config::{default_stale_threshold, Config};
use crate::discovery::{discover_workers, rigs_to_scan};
use crate::error::{Result, RigcheckError};
use crate::paths;
use crate::store::{JsonlStore, RecordStore};
use crate::timefmt::format_duration;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CHECK_NAME: &str = "stale-attachments";
pub const CHECK_DESCRIPTION: &str =
    "Check for attached molecules that haven't been updated in too long";
pub const FIX_HINT: &str = "Check if polecats are stuck or crashed. Use 'gt witness nudge <polecat>' or 'gt polecat kill <name>' if needed";

// ---------------------------------------------------------------------------
// ScanReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedStore {
    pub rig: String,
    pub worker: Option<String>,
    pub location: PathBuf,
    pub reason: String,
}

/// Accumulated outcome of one pass. Built fresh for every scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub rigs: Vec<String>,
    pub findings: Vec<StaleAttachment>,
    pub checked: usize,
    /// Stores that could not be listed. They reduce coverage but never fail
    /// the check.
    pub skipped: Vec<SkippedStore>,
}

impl ScanReport {
    fn absorb(&mut self, origin: StoreOrigin<'_>, location: &Path, result: Result<StoreScan>) {
        match result {
            Ok(scan) => {
                debug!(
                    rig = origin.rig,
                    worker = origin.worker,
                    checked = scan.checked,
                    stale = scan.findings.len(),
                    "store scanned"
                );
                self.checked += scan.checked;
                self.findings.extend(scan.findings);
            }
            Err(e) => {
                warn!(
                    rig = origin.rig,
                    worker = origin.worker,
                    location = %location.display(),
                    error = %e,
                    "skipping record store"
                );
                self.skipped.push(SkippedStore {
                    rig: origin.rig.to_string(),
                    worker: origin.worker.map(str::to_string),
                    location: location.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StaleAttachmentsCheck
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StaleAttachmentsCheck<S = JsonlStore> {
    store: S,
    threshold: Duration,
    store_marker: String,
    ignore_dirs: Vec<String>,
}

impl StaleAttachmentsCheck<JsonlStore> {
    /// Check with the default one-hour threshold.
    pub fn new() -> Self {
        Self::with_threshold(default_stale_threshold())
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self::with_store(JsonlStore, threshold)
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::with_store(JsonlStore, cfg.stale_threshold).with_config(cfg)
    }
}

impl Default for StaleAttachmentsCheck<JsonlStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecordStore> StaleAttachmentsCheck<S> {
    pub fn with_store(store: S, threshold: Duration) -> Self {
        let defaults = Config::default();
        Self {
            store,
            threshold,
            store_marker: defaults.store_marker,
            ignore_dirs: defaults.ignore_dirs,
        }
    }

    /// Take the store marker and ignored directories from `cfg`. The
    /// threshold is left as constructed.
    pub fn with_config(mut self, cfg: &Config) -> Self {
        self.store_marker = cfg.store_marker.clone();
        self.ignore_dirs = cfg.ignore_dirs.clone();
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Walk the town as of `now`. Fails when the threshold is not positive or
    /// rig discovery fails.
    pub fn scan_at(&self, ctx: &CheckContext, now: DateTime<Utc>) -> Result<ScanReport> {
        if self.threshold <= Duration::zero() {
            return Err(RigcheckError::InvalidThreshold(format_duration(self.threshold)));
        }
        let rigs = rigs_to_scan(&ctx.town_root, ctx.rig_name.as_deref(), &self.ignore_dirs)?;
        let mut report = ScanReport {
            rigs,
            ..ScanReport::default()
        };
        if report.rigs.is_empty() {
            return Ok(report);
        }

        let window = ScanWindow::new(now, self.threshold);
        for rig in report.rigs.clone() {
            self.scan_rig(&ctx.town_root, &rig, &window, &mut report);
        }

        let town_store = paths::town_store(&ctx.town_root, &self.store_marker);
        let origin = StoreOrigin::town();
        let result = scan_store(&self.store, &town_store, &window, origin);
        report.absorb(origin, &town_store, result);

        Ok(report)
    }

    fn scan_rig(&self, town_root: &Path, rig: &str, window: &ScanWindow, report: &mut ScanReport) {
        for worker in discover_workers(town_root, rig, &self.store_marker) {
            let origin = StoreOrigin {
                rig,
                worker: Some(worker.label.as_str()),
            };
            let result = scan_store(&self.store, &worker.store, window, origin);
            report.absorb(origin, &worker.store, result);
        }
    }

    pub fn render(&self, report: &ScanReport) -> CheckResult {
        if report.rigs.is_empty() {
            return CheckResult::new(CHECK_NAME, CheckStatus::Ok, "No rigs configured");
        }

        if !report.findings.is_empty() {
            let details = report
                .findings
                .iter()
                .map(StaleAttachment::detail_line)
                .collect();
            return CheckResult::new(
                CHECK_NAME,
                CheckStatus::Warning,
                format!(
                    "{} stale attachment(s) found (no activity for >{})",
                    report.findings.len(),
                    format_duration(self.threshold)
                ),
            )
            .with_details(details)
            .with_fix_hint(FIX_HINT);
        }

        if report.checked == 0 {
            return CheckResult::new(CHECK_NAME, CheckStatus::Ok, "No attachments to check");
        }

        CheckResult::new(
            CHECK_NAME,
            CheckStatus::Ok,
            format!("Checked {} attachment(s), none stale", report.checked),
        )
    }
}

impl<S: RecordStore> Check for StaleAttachmentsCheck<S> {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    fn description(&self) -> &str {
        CHECK_DESCRIPTION
    }

    fn run(&self, ctx: &CheckContext) -> CheckResult {
        match self.scan_at(ctx, Utc::now()) {
            Ok(report) => self.render(&report),
            Err(e @ RigcheckError::InvalidThreshold(_)) => {
                CheckResult::new(CHECK_NAME, CheckStatus::Error, "Invalid stale threshold")
                    .with_details(vec![e.to_string()])
            }
            Err(e) => CheckResult::new(CHECK_NAME, CheckStatus::Error, "Failed to discover rigs")
                .with_details(vec![e.to_string()]),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
