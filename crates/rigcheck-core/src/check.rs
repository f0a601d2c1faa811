use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CheckStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            CheckStatus::Ok => "\u{2713}",
            CheckStatus::Warning => "!",
            CheckStatus::Error => "\u{2717}",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CheckContext / CheckResult
// ---------------------------------------------------------------------------

/// What a health check is asked to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckContext {
    pub town_root: PathBuf,
    /// Restrict the check to one rig. `None` means every rig.
    pub rig_name: Option<String>,
}

impl CheckContext {
    pub fn new(town_root: impl Into<PathBuf>) -> Self {
        Self {
            town_root: town_root.into(),
            rig_name: None,
        }
    }

    pub fn for_rig(mut self, rig: impl Into<String>) -> Self {
        self.rig_name = Some(rig.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            details: Vec::new(),
            fix_hint: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// A single health probe. `run` reports problems through the returned
/// result's status instead of failing.
pub trait Check {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn run(&self, ctx: &CheckContext) -> CheckResult;
}
