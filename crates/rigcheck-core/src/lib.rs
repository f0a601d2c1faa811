pub mod anchor;
pub mod attachment;
pub mod check;
pub mod config;
pub mod discovery;
pub mod error;
pub mod paths;
pub mod stale;
pub mod store;
pub mod timefmt;

pub use check::{Check, CheckContext, CheckResult, CheckStatus};
pub use error::{Result, RigcheckError};
pub use stale::StaleAttachmentsCheck;
