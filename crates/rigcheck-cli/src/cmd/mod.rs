pub mod config;
pub mod rigs;
pub mod stale;
