use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use rigcheck_core::config::{Config, WarnLevel};
use rigcheck_core::paths;
use rigcheck_core::timefmt::format_duration;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        return print_json(&config);
    }

    let source = paths::config_path(root);
    if source.exists() {
        println!("Config file:      {}", source.display());
    } else {
        println!("Config file:      (none, using defaults)");
    }
    println!("Stale threshold:  {}", format_duration(config.stale_threshold));
    println!("Store marker:     {}", config.store_marker);
    if config.ignore_dirs.is_empty() {
        println!("Ignored dirs:     (none)");
    } else {
        println!("Ignored dirs:     {}", config.ignore_dirs.join(", "));
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
