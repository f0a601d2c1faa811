use crate::output::{print_check, print_json};
use anyhow::Context;
use rigcheck_core::config::Config;
use rigcheck_core::timefmt::parse_threshold;
use rigcheck_core::{Check, CheckContext, CheckStatus, StaleAttachmentsCheck};
use std::path::Path;

pub fn run(root: &Path, rig: Option<&str>, threshold: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let check = match threshold {
        Some(raw) => {
            let threshold = parse_threshold(raw).context("invalid --threshold")?;
            StaleAttachmentsCheck::with_threshold(threshold).with_config(&config)
        }
        None => StaleAttachmentsCheck::from_config(&config),
    };

    let mut ctx = CheckContext::new(root);
    if let Some(rig) = rig {
        ctx = ctx.for_rig(rig);
    }

    let result = check.run(&ctx);
    if json {
        print_json(&result)?;
    } else {
        print_check(&result);
    }

    if result.status == CheckStatus::Error {
        anyhow::bail!("{} check failed: {}", result.name, result.message);
    }
    Ok(())
}
