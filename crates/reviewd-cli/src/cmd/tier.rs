use crate::output;
use anyhow::Context;
use reviewd_core::{changeset, tier};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let changes = changeset::changed_files(root).context("failed to read pending changes")?;
    let recommendation = tier::classify_changes(&changes);

    if json {
        return output::print_json(&recommendation);
    }

    println!("tier:  {}", recommendation.tier);
    println!("files: {}", recommendation.total_files);
    println!("lines: {}", recommendation.total_lines_changed);
    println!("why:   {}", recommendation.reason);
    Ok(())
}
