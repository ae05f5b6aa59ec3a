use crate::output;
use anyhow::Context;
use reviewd_core::changeset;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let changes = changeset::changed_files(root).context("failed to read pending changes")?;

    if json {
        return output::print_json(&changes);
    }

    if changes.is_empty() {
        println!("No pending changes.");
        return Ok(());
    }

    let rows = changes
        .iter()
        .map(|c| {
            vec![
                c.path.clone(),
                format!("+{}", c.lines_added),
                format!("-{}", c.lines_deleted),
                c.lines_changed.to_string(),
            ]
        })
        .collect();
    output::print_table(&["FILE", "ADDED", "DELETED", "CHANGED"], rows);
    Ok(())
}
