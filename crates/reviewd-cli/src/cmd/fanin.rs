use crate::output;
use reviewd_core::imports;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct FanInEntry {
    path: String,
    fan_in: usize,
}

pub fn run(root: &Path, top: usize, json: bool) -> anyhow::Result<()> {
    let fan_in = imports::analyze_fan_in(root);

    let mut entries: Vec<FanInEntry> = fan_in
        .into_iter()
        .map(|(path, fan_in)| FanInEntry { path, fan_in })
        .collect();
    entries.sort_by(|a, b| b.fan_in.cmp(&a.fan_in).then_with(|| a.path.cmp(&b.path)));
    entries.truncate(top);

    if json {
        return output::print_json(&entries);
    }

    if entries.is_empty() {
        println!("No resolvable imports found.");
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| vec![e.path.clone(), e.fan_in.to_string()])
        .collect();
    output::print_table(&["FILE", "FAN-IN"], rows);
    Ok(())
}
