use crate::output;
use reviewd_core::config::ReviewConfig;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ToolStatus {
    name: String,
    check_type: String,
    command: String,
    auto_fixable: bool,
    installed: bool,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = ReviewConfig::load(root)?;
    let registry = config.registry();

    let statuses: Vec<ToolStatus> = registry
        .tools
        .iter()
        .map(|tool| {
            let program = tool.command.split_whitespace().next().unwrap_or("");
            ToolStatus {
                name: tool.name.clone(),
                check_type: tool.check_type.to_string(),
                command: tool.command.clone(),
                auto_fixable: tool.auto_fixable(),
                installed: which::which(program).is_ok(),
            }
        })
        .collect();

    if json {
        return output::print_json(&statuses);
    }

    let rows = statuses
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.check_type.clone(),
                if s.installed { "yes" } else { "no" }.to_string(),
                if s.auto_fixable { "yes" } else { "no" }.to_string(),
                s.command.clone(),
            ]
        })
        .collect();
    output::print_table(&["TOOL", "CHECK", "INSTALLED", "FIXABLE", "COMMAND"], rows);
    Ok(())
}
