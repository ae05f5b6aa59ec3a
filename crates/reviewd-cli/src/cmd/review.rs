use crate::output;
use anyhow::Context;
use reviewd_core::config::ReviewConfig;
use reviewd_core::engine::{ReviewEngine, ReviewFindings, ReviewOptions};
use reviewd_core::normalize;
use std::path::Path;

pub fn run(
    root: &Path,
    scope: Vec<String>,
    max_files: Option<usize>,
    no_critical: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = ReviewConfig::load(root).context("failed to load .reviewd.yaml")?;
    if let Some(max) = max_files {
        config.max_files = max;
    }
    let registry = config.registry();
    let engine = ReviewEngine::new(root.to_path_buf(), config, registry);

    let options = ReviewOptions {
        scope,
        enable_critical_selection: !no_critical,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let findings = rt
        .block_on(engine.analyze_files(&options))
        .context("review pipeline failed")?;

    if json {
        return output::print_json(&findings);
    }
    print_summary(&findings);
    Ok(())
}

fn print_summary(findings: &ReviewFindings) {
    println!("tier: {} — {}", findings.metadata.tier, findings.tier_recommendation.reason);
    println!();

    let report = normalize::aggregate(&findings.raw_tool_results, None);
    let rows = findings
        .tool_results
        .iter()
        .map(|t| {
            let status = if t.raw.is_skipped() {
                "skipped"
            } else if t.raw.success == Some(true) {
                "ok"
            } else {
                "failed"
            };
            vec![
                t.raw.tool.clone(),
                t.raw.check_type.to_string(),
                status.to_string(),
                t.raw.reason.clone().unwrap_or_default(),
            ]
        })
        .collect();
    output::print_table(&["TOOL", "CHECK", "STATUS", "REASON"], rows);
    println!();
    println!(
        "checks: {}/{} passed ({}%), {} issue(s)",
        report.summary.checks_passed,
        report.summary.checks_run,
        report.summary.pass_rate,
        report.summary.total_issues
    );

    if let Some(critical) = &findings.critical_files {
        if !critical.top_files.is_empty() {
            println!();
            println!("critical files ({}):", critical.algorithm);
            let rows = critical
                .top_files
                .iter()
                .map(|f| {
                    vec![
                        f.path.clone(),
                        format!("{:.1}", f.score),
                        f.risk_factors.join(", "),
                    ]
                })
                .collect();
            output::print_table(&["FILE", "SCORE", "RISK FACTORS"], rows);
        }
    }
}
