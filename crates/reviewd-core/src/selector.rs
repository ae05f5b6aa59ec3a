//! Risk-weighted ranking of changed files.
//!
//! Each changed file gets a score combining diagnostic severity, change
//! size, and import fan-in. Both the size and fan-in weights are
//! logarithmic, so marginal risk per additional line or importer
//! diminishes. The scoring formula is versioned through
//! [`ALGORITHM`] so report consumers can detect formula changes.

use crate::normalize;
use crate::severity::Severity;
use crate::types::{Diagnostic, FileChange, RawToolResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Version tag for the scoring formula.
pub const ALGORITHM: &str = "sev-mult+log-size+log-fanin/v1";

/// Fan-in at or above this is called out as high architectural impact.
const HIGH_FAN_IN: usize = 20;

const SIZE_WEIGHT_SCALE: f64 = 10.0;
const FAN_IN_WEIGHT_SCALE: f64 = 8.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRiskEntry {
    pub path: String,
    pub score: f64,
    /// Human-readable audit trail of the signals that contributed.
    pub risk_factors: Vec<String>,
    pub lines_changed: u32,
    pub import_fan_in: usize,
    pub severity_counts: BTreeMap<Severity, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalFilesReport {
    /// At most `max_files` entries, sorted descending by score.
    pub top_files: Vec<FileRiskEntry>,
    /// Every changed file, in input order.
    pub all_files: Vec<FileRiskEntry>,
    pub inferred_critical_paths: Vec<String>,
    pub configured_critical_paths: Vec<String>,
    pub algorithm: String,
}

#[derive(Debug, Clone, Default)]
pub struct SelectorOptions {
    pub max_files: usize,
    pub configured_critical_paths: Vec<String>,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Rank changed files by risk. Pure function of its inputs: deterministic
/// for a given change set, tool output, and fan-in snapshot.
pub fn select_critical_files(
    changes: &[FileChange],
    tool_results: &[RawToolResult],
    fan_in: &HashMap<String, usize>,
    options: &SelectorOptions,
) -> CriticalFilesReport {
    // Normalize once over all results, then attribute per file.
    let diagnostics: Vec<Diagnostic> = tool_results
        .iter()
        .filter(|r| !r.is_skipped())
        .flat_map(normalize::parse)
        .collect();

    let all_files: Vec<FileRiskEntry> = changes
        .iter()
        .map(|change| score_file(change, &diagnostics, fan_in))
        .collect();

    let mut ranked = all_files.clone();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    ranked.truncate(options.max_files);

    let inferred_critical_paths = ranked.iter().map(|e| e.path.clone()).collect();

    CriticalFilesReport {
        top_files: ranked,
        all_files,
        inferred_critical_paths,
        configured_critical_paths: options.configured_critical_paths.clone(),
        algorithm: ALGORITHM.to_string(),
    }
}

fn score_file(
    change: &FileChange,
    diagnostics: &[Diagnostic],
    fan_in: &HashMap<String, usize>,
) -> FileRiskEntry {
    let scope = [change.path.clone()];
    let mut severity_counts: BTreeMap<Severity, usize> = BTreeMap::new();
    for diag in diagnostics {
        if let Some(file) = &diag.file {
            if normalize::file_in_scope(file, &scope) {
                *severity_counts.entry(diag.severity).or_insert(0) += 1;
            }
        }
    }

    let import_fan_in = fan_in.get(&change.path).copied().unwrap_or(0);

    let mut score = 0.0;
    let mut risk_factors = Vec::new();

    // Highest severity first so the audit trail reads worst-to-best.
    for &severity in Severity::all().iter().rev() {
        if let Some(&count) = severity_counts.get(&severity) {
            score += (count as u32 * severity.score_multiplier()) as f64;
            let noun = if count == 1 { "issue" } else { "issues" };
            risk_factors.push(format!("{count} {severity} {noun}"));
        }
    }

    if change.lines_changed > 0 {
        score += size_weight(change.lines_changed);
        risk_factors.push(format!("{} lines changed", change.lines_changed));
    }

    if import_fan_in > 0 {
        score += fan_in_weight(import_fan_in);
        if import_fan_in >= HIGH_FAN_IN {
            risk_factors.push(format!("high impact ({import_fan_in} imports)"));
        } else {
            risk_factors.push(format!("imported by {import_fan_in} files"));
        }
    }

    FileRiskEntry {
        path: change.path.clone(),
        score,
        risk_factors,
        lines_changed: change.lines_changed,
        import_fan_in,
        severity_counts,
    }
}

/// Monotonic saturating weight for change size: `10·ln(1 + lines)`.
fn size_weight(lines_changed: u32) -> f64 {
    SIZE_WEIGHT_SCALE * (1.0 + lines_changed as f64).ln()
}

/// Monotonic saturating weight for fan-in: `8·ln(1 + fan_in)`.
fn fan_in_weight(fan_in: usize) -> f64 {
    FAN_IN_WEIGHT_SCALE * (1.0 + fan_in as f64).ln()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
