use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Diagnostic severity scale. Variants are declared in ascending order so the
/// derived `Ord` sorts `info < minor < major < critical < blocker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Info,
            Severity::Minor,
            Severity::Major,
            Severity::Critical,
            Severity::Blocker,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
            Severity::Blocker => "blocker",
        }
    }

    /// Unit risk contributed by one issue of this severity.
    pub fn score_multiplier(self) -> u32 {
        match self {
            Severity::Blocker => 100,
            Severity::Critical => 75,
            Severity::Major => 25,
            Severity::Minor => 10,
            Severity::Info => 5,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Free-text extraction
// ---------------------------------------------------------------------------

/// Scan free-form tool output line by line for severity tokens.
///
/// A line mentioning "error" counts as one blocker, "warning" as one major,
/// "info" as one info. A line is counted once at its highest-ranked token.
/// Never fails; unrecognized lines contribute nothing.
pub fn extract_severity(text: &str) -> BTreeMap<Severity, usize> {
    let mut counts = BTreeMap::new();
    for line in text.lines() {
        let lower = line.to_ascii_lowercase();
        let severity = if lower.contains("error") {
            Some(Severity::Blocker)
        } else if lower.contains("warning") {
            Some(Severity::Major)
        } else if lower.contains("info") {
            Some(Severity::Info)
        } else {
            None
        };
        if let Some(sev) = severity {
            *counts.entry(sev).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
