//! Context manifest: a lightweight language/profile snapshot tagged with
//! the review tier, packaged for downstream report writers.

use crate::types::ReviewTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ContextManifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextManifest {
    pub tier: ReviewTier,
    /// Language name to file count, from the in-scope file extensions.
    pub languages: BTreeMap<String, usize>,
    /// Project profile detected from root marker files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub file_count: usize,
    pub generated_at: DateTime<Utc>,
}

pub fn build_manifest(root: &Path, files: &[String], tier: ReviewTier) -> ContextManifest {
    let mut languages = BTreeMap::new();
    for file in files {
        if let Some(lang) = language_of(file) {
            *languages.entry(lang.to_string()).or_insert(0) += 1;
        }
    }
    ContextManifest {
        tier,
        languages,
        profile: detect_profile(root),
        file_count: files.len(),
        generated_at: Utc::now(),
    }
}

fn language_of(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?;
    Some(match ext {
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "rs" => "rust",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        _ => return None,
    })
}

fn detect_profile(root: &Path) -> Option<String> {
    let markers = [
        ("package.json", "node"),
        ("Cargo.toml", "rust"),
        ("pyproject.toml", "python"),
        ("go.mod", "go"),
    ];
    markers
        .iter()
        .find(|(marker, _)| root.join(marker).exists())
        .map(|(_, profile)| profile.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
