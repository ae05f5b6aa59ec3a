use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CheckType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    TypeChecking,
    Linting,
    Testing,
    Formatting,
}

impl CheckType {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckType::TypeChecking => "type_checking",
            CheckType::Linting => "linting",
            CheckType::Testing => "testing",
            CheckType::Formatting => "formatting",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FileChange
// ---------------------------------------------------------------------------

/// One file with pending modifications in the working tree.
///
/// `path` is repository-relative with renames resolved to the new name.
/// Invariant: `lines_changed == lines_added + lines_deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub lines_added: u32,
    pub lines_deleted: u32,
    pub lines_changed: u32,
}

impl FileChange {
    pub fn new(path: impl Into<String>, lines_added: u32, lines_deleted: u32) -> Self {
        Self {
            path: path.into(),
            lines_added,
            lines_deleted,
            lines_changed: lines_added + lines_deleted,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// One normalized issue extracted from a quality-check tool's raw output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

// ---------------------------------------------------------------------------
// RawToolResult
// ---------------------------------------------------------------------------

/// One external tool invocation's outcome before normalization.
///
/// A `skipped` result carries no diagnostics and is excluded from
/// pass/fail accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToolResult {
    #[serde(rename = "type")]
    pub check_type: CheckType,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl RawToolResult {
    pub fn skipped(check_type: CheckType, tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            check_type,
            tool: tool.into(),
            success: None,
            skipped: Some(true),
            reason: Some(reason.into()),
            stdout: None,
            stderr: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// ReviewTier
// ---------------------------------------------------------------------------

/// Coarse review-depth classification from aggregate change volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTier {
    Quick,
    Standard,
    Deep,
}

impl ReviewTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewTier::Quick => "quick",
            ReviewTier::Standard => "standard",
            ReviewTier::Deep => "deep",
        }
    }
}

impl fmt::Display for ReviewTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_change_invariant() {
        let c = FileChange::new("src/main.rs", 3, 2);
        assert_eq!(c.lines_changed, c.lines_added + c.lines_deleted);
    }

    #[test]
    fn raw_tool_result_serde_field_names() {
        let r = RawToolResult {
            check_type: CheckType::Linting,
            tool: "eslint".to_string(),
            success: Some(false),
            skipped: None,
            reason: None,
            stdout: Some("[]".to_string()),
            stderr: None,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"type\":\"linting\""));
        assert!(json.contains("\"tool\":\"eslint\""));
        assert!(!json.contains("skipped"));
        let parsed: RawToolResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn skipped_constructor() {
        let r = RawToolResult::skipped(CheckType::Testing, "jest", "not installed");
        assert!(r.is_skipped());
        assert_eq!(r.success, None);
        assert_eq!(r.reason.as_deref(), Some("not installed"));
    }

    #[test]
    fn tier_ordering() {
        assert!(ReviewTier::Quick < ReviewTier::Standard);
        assert!(ReviewTier::Standard < ReviewTier::Deep);
    }

    #[test]
    fn check_type_serde() {
        let json = serde_json::to_string(&CheckType::TypeChecking).unwrap();
        assert_eq!(json, "\"type_checking\"");
    }
}
