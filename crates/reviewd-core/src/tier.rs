use crate::types::{FileChange, ReviewTier};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

const QUICK_MAX_FILES: usize = 2;
const QUICK_MAX_LINES: u32 = 50;
const DEEP_MIN_FILES: usize = 11;
const DEEP_MIN_LINES: u32 = 501;

// ---------------------------------------------------------------------------
// TierRecommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRecommendation {
    pub tier: ReviewTier,
    pub total_files: usize,
    pub total_lines_changed: u32,
    pub reason: String,
}

/// Bucket aggregate change volume into a review-depth tier.
/// Purely a threshold lookup, no state.
pub fn classify_changes(changes: &[FileChange]) -> TierRecommendation {
    let total_files = changes.len();
    let total_lines_changed: u32 = changes.iter().map(|c| c.lines_changed).sum();

    let (tier, reason) = if total_files >= DEEP_MIN_FILES || total_lines_changed >= DEEP_MIN_LINES {
        (
            ReviewTier::Deep,
            format!("{total_files} files / {total_lines_changed} lines warrant a deep review"),
        )
    } else if total_files <= QUICK_MAX_FILES && total_lines_changed <= QUICK_MAX_LINES {
        (
            ReviewTier::Quick,
            format!("{total_files} files / {total_lines_changed} lines fit a quick review"),
        )
    } else {
        (
            ReviewTier::Standard,
            format!("{total_files} files / {total_lines_changed} lines fit a standard review"),
        )
    };

    TierRecommendation {
        tier,
        total_files,
        total_lines_changed,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
