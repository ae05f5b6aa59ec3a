//! The review pipeline orchestrator.
//!
//! Sequences the analyzers: gather changes, classify tier, build the
//! context manifest, run external tools, optionally select critical files,
//! enrich tool results, and package everything as `ReviewFindings`. This is
//! the only module with knowledge of all the others. The engine never exits
//! the process; every failure is a typed error or embedded in the results.

use crate::changeset;
use crate::config::ReviewConfig;
use crate::error::Result;
use crate::imports;
use crate::manifest::{self, ContextManifest};
use crate::registry::ToolRegistry;
use crate::runner;
use crate::selector::{self, CriticalFilesReport, SelectorOptions};
use crate::tier::{self, TierRecommendation};
use crate::types::{RawToolResult, ReviewTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Options and findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Paths restricting the review; empty means the whole change set.
    pub scope: Vec<String>,
    /// When false, critical-file selection and its report are omitted
    /// entirely from the findings.
    pub enable_critical_selection: bool,
}

/// A raw tool result enriched for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedToolResult {
    #[serde(flatten)]
    pub raw: RawToolResult,
    /// True iff the tool's registry definition declares a fix command.
    pub auto_fixable: bool,
    /// stdout and stderr combined, empty segments trimmed away.
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub scope: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub tier: ReviewTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFindings {
    pub raw_tool_results: Vec<RawToolResult>,
    pub tool_results: Vec<EnrichedToolResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_files: Option<CriticalFilesReport>,
    pub manifest: ContextManifest,
    pub metadata: ReviewMetadata,
    pub tier_recommendation: TierRecommendation,
}

// ---------------------------------------------------------------------------
// ReviewEngine
// ---------------------------------------------------------------------------

pub struct ReviewEngine {
    root: PathBuf,
    config: ReviewConfig,
    registry: ToolRegistry,
}

impl ReviewEngine {
    /// The registry is injected here rather than read from global state so
    /// callers and tests can substitute their own.
    pub fn new(root: PathBuf, config: ReviewConfig, registry: ToolRegistry) -> Self {
        Self {
            root,
            config,
            registry,
        }
    }

    pub fn with_defaults(root: PathBuf) -> Result<Self> {
        let config = ReviewConfig::load(&root)?;
        let registry = config.registry();
        Ok(Self::new(root, config, registry))
    }

    /// Run the full pipeline over the scoped change set.
    pub async fn analyze_files(&self, options: &ReviewOptions) -> Result<ReviewFindings> {
        let changes = changeset::changed_files_scoped(&self.root, &options.scope)?;
        let changed_paths: Vec<String> = changes.iter().map(|c| c.path.clone()).collect();

        let tier_recommendation = tier::classify_changes(&changes);
        let tier = tier_recommendation.tier;

        let manifest = manifest::build_manifest(&self.root, &changed_paths, tier);

        let raw_tool_results =
            runner::run_checks(&self.registry, &self.root, &changed_paths).await;

        let critical_files = if options.enable_critical_selection {
            let fan_in = imports::analyze_fan_in(&self.root);
            Some(selector::select_critical_files(
                &changes,
                &raw_tool_results,
                &fan_in,
                &SelectorOptions {
                    max_files: self.config.max_files,
                    configured_critical_paths: self.config.critical_paths.clone(),
                },
            ))
        } else {
            None
        };

        let tool_results = raw_tool_results
            .iter()
            .map(|raw| self.enrich(raw))
            .collect();

        Ok(ReviewFindings {
            raw_tool_results,
            tool_results,
            critical_files,
            manifest,
            metadata: ReviewMetadata {
                scope: options.scope.clone(),
                timestamp: Utc::now(),
                tier,
            },
            tier_recommendation,
        })
    }

    fn enrich(&self, raw: &RawToolResult) -> EnrichedToolResult {
        let output = [raw.stdout.as_deref(), raw.stderr.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        EnrichedToolResult {
            raw: raw.clone(),
            auto_fixable: self.registry.auto_fixable(&raw.tool),
            output,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
