//! Normalization of heterogeneous quality-tool output into one
//! `Diagnostic` taxonomy.
//!
//! Each supported tool has its own parser behind a closed dispatch table.
//! Unknown tools produce zero diagnostics plus a logged warning, and
//! malformed structured output is swallowed at the parser boundary — one
//! bad tool must never fail the whole pipeline.

use crate::severity::Severity;
use crate::types::{Diagnostic, RawToolResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn typecheck_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // e.g. `src/api.ts(42,7): error TS2322: Type 'string' is not assignable`
    RE.get_or_init(|| {
        Regex::new(r"^(.+)\((\d+),(\d+)\): (error|warning) ([A-Za-z]+\d+): (.+)$")
            .expect("valid typecheck regex")
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The distinct output formats the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// `file(line,col): error CODE: message` lines (tsc).
    Typecheck,
    /// ESLint's `--format json` array.
    EslintJson,
    /// One file path per line, each meaning "needs reformatting" (prettier).
    PathList,
    /// Jest's `--json` object with `testResults[].assertionResults[]`.
    JestJson,
}

fn format_for_tool(tool: &str) -> Option<OutputFormat> {
    match tool {
        "tsc" | "typescript" => Some(OutputFormat::Typecheck),
        "eslint" => Some(OutputFormat::EslintJson),
        "prettier" => Some(OutputFormat::PathList),
        "jest" | "vitest" => Some(OutputFormat::JestJson),
        _ => None,
    }
}

/// Parse one raw tool result into normalized diagnostics.
///
/// Unrecognized tools yield an empty list (logged, non-fatal).
pub fn parse(raw: &RawToolResult) -> Vec<Diagnostic> {
    let Some(format) = format_for_tool(&raw.tool) else {
        tracing::warn!(tool = %raw.tool, "no parser registered for tool; producing no diagnostics");
        return Vec::new();
    };
    let stdout = raw.stdout.as_deref().unwrap_or("");
    let stderr = raw.stderr.as_deref().unwrap_or("");
    match format {
        // Line-oriented formats may arrive on either stream.
        OutputFormat::Typecheck => {
            let mut diags = parse_typecheck(stdout, &raw.tool);
            diags.extend(parse_typecheck(stderr, &raw.tool));
            diags
        }
        OutputFormat::PathList => parse_path_list(stdout, &raw.tool),
        OutputFormat::EslintJson => parse_eslint_json(stdout, &raw.tool),
        OutputFormat::JestJson => parse_jest_json(stdout, &raw.tool),
    }
}

// ---------------------------------------------------------------------------
// Type-checker format
// ---------------------------------------------------------------------------

fn parse_typecheck(output: &str, tool: &str) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for line in output.lines() {
        let Some(caps) = typecheck_re().captures(line.trim_end()) else {
            continue;
        };
        let severity = match &caps[4] {
            "error" => Severity::Blocker,
            _ => Severity::Minor,
        };
        diags.push(Diagnostic {
            severity,
            message: caps[6].to_string(),
            file: Some(caps[1].to_string()),
            line: caps[2].parse().ok(),
            column: caps[3].parse().ok(),
            tool: tool.to_string(),
            rule: Some(caps[5].to_string()),
        });
    }
    diags
}

// ---------------------------------------------------------------------------
// Linter format (ESLint JSON)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EslintFile {
    #[serde(rename = "filePath")]
    file_path: String,
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Deserialize)]
struct EslintMessage {
    #[serde(default)]
    severity: u8,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default, rename = "ruleId")]
    rule_id: Option<String>,
}

fn parse_eslint_json(output: &str, tool: &str) -> Vec<Diagnostic> {
    let files: Vec<EslintFile> = match serde_json::from_str(output) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(tool, error = %e, "malformed linter JSON; producing no diagnostics");
            return Vec::new();
        }
    };
    let mut diags = Vec::new();
    for file in files {
        for msg in file.messages {
            let severity = match msg.severity {
                2 => Severity::Critical,
                1 => Severity::Major,
                _ => Severity::Info,
            };
            diags.push(Diagnostic {
                severity,
                message: msg.message,
                file: Some(file.file_path.clone()),
                line: msg.line,
                column: msg.column,
                tool: tool.to_string(),
                rule: msg.rule_id,
            });
        }
    }
    diags
}

// ---------------------------------------------------------------------------
// Formatter format
// ---------------------------------------------------------------------------

fn parse_path_list(output: &str, tool: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|path| Diagnostic {
            severity: Severity::Minor,
            message: format!("{path} needs reformatting"),
            file: Some(path.to_string()),
            line: None,
            column: None,
            tool: tool.to_string(),
            rule: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Test-runner format (Jest JSON)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JestReport {
    #[serde(default, rename = "testResults")]
    test_results: Vec<JestTestFile>,
}

#[derive(Deserialize)]
struct JestTestFile {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "assertionResults")]
    assertion_results: Vec<JestAssertion>,
}

#[derive(Deserialize)]
struct JestAssertion {
    #[serde(default)]
    status: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "failureMessages")]
    failure_messages: Vec<String>,
}

fn parse_jest_json(output: &str, tool: &str) -> Vec<Diagnostic> {
    let report: JestReport = match serde_json::from_str(output) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(tool, error = %e, "malformed test-runner JSON; producing no diagnostics");
            return Vec::new();
        }
    };
    let mut diags = Vec::new();
    for file in report.test_results {
        for assertion in file.assertion_results {
            if assertion.status != "failed" {
                continue;
            }
            let message = if assertion.failure_messages.is_empty() {
                format!("test failed: {}", assertion.title)
            } else {
                assertion.failure_messages.join("\n")
            };
            diags.push(Diagnostic {
                severity: Severity::Critical,
                message,
                file: Some(file.name.clone()),
                line: None,
                column: None,
                tool: tool.to_string(),
                rule: None,
            });
        }
    }
    diags
}

// ---------------------------------------------------------------------------
// Scope filtering
// ---------------------------------------------------------------------------

/// True if a diagnostic's file refers to one of the in-scope paths.
///
/// Matches by exact equality or suffix after stripping a leading `./` from
/// both sides, which reconciles absolute tool paths with relative scope
/// paths.
pub fn file_in_scope(file: &str, scope: &[String]) -> bool {
    let file = file.strip_prefix("./").unwrap_or(file);
    scope.iter().any(|s| {
        let s = s.strip_prefix("./").unwrap_or(s);
        file == s || file.ends_with(&format!("/{s}")) || s.ends_with(&format!("/{file}"))
    })
}

/// Restrict diagnostics to a caller-supplied set of in-scope file paths.
/// Diagnostics without a file are kept.
pub fn filter_to_scope(diags: Vec<Diagnostic>, scope: &[String]) -> Vec<Diagnostic> {
    diags
        .into_iter()
        .filter(|d| match &d.file {
            Some(file) => file_in_scope(file, scope),
            None => true,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub total_issues: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    /// Rounded percentage of non-skipped checks that produced zero
    /// diagnostics. Defined as 100 when no checks ran.
    pub pass_rate: u32,
    pub checks_run: usize,
    pub checks_passed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub summary: DiagnosticSummary,
    pub issues: Vec<Diagnostic>,
}

/// Aggregate raw tool results into one report.
///
/// Skipped results are excluded from all accounting. A check passes iff it
/// produced zero diagnostics after optional scope filtering.
pub fn aggregate(results: &[RawToolResult], scope: Option<&[String]>) -> DiagnosticReport {
    let mut issues = Vec::new();
    let mut checks_run = 0;
    let mut checks_passed = 0;

    for raw in results {
        if raw.is_skipped() {
            continue;
        }
        checks_run += 1;
        let mut diags = parse(raw);
        if let Some(scope) = scope {
            diags = filter_to_scope(diags, scope);
        }
        if diags.is_empty() {
            checks_passed += 1;
        }
        issues.extend(diags);
    }

    let pass_rate = if checks_run == 0 {
        100
    } else {
        (checks_passed as f64 / checks_run as f64 * 100.0).round() as u32
    };

    let mut by_severity = BTreeMap::new();
    for issue in &issues {
        *by_severity.entry(issue.severity).or_insert(0) += 1;
    }

    DiagnosticReport {
        summary: DiagnosticSummary {
            total_issues: issues.len(),
            by_severity,
            pass_rate,
            checks_run,
            checks_passed,
        },
        issues,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
