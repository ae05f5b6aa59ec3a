//! Parallel execution of external quality-check tools.
//!
//! Each tool runs as its own task and writes its own `RawToolResult` slot;
//! results are merged only after all tasks complete. A tool crashing,
//! missing, or timing out is recorded in its result, never thrown — one bad
//! tool must not prevent reviewing with the rest. Dropping the returned
//! future cancels all in-flight processes (`kill_on_drop`).

use crate::registry::{validate_command, ToolDefinition, ToolRegistry};
use crate::types::RawToolResult;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::task::JoinSet;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every registered tool against `files` under `root`, in parallel.
///
/// Returns one result per tool, in registry order. All failures are
/// embedded in the results (`skipped` / `success:false` with a reason).
pub async fn run_checks(
    registry: &ToolRegistry,
    root: &Path,
    files: &[String],
) -> Vec<RawToolResult> {
    let mut set = JoinSet::new();
    for (index, tool) in registry.tools.iter().enumerate() {
        let tool = tool.clone();
        let root = root.to_path_buf();
        let files = files.to_vec();
        set.spawn(async move { (index, run_one(&tool, &root, &files).await) });
    }

    let mut slots: Vec<Option<RawToolResult>> = vec![None; registry.tools.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => tracing::warn!(error = %e, "tool task panicked"),
        }
    }

    registry
        .tools
        .iter()
        .zip(slots)
        .map(|(tool, slot)| {
            slot.unwrap_or_else(|| {
                RawToolResult::skipped(tool.check_type, &tool.name, "tool task failed")
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Single tool
// ---------------------------------------------------------------------------

async fn run_one(tool: &ToolDefinition, root: &PathBuf, files: &[String]) -> RawToolResult {
    if let Err(e) = validate_command(&tool.command) {
        tracing::warn!(tool = %tool.name, "command rejected by deny-list");
        return RawToolResult::skipped(tool.check_type, &tool.name, e.to_string());
    }

    let argv = match tool.argv(files) {
        Ok(argv) => argv,
        Err(e) => return RawToolResult::skipped(tool.check_type, &tool.name, e.to_string()),
    };

    if which::which(&argv[0]).is_err() {
        return RawToolResult::skipped(
            tool.check_type,
            &tool.name,
            format!("{} is not installed", argv[0]),
        );
    }

    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..])
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let timeout = Duration::from_secs(tool.timeout_seconds);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            tracing::warn!(tool = %tool.name, seconds = tool.timeout_seconds, "tool timed out");
            return RawToolResult {
                check_type: tool.check_type,
                tool: tool.name.clone(),
                success: Some(false),
                skipped: None,
                reason: Some(format!("timed out after {}s", tool.timeout_seconds)),
                stdout: None,
                stderr: None,
            };
        }
        Ok(Err(e)) => {
            return RawToolResult {
                check_type: tool.check_type,
                tool: tool.name.clone(),
                success: Some(false),
                skipped: None,
                reason: Some(format!("failed to spawn: {e}")),
                stdout: None,
                stderr: None,
            };
        }
        Ok(Ok(output)) => output,
    };

    let success = output.status.success();
    let reason = if success {
        None
    } else {
        Some(match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        })
    };

    RawToolResult {
        check_type: tool.check_type,
        tool: tool.name.clone(),
        success: Some(success),
        skipped: None,
        reason,
        stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckType;
    use tempfile::TempDir;

    fn tool(name: &str, command: &str, timeout_seconds: u64) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            check_type: CheckType::Linting,
            command: command.to_string(),
            fix_command: None,
            timeout_seconds,
        }
    }

    fn registry(tools: Vec<ToolDefinition>) -> ToolRegistry {
        ToolRegistry { tools }
    }

    #[tokio::test]
    async fn captures_stdout_of_successful_tool() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("echo-check", "echo hello", 10)]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].success, Some(true));
        assert_eq!(results[0].stdout.as_deref().map(str::trim), Some("hello"));
        assert!(results[0].reason.is_none());
    }

    #[tokio::test]
    async fn nonzero_exit_is_captured_not_thrown() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("false-check", "false", 10)]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        assert_eq!(results[0].success, Some(false));
        assert!(results[0].reason.as_deref().unwrap().contains("exit code"));
    }

    #[tokio::test]
    async fn missing_binary_is_skipped() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("ghost", "definitely-not-a-real-binary-xyz", 10)]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        assert!(results[0].is_skipped());
        assert!(results[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("not installed"));
    }

    #[tokio::test]
    async fn denied_command_is_skipped() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("evil", "echo hi; rm -rf /", 10)]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        assert!(results[0].is_skipped());
    }

    #[tokio::test]
    async fn timeout_is_recorded_as_failure() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("slow", "sleep 30", 1)]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        assert_eq!(results[0].success, Some(false));
        assert!(results[0].reason.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn results_preserve_registry_order() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![
            tool("first", "echo one", 10),
            tool("second", "echo two", 10),
            tool("third", "echo three", 10),
        ]);
        let results = run_checks(&reg, dir.path(), &[]).await;
        let names: Vec<&str> = results.iter().map(|r| r.tool.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn files_are_substituted_into_argv() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![tool("echo-files", "echo {files}", 10)]);
        let files = vec!["src/a.ts".to_string(), "src/b.ts".to_string()];
        let results = run_checks(&reg, dir.path(), &files).await;
        assert_eq!(
            results[0].stdout.as_deref().map(str::trim),
            Some("src/a.ts src/b.ts")
        );
    }
}
