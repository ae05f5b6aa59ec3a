//! Pending-change measurement for a git working tree.
//!
//! Staged and unstaged `--numstat` listings are parsed and merged so each
//! path appears exactly once, with line counts summed for files present in
//! both sets. Deleted files are excluded (`--diff-filter=d`) because later
//! pipeline stages read file contents.

use crate::error::{ReviewError, Result};
use crate::types::FileChange;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

fn rename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*)\{(.*) => (.*)\}(.*)$").expect("valid rename regex"))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute per-file added/deleted/changed line counts for all pending
/// modifications (staged + unstaged) under `root`.
///
/// Fails if `root` is not inside a git working tree or git cannot be run.
pub fn changed_files(root: &Path) -> Result<Vec<FileChange>> {
    let staged = numstat(root, true)?;
    let unstaged = numstat(root, false)?;

    let mut merged: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for (path, added, deleted) in staged.into_iter().chain(unstaged) {
        let entry = merged.entry(path).or_insert((0, 0));
        entry.0 += added;
        entry.1 += deleted;
    }

    Ok(merged
        .into_iter()
        .map(|(path, (added, deleted))| FileChange::new(path, added, deleted))
        .collect())
}

/// Like [`changed_files`], restricted to paths in `scope`. An empty scope
/// means no restriction.
pub fn changed_files_scoped(root: &Path, scope: &[String]) -> Result<Vec<FileChange>> {
    let mut changes = changed_files(root)?;
    if !scope.is_empty() {
        changes.retain(|c| scope.iter().any(|s| paths_match(&c.path, s)));
    }
    Ok(changes)
}

fn paths_match(a: &str, b: &str) -> bool {
    let a = a.strip_prefix("./").unwrap_or(a);
    let b = b.strip_prefix("./").unwrap_or(b);
    a == b || a.starts_with(&format!("{b}/"))
}

// ---------------------------------------------------------------------------
// Numstat invocation and parsing
// ---------------------------------------------------------------------------

fn numstat(root: &Path, staged: bool) -> Result<Vec<(String, u32, u32)>> {
    let mut cmd = Command::new("git");
    cmd.current_dir(root).args(["diff", "--numstat", "--diff-filter=d"]);
    if staged {
        cmd.arg("--cached");
    }

    let output = cmd
        .output()
        .map_err(|e| ReviewError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            return Err(ReviewError::NotARepository(root.display().to_string()));
        }
        return Err(ReviewError::Git(stderr.trim().to_string()));
    }

    Ok(parse_numstat(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `git diff --numstat` output.
///
/// Each line is `added<TAB>deleted<TAB>path`; `-` counts (binary files)
/// become 0. Lines that don't match the 3-field form are logged and skipped.
pub(crate) fn parse_numstat(output: &str) -> Vec<(String, u32, u32)> {
    let mut entries = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) =
            (fields.next(), fields.next(), fields.next())
        else {
            tracing::warn!(line, "skipping malformed numstat line");
            continue;
        };
        entries.push((
            resolve_rename(path),
            parse_count(added),
            parse_count(deleted),
        ));
    }
    entries
}

fn parse_count(field: &str) -> u32 {
    // "-" marks a binary file
    if field == "-" {
        return 0;
    }
    field.parse().unwrap_or_else(|_| {
        tracing::warn!(field, "non-numeric numstat count treated as 0");
        0
    })
}

/// Resolve git's rename notation to the canonical new path.
///
/// `src/{old.ts => new.ts}` becomes `src/new.ts`; the whole-path form
/// `old.ts => new.ts` becomes `new.ts`. Double slashes from an empty
/// segment (`{ => sub}/f.ts`) are collapsed.
pub(crate) fn resolve_rename(path: &str) -> String {
    if let Some(caps) = rename_re().captures(path) {
        let joined = format!("{}{}{}", &caps[1], &caps[3], &caps[4]);
        return joined.replace("//", "/");
    }
    if let Some((_, new)) = path.split_once(" => ") {
        return new.to_string();
    }
    path.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn init_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.email", "test@test"]);
        git(dir.path(), &["config", "user.name", "test"]);
        dir
    }

    #[test]
    fn parse_numstat_basic() {
        let entries = parse_numstat("3\t1\tsrc/a.ts\n10\t0\tsrc/b.ts\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("src/a.ts".to_string(), 3, 1));
        assert_eq!(entries[1], ("src/b.ts".to_string(), 10, 0));
    }

    #[test]
    fn parse_numstat_binary_dashes() {
        let entries = parse_numstat("-\t-\tbinary.png\n");
        assert_eq!(entries, vec![("binary.png".to_string(), 0, 0)]);
    }

    #[test]
    fn parse_numstat_skips_malformed_lines() {
        let entries = parse_numstat("garbage without tabs\n2\t2\tok.ts\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "ok.ts");
    }

    #[test]
    fn rename_brace_form() {
        assert_eq!(resolve_rename("src/{old.ts => new.ts}"), "src/new.ts");
        assert_eq!(
            resolve_rename("src/{utils => helpers}/math.ts"),
            "src/helpers/math.ts"
        );
    }

    #[test]
    fn rename_whole_path_form() {
        assert_eq!(resolve_rename("old.ts => new.ts"), "new.ts");
    }

    #[test]
    fn rename_empty_old_segment() {
        assert_eq!(resolve_rename("src/{ => sub}/f.ts"), "src/sub/f.ts");
        assert_eq!(resolve_rename("src/{sub => }/f.ts"), "src/f.ts");
    }

    #[test]
    fn plain_path_untouched() {
        assert_eq!(resolve_rename("src/plain.ts"), "src/plain.ts");
    }

    #[test]
    fn changed_files_merges_staged_and_unstaged() {
        let dir = init_repo();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "one\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        // Staged: +3 -1 (replace the single line with three new ones... use
        // content edits that produce known counts)
        std::fs::write(&file, "uno\ntwo\nthree\n").unwrap();
        git(dir.path(), &["add", "."]);
        // Unstaged on top: +2 -0
        std::fs::write(&file, "uno\ntwo\nthree\nfour\nfive\n").unwrap();

        let changes = changed_files(dir.path()).unwrap();
        assert_eq!(changes.len(), 1);
        let c = &changes[0];
        assert_eq!(c.path, "a.txt");
        assert_eq!(c.lines_added, 5);
        assert_eq!(c.lines_deleted, 1);
        assert_eq!(c.lines_changed, 6);
    }

    #[test]
    fn changed_files_excludes_deleted() {
        let dir = init_repo();
        std::fs::write(dir.path().join("gone.txt"), "x\n").unwrap();
        std::fs::write(dir.path().join("kept.txt"), "y\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        std::fs::remove_file(dir.path().join("gone.txt")).unwrap();
        std::fs::write(dir.path().join("kept.txt"), "y\nz\n").unwrap();

        let changes = changed_files(dir.path()).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "kept.txt");
    }

    #[test]
    fn not_a_repository_errors() {
        let dir = TempDir::new().unwrap();
        let err = changed_files(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::NotARepository(_) | ReviewError::Git(_)
        ));
    }

    #[test]
    fn scoped_filters_to_requested_paths() {
        let dir = init_repo();
        std::fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "y\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        std::fs::write(dir.path().join("a.txt"), "x\nmore\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "y\nmore\n").unwrap();

        let changes = changed_files_scoped(dir.path(), &["a.txt".to_string()]).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "a.txt");
    }
}
