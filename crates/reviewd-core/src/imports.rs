//! Static import-graph scan producing a fan-in count per file.
//!
//! Fan-in (how many other files import a given file) is used as an
//! architectural-impact proxy by the critical-file selector. Only relative
//! import targets are resolved; bare and aliased module specifiers are
//! skipped. This is a known precision limit, not an error — the
//! architecturally significant imports in the target codebases are relative.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Extensions treated as source files, in resolution priority order.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

/// Directories never scanned: dependencies, build output, VCS internals,
/// and test trees.
const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "vendor",
    "__tests__",
    "__mocks__",
    ".git",
];

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `import ... from '...'` and `export ... from '...'`
    RE.get_or_init(|| Regex::new(r#"from\s+['"]([^'"]+)['"]"#).expect("valid import regex"))
}

fn require_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid require regex"))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a fan-in histogram for all source files under `root`.
///
/// Keys are root-relative paths with `/` separators. Never fails: a missing
/// or empty root yields an empty map.
pub fn analyze_fan_in(root: &Path) -> HashMap<String, usize> {
    let mut fan_in = HashMap::new();
    let mut sources = Vec::new();
    collect_sources(root, &mut sources);

    for source in &sources {
        let Ok(content) = std::fs::read_to_string(source) else {
            tracing::debug!(path = %source.display(), "unreadable source file skipped");
            continue;
        };
        // Each importer contributes at most one count per target.
        let mut targets = HashSet::new();
        for spec in import_specifiers(&content) {
            if let Some(resolved) = resolve_relative(source, &spec) {
                if let Some(rel) = relative_key(root, &resolved) {
                    targets.insert(rel);
                }
            }
        }
        for target in targets {
            *fan_in.entry(target).or_insert(0) += 1;
        }
    }
    fan_in
}

// ---------------------------------------------------------------------------
// Source enumeration
// ---------------------------------------------------------------------------

fn collect_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if !IGNORED_DIRS.contains(&name.as_ref()) && !name.starts_with('.') {
                collect_sources(&path, out);
            }
        } else if is_source_file(&name) && !is_test_file(&name) {
            out.push(path);
        }
    }
}

fn is_source_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_test_file(name: &str) -> bool {
    name.contains(".test.") || name.contains(".spec.")
}

// ---------------------------------------------------------------------------
// Extraction and resolution
// ---------------------------------------------------------------------------

fn import_specifiers(content: &str) -> Vec<String> {
    let mut specs = Vec::new();
    for caps in import_re().captures_iter(content) {
        specs.push(caps[1].to_string());
    }
    for caps in require_re().captures_iter(content) {
        specs.push(caps[1].to_string());
    }
    specs
}

/// Resolve a relative import specifier against the importing file's
/// directory: the path as-is, then with each source extension appended,
/// then as a directory index file. First existing candidate wins.
/// Non-relative specifiers return None.
fn resolve_relative(importer: &Path, spec: &str) -> Option<PathBuf> {
    if !spec.starts_with("./") && !spec.starts_with("../") {
        return None;
    }
    let dir = importer.parent()?;
    let base = normalize(&dir.join(spec));

    if base.is_file() {
        return Some(base);
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{ext}", base.display()));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = base.join(format!("index.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Lexically normalize `.` and `..` components without touching the
/// filesystem, so candidate paths compare cleanly against root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(normalize(root)).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_root_yields_empty_map() {
        let map = analyze_fan_in(Path::new("/nonexistent/project"));
        assert!(map.is_empty());
    }

    #[test]
    fn counts_relative_imports() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/util.ts", "export const x = 1;\n");
        write(dir.path(), "src/a.ts", "import { x } from './util';\n");
        write(dir.path(), "src/b.ts", "import { x } from './util';\n");

        let map = analyze_fan_in(dir.path());
        assert_eq!(map.get("src/util.ts"), Some(&2));
    }

    #[test]
    fn require_and_parent_relative() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/lib/core.ts", "export {};\n");
        write(
            dir.path(),
            "src/app/main.ts",
            "const core = require('../lib/core');\n",
        );

        let map = analyze_fan_in(dir.path());
        assert_eq!(map.get("src/lib/core.ts"), Some(&1));
    }

    #[test]
    fn directory_index_resolution() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/lib/index.ts", "export {};\n");
        write(dir.path(), "src/main.ts", "import lib from './lib';\n");

        let map = analyze_fan_in(dir.path());
        assert_eq!(map.get("src/lib/index.ts"), Some(&1));
    }

    #[test]
    fn bare_imports_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/main.ts", "import fs from 'fs';\nimport x from 'lodash';\n");

        let map = analyze_fan_in(dir.path());
        assert!(map.is_empty());
    }

    #[test]
    fn one_count_per_importing_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/util.ts", "export {};\n");
        write(
            dir.path(),
            "src/a.ts",
            "import { x } from './util';\nimport { y } from './util';\n",
        );

        let map = analyze_fan_in(dir.path());
        assert_eq!(map.get("src/util.ts"), Some(&1));
    }

    #[test]
    fn ignored_dirs_and_test_files_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/util.ts", "export {};\n");
        write(
            dir.path(),
            "node_modules/dep/main.ts",
            "import x from '../../src/util';\n",
        );
        write(
            dir.path(),
            "src/util.test.ts",
            "import { x } from './util';\n",
        );

        let map = analyze_fan_in(dir.path());
        assert!(map.is_empty(), "only ignored importers exist: {map:?}");
    }

    #[test]
    fn unresolved_relative_import_is_dropped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/a.ts", "import { x } from './missing';\n");

        let map = analyze_fan_in(dir.path());
        assert!(map.is_empty());
    }
}
