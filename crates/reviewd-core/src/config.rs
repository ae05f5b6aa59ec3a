use crate::error::Result;
use crate::registry::{ToolDefinition, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = ".reviewd.yaml";

// ---------------------------------------------------------------------------
// ReviewConfig
// ---------------------------------------------------------------------------

/// Project-level configuration loaded from `.reviewd.yaml` at the root.
/// Every field has a default; a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Maximum entries in the critical-files top list.
    pub max_files: usize,
    /// Paths the project declares review-critical regardless of score.
    pub critical_paths: Vec<String>,
    /// Tool registry override; omitted means the built-in defaults.
    pub tools: Option<Vec<ToolDefinition>>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_files: 5,
            critical_paths: Vec::new(),
            tools: None,
        }
    }
}

impl ReviewConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// The tool registry this configuration implies.
    pub fn registry(&self) -> ToolRegistry {
        match &self.tools {
            Some(tools) => ToolRegistry {
                tools: tools.clone(),
            },
            None => ToolRegistry::default(),
        }
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

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ReviewConfig::load(dir.path()).unwrap();
        assert_eq!(config, ReviewConfig::default());
        assert_eq!(config.max_files, 5);
    }

    #[test]
    fn loads_partial_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "max_files: 10\ncritical_paths:\n  - src/auth/\n",
        )
        .unwrap();
        let config = ReviewConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_files, 10);
        assert_eq!(config.critical_paths, vec!["src/auth/".to_string()]);
        assert!(config.tools.is_none());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "max_files: [not a number").unwrap();
        assert!(ReviewConfig::load(dir.path()).is_err());
    }

    #[test]
    fn tool_override_replaces_registry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "tools:\n  - name: eslint\n    check_type: linting\n    command: eslint --format json {files}\n",
        )
        .unwrap();
        let config = ReviewConfig::load(dir.path()).unwrap();
        let registry = config.registry();
        assert_eq!(registry.tools.len(), 1);
        assert_eq!(registry.tools[0].name, "eslint");
        assert_eq!(registry.tools[0].check_type, CheckType::Linting);
    }

    #[test]
    fn default_registry_when_no_override() {
        let config = ReviewConfig::default();
        assert_eq!(config.registry(), ToolRegistry::default());
    }
}
