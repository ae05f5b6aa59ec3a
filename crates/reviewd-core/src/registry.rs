//! The registry of external quality-check tools.
//!
//! The registry is an explicit configuration value handed to the engine at
//! construction time, never process-wide state, so tests can substitute
//! fake registries. Command strings pass a shell-metacharacter deny-list
//! before execution as defense-in-depth, even though the registry is
//! nominally trusted.

use crate::error::{ReviewError, Result};
use crate::types::CheckType;
use serde::{Deserialize, Serialize};

/// Shell metacharacters never allowed in a registry command.
const DENIED_CHARS: &[char] = &[';', '&', '|', '`', '$', '(', ')', '<'];

/// Placeholder in a command template replaced by the target file list.
pub const FILES_PLACEHOLDER: &str = "{files}";

// ---------------------------------------------------------------------------
// ToolDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub check_type: CheckType,
    /// Command template; `{files}` expands to the target file list.
    pub command: String,
    /// Command that applies automatic fixes, when the tool has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_command: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    120
}

impl ToolDefinition {
    /// True iff the tool declares a fix command.
    pub fn auto_fixable(&self) -> bool {
        self.fix_command.is_some()
    }

    /// Split the command template into argv, substituting the file list.
    /// The command string must already have passed [`validate_command`].
    pub fn argv(&self, files: &[String]) -> Result<Vec<String>> {
        let mut argv = Vec::new();
        for token in self.command.split_whitespace() {
            if token == FILES_PLACEHOLDER {
                argv.extend(files.iter().cloned());
            } else {
                argv.push(token.to_string());
            }
        }
        if argv.is_empty() {
            return Err(ReviewError::EmptyCommand(self.name.clone()));
        }
        Ok(argv)
    }
}

/// Reject command strings containing shell metacharacters.
pub fn validate_command(command: &str) -> Result<()> {
    if command.contains(DENIED_CHARS) {
        return Err(ReviewError::UnsafeCommand(command.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ToolRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRegistry {
    pub tools: Vec<ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: vec![
                ToolDefinition {
                    name: "tsc".to_string(),
                    check_type: CheckType::TypeChecking,
                    command: "tsc --noEmit --pretty false".to_string(),
                    fix_command: None,
                    timeout_seconds: default_timeout(),
                },
                ToolDefinition {
                    name: "eslint".to_string(),
                    check_type: CheckType::Linting,
                    command: "eslint --format json {files}".to_string(),
                    fix_command: Some("eslint --fix {files}".to_string()),
                    timeout_seconds: default_timeout(),
                },
                ToolDefinition {
                    name: "prettier".to_string(),
                    check_type: CheckType::Formatting,
                    command: "prettier --list-different {files}".to_string(),
                    fix_command: Some("prettier --write {files}".to_string()),
                    timeout_seconds: default_timeout(),
                },
                ToolDefinition {
                    name: "jest".to_string(),
                    check_type: CheckType::Testing,
                    command: "jest --json --silent".to_string(),
                    fix_command: None,
                    timeout_seconds: 300,
                },
            ],
        }
    }
}

impl ToolRegistry {
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// True iff a registered tool of that name declares a fix command.
    pub fn auto_fixable(&self, name: &str) -> bool {
        self.get(name).is_some_and(ToolDefinition::auto_fixable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_all_check_types() {
        let registry = ToolRegistry::default();
        for check_type in [
            CheckType::TypeChecking,
            CheckType::Linting,
            CheckType::Testing,
            CheckType::Formatting,
        ] {
            assert!(
                registry.tools.iter().any(|t| t.check_type == check_type),
                "missing {check_type}"
            );
        }
    }

    #[test]
    fn deny_list_rejects_metacharacters() {
        for cmd in [
            "eslint; rm -rf /",
            "tsc && curl evil",
            "jest | tee out",
            "prettier `id`",
            "tsc $(id)",
            "cat < /etc/passwd",
        ] {
            assert!(validate_command(cmd).is_err(), "accepted: {cmd}");
        }
    }

    #[test]
    fn deny_list_accepts_plain_commands() {
        assert!(validate_command("eslint --format json {files}").is_ok());
        assert!(validate_command("tsc --noEmit").is_ok());
    }

    #[test]
    fn argv_substitutes_files() {
        let tool = ToolRegistry::default().get("eslint").unwrap().clone();
        let argv = tool
            .argv(&["src/a.ts".to_string(), "src/b.ts".to_string()])
            .unwrap();
        assert_eq!(
            argv,
            vec!["eslint", "--format", "json", "src/a.ts", "src/b.ts"]
        );
    }

    #[test]
    fn argv_without_placeholder_ignores_files() {
        let tool = ToolRegistry::default().get("tsc").unwrap().clone();
        let argv = tool.argv(&["src/a.ts".to_string()]).unwrap();
        assert_eq!(argv, vec!["tsc", "--noEmit", "--pretty", "false"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        let tool = ToolDefinition {
            name: "empty".to_string(),
            check_type: CheckType::Linting,
            command: "  ".to_string(),
            fix_command: None,
            timeout_seconds: 10,
        };
        assert!(matches!(
            tool.argv(&[]),
            Err(ReviewError::EmptyCommand(_))
        ));
    }

    #[test]
    fn auto_fixable_lookup() {
        let registry = ToolRegistry::default();
        assert!(registry.auto_fixable("eslint"));
        assert!(registry.auto_fixable("prettier"));
        assert!(!registry.auto_fixable("tsc"));
        assert!(!registry.auto_fixable("unknown"));
    }

    #[test]
    fn tool_definition_yaml_roundtrip() {
        let tool = ToolDefinition {
            name: "eslint".to_string(),
            check_type: CheckType::Linting,
            command: "eslint --format json {files}".to_string(),
            fix_command: Some("eslint --fix {files}".to_string()),
            timeout_seconds: 60,
        };
        let yaml = serde_yaml::to_string(&tool).unwrap();
        let parsed: ToolDefinition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, tool);
    }

    #[test]
    fn timeout_defaults_when_omitted() {
        let yaml = "name: tsc\ncheck_type: type_checking\ncommand: tsc --noEmit\n";
        let tool: ToolDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tool.timeout_seconds, 120);
    }
}
