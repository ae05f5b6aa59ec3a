use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("not a git working tree: {0}")]
    NotARepository(String),

    #[error("git diff failed: {0}")]
    Git(String),

    #[error("failed to spawn tool: {0}")]
    ToolSpawnFailed(String),

    #[error("unsafe command '{0}': contains shell metacharacters")]
    UnsafeCommand(String),

    #[error("empty command for tool '{0}'")]
    EmptyCommand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
