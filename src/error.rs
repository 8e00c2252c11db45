//! Error types for gistskill.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    #[error("unknown tool target {name:?} (known: {known})")]
    UnknownTarget { name: String, known: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SkillError {
    /// Stable snake_case code used for robot-mode error output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Parse(_) => "parse_error",
            Self::Backend { .. } => "backend_error",
            Self::UnknownTarget { .. } => "unknown_target",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::Filesystem { .. } | Self::Io(_) => "io_error",
        }
    }

    /// Process exit status. Clap reserves 2 for usage errors.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound(_) => 3,
            Self::Validation(_) | Self::Parse(_) | Self::UnknownTarget { .. } => 4,
            Self::Backend { .. } => 5,
            Self::Config(_) => 6,
            Self::Serialization(_) | Self::Filesystem { .. } | Self::Io(_) => 1,
        }
    }

    pub(crate) fn backend(backend: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for SkillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SkillError>;
