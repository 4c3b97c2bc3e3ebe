//! Error types for vibery.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VbError {
    #[error("kit not found: {0}")]
    KitNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("git clone failed: {0}")]
    CloneFailed(String),

    #[error("{tool} failed (exit {code}): {message}")]
    ExternalProcess {
        tool: String,
        code: i32,
        message: String,
    },

    #[error("{tool} requires authentication (run: {hint})")]
    AuthenticationRequired { tool: String, hint: String },

    #[error("invalid manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("unknown template type {kind} (valid: {valid})")]
    UnknownTemplateType { kind: String, valid: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl VbError {
    /// Stable machine-readable code used by robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::KitNotFound(_) => "kit_not_found",
            Self::ItemNotFound(_) => "item_not_found",
            Self::TemplateNotFound(_) => "template_not_found",
            Self::SourceNotFound(_) => "source_not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::CloneFailed(_) => "clone_failed",
            Self::ExternalProcess { .. } => "external_process_failure",
            Self::AuthenticationRequired { .. } => "authentication_required",
            Self::InvalidManifest { .. } => "invalid_manifest",
            Self::ValidationFailed(_) => "validation_failed",
            Self::UnknownTemplateType { .. } => "unknown_template_type",
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::Io(_) | Self::Walk(_) => "io",
            Self::Json(_) => "json",
            Self::Archive(_) => "archive",
        }
    }
}

pub type Result<T> = std::result::Result<T, VbError>;
