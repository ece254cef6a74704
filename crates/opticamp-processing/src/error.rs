//! Error types for the campaign analysis pipeline.
//!
//! Decode and schema failures are terminal for a request and carry enough
//! detail (attempted combinations, previews, found columns) for a person to
//! fix the input file. They are returned as values and never escalate past
//! the request boundary.
//!
//! Errors are serializable so they can be handed to a presentation layer
//! as `{code, message}`.

use crate::config::ConfigValidationError;
use crate::decoder::DecodeDiagnostic;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No encoding/delimiter candidate produced a multi-column table.
    #[error("Could not read the CSV file. Try another delimiter or check the format.")]
    DecodeFailed(Box<DecodeDiagnostic>),

    /// Required canonical columns are missing after renaming.
    #[error("Missing required columns: {missing:?}. Columns found: {found:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DecodeFailed(_) => "DECODE_FAILED",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The decode diagnostic, if this error (or the error it wraps) is a
    /// decode failure.
    pub fn diagnostic(&self) -> Option<&DecodeDiagnostic> {
        match self {
            Self::DecodeFailed(diagnostic) => Some(diagnostic),
            Self::WithContext { source, .. } => source.diagnostic(),
            _ => None,
        }
    }

    /// Whether the failure is caused by the uploaded file rather than by the
    /// system, i.e. the user can fix it by providing a different file.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::DecodeFailed(_) | Self::SchemaMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }

    /// Check if this error is recoverable (i.e., not a fundamental failure).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DecodeFailed(_) | Self::SchemaMismatch { .. } | Self::InvalidConfig(_)
        )
    }
}

impl From<ConfigValidationError> for AnalysisError {
    fn from(error: ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(error.to_string())
    }
}

impl From<DecodeDiagnostic> for AnalysisError {
    fn from(diagnostic: DecodeDiagnostic) -> Self {
        AnalysisError::DecodeFailed(Box::new(diagnostic))
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
