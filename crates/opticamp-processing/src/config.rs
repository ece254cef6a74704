//! Configuration types for the campaign analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Defaults reproduce the
//! behaviour expected by existing dashboard consumers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of rows in the preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Header line searched for by the decoder's last-resort scan.
pub const DEFAULT_HEADER_MARKER: &str = "Mes\tCampaña";

/// Rendered documents smaller than this are treated as empty or corrupt.
pub const DEFAULT_MIN_DOCUMENT_BYTES: usize = 1000;

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use opticamp_processing::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .preview_rows(50)
///     .wkhtmltopdf_path("/usr/local/bin/wkhtmltopdf")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of rows included in the preview table of the report.
    /// Default: 20
    pub preview_rows: usize,

    /// Literal header line the decoder looks for when every delimiter and
    /// encoding candidate failed.
    /// Default: "Mes\tCampaña"
    pub header_marker: String,

    /// Lines kept after the detected header in the manual preview.
    /// Default: 4
    pub preview_tail_lines: usize,

    /// Lines kept in the manual preview when no header line was found.
    /// Default: 20
    pub unmatched_preview_lines: usize,

    /// Minimum size of a rendered document before it is considered valid.
    /// Default: 1000
    pub min_document_bytes: usize,

    /// Path to the `wkhtmltopdf` executable used for document export.
    /// Default: None
    pub wkhtmltopdf_path: Option<PathBuf>,

    /// Logo embedded in exported documents when the file exists.
    /// Default: None
    pub logo_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            preview_tail_lines: 4,
            unmatched_preview_lines: 20,
            min_document_bytes: DEFAULT_MIN_DOCUMENT_BYTES,
            wkhtmltopdf_path: None,
            logo_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if self.header_marker.trim().is_empty() {
            return Err(ConfigValidationError::EmptyHeaderMarker);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Header marker must not be empty")]
    EmptyHeaderMarker,
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    preview_rows: Option<usize>,
    header_marker: Option<String>,
    preview_tail_lines: Option<usize>,
    unmatched_preview_lines: Option<usize>,
    min_document_bytes: Option<usize>,
    wkhtmltopdf_path: Option<PathBuf>,
    logo_path: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Set the number of rows in the preview table.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the header line searched for by the last-resort decoder scan.
    pub fn header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = Some(marker.into());
        self
    }

    /// Set how many lines after the detected header end up in the preview.
    pub fn preview_tail_lines(mut self, lines: usize) -> Self {
        self.preview_tail_lines = Some(lines);
        self
    }

    /// Set how many lines the preview keeps when no header was found.
    pub fn unmatched_preview_lines(mut self, lines: usize) -> Self {
        self.unmatched_preview_lines = Some(lines);
        self
    }

    /// Set the minimum accepted size of a rendered document.
    pub fn min_document_bytes(mut self, bytes: usize) -> Self {
        self.min_document_bytes = Some(bytes);
        self
    }

    /// Set the path of the `wkhtmltopdf` executable.
    pub fn wkhtmltopdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wkhtmltopdf_path = Some(path.into());
        self
    }

    /// Set the logo embedded in exported documents.
    pub fn logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            header_marker: self.header_marker.unwrap_or(defaults.header_marker),
            preview_tail_lines: self
                .preview_tail_lines
                .unwrap_or(defaults.preview_tail_lines),
            unmatched_preview_lines: self
                .unmatched_preview_lines
                .unwrap_or(defaults.unmatched_preview_lines),
            min_document_bytes: self
                .min_document_bytes
                .unwrap_or(defaults.min_document_bytes),
            wkhtmltopdf_path: self.wkhtmltopdf_path,
            logo_path: self.logo_path,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.preview_rows, 20);
        assert_eq!(config.header_marker, "Mes\tCampaña");
        assert_eq!(config.preview_tail_lines, 4);
        assert_eq!(config.min_document_bytes, 1000);
        assert!(config.wkhtmltopdf_path.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .preview_rows(5)
            .header_marker("Month\tCampaign")
            .wkhtmltopdf_path("/opt/wkhtmltopdf")
            .build()
            .unwrap();

        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.header_marker, "Month\tCampaign");
        assert_eq!(
            config.wkhtmltopdf_path,
            Some(PathBuf::from("/opt/wkhtmltopdf"))
        );
    }

    #[test]
    fn test_validation_invalid_preview_rows() {
        let result = AnalysisConfig::builder().preview_rows(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPreviewRows(0)
        ));
    }

    #[test]
    fn test_validation_empty_marker() {
        let result = AnalysisConfig::builder().header_marker("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyHeaderMarker
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "preview_rows": 10,
            "header_marker": "Mes\tCampaña",
            "preview_tail_lines": 2,
            "unmatched_preview_lines": 8,
            "min_document_bytes": 500,
            "wkhtmltopdf_path": "/usr/bin/wkhtmltopdf",
            "logo_path": null
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.preview_tail_lines, 2);
        assert_eq!(config.unmatched_preview_lines, 8);
        assert!(config.logo_path.is_none());
        assert!(config.validate().is_ok());
    }
}
