//! Robust decoding of ad-platform exports.
//!
//! Exports arrive with unknown encodings and delimiters. [`RobustDecoder`]
//! walks an ordered list of candidate strategies and keeps the first one that
//! produces a table with more than one column:
//!
//! 1. every encoding × delimiter pair (see [`candidate_plan`])
//! 2. semicolon against the UTF-16 variants
//! 3. a sniffed delimiter against the UTF-16 variants
//! 4. a scan of the UTF-16 text for the header marker, reparsed with tabs
//!
//! Each failure is recorded. When nothing works the caller gets a
//! [`DecodeDiagnostic`] with every message and a manual preview of the file.

mod diagnostic;
mod encoding;
mod strategy;

pub use diagnostic::{DecodeDiagnostic, ManualPreview};
pub use encoding::TextEncoding;
pub use strategy::{Candidate, DecodePass, Delimiter, candidate_plan, sniff_delimiter};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use diagnostic::HeaderScanner;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// How a table was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodingInfo {
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
    /// Line of the header when it was found by scanning, `None` when the
    /// header is the first line.
    pub header_row: Option<usize>,
    pub pass: DecodePass,
}

/// A raw table: every column is a string column named after the file header.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub frame: DataFrame,
    pub info: DecodingInfo,
}

/// Decoder trying encodings and delimiters until one fits.
#[derive(Debug, Clone)]
pub struct RobustDecoder {
    header_marker: String,
    preview_tail_lines: usize,
    unmatched_preview_lines: usize,
}

impl Default for RobustDecoder {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl RobustDecoder {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            header_marker: config.header_marker.clone(),
            preview_tail_lines: config.preview_tail_lines,
            unmatched_preview_lines: config.unmatched_preview_lines,
        }
    }

    /// Decode raw bytes into a table or a diagnostic.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<DecodedTable, DecodeDiagnostic> {
        let mut errors = Vec::new();

        for candidate in candidate_plan() {
            match candidate.attempt(bytes) {
                Ok(attempt) if attempt.frame.width() > 1 => {
                    let info = DecodingInfo {
                        encoding: candidate.encoding(),
                        delimiter: attempt.delimiter,
                        header_row: None,
                        pass: candidate.pass(),
                    };
                    info!(
                        "Decoded {} rows x {} columns ({}, delimiter '{}')",
                        attempt.frame.height(),
                        attempt.frame.width(),
                        info.encoding,
                        info.delimiter
                    );
                    return Ok(DecodedTable {
                        frame: attempt.frame,
                        info,
                    });
                }
                Ok(attempt) => {
                    let message = format!(
                        "{}: only one column detected (delimiter '{}')",
                        candidate.label(),
                        attempt.delimiter
                    );
                    debug!("{}", message);
                    errors.push(message);
                }
                Err(e) => {
                    let message = format!("{}: {}", candidate.label(), e);
                    debug!("{}", message);
                    errors.push(message);
                }
            }
        }

        let scanner = HeaderScanner {
            marker: &self.header_marker,
            tail_lines: self.preview_tail_lines,
            unmatched_lines: self.unmatched_preview_lines,
        };
        let scan = scanner.scan(bytes);

        if let (Some(h), Some(frame)) = (scan.header_row, scan.frame) {
            info!("Header found at line {} by scanning, decoded {:?}", h, frame.shape());
            return Ok(DecodedTable {
                frame,
                info: DecodingInfo {
                    encoding: TextEncoding::Utf16,
                    delimiter: Delimiter::Tab,
                    header_row: Some(h),
                    pass: DecodePass::HeaderScan,
                },
            });
        }

        if let (Some(h), Some(e)) = (scan.header_row, scan.error) {
            errors.push(format!("Header row {h}: {e}"));
        }

        warn!("No decoding strategy succeeded after {} attempts", errors.len());
        Err(DecodeDiagnostic {
            errors,
            preview: scan.preview,
            detected_columns: scan.detected_columns,
        })
    }

    /// Read and decode a file from disk.
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<DecodedTable> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| AnalysisError::Io(e).with_context(path.display().to_string()))?;
        self.decode(&bytes).map_err(AnalysisError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));
        bytes
    }

    #[test]
    fn test_semicolon_utf8_first_candidate() {
        let decoded = RobustDecoder::default()
            .decode("Campaña;Coste;Clics\nA;10,5;100\n".as_bytes())
            .unwrap();
        assert_eq!(decoded.frame.shape(), (1, 3));
        assert_eq!(decoded.info.encoding, TextEncoding::Utf8);
        assert_eq!(decoded.info.delimiter, Delimiter::Semicolon);
        assert_eq!(decoded.info.pass, DecodePass::Primary);
    }

    #[test]
    fn test_comma_after_semicolon_fails() {
        let decoded = RobustDecoder::default()
            .decode(b"Campaign,Cost,Clicks\nA,10,100\n")
            .unwrap();
        assert_eq!(decoded.info.delimiter, Delimiter::Comma);
        assert_eq!(decoded.frame.width(), 3);
    }

    #[test]
    fn test_latin1_fallback() {
        let decoded = RobustDecoder::default()
            .decode(b"Campa\xf1a;Coste\nA;1\n")
            .unwrap();
        assert_eq!(decoded.info.encoding, TextEncoding::Latin1);
        let names: Vec<String> = decoded
            .frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Campaña", "Coste"]);
    }

    #[test]
    fn test_utf16_tab_export() {
        let decoded = RobustDecoder::default()
            .decode(&utf16le("Campaña\tCoste\nA\t1\n"))
            .unwrap();
        assert_eq!(decoded.info.encoding, TextEncoding::Utf16);
        assert_eq!(decoded.info.delimiter, Delimiter::Tab);
    }

    #[test]
    fn test_utf16_pipe_export_reaches_autodetect() {
        let decoded = RobustDecoder::default()
            .decode(&utf16le("Campaign|Cost|Clicks|Conversions\nA|10|5|1\n"))
            .unwrap();
        assert_eq!(decoded.info.encoding, TextEncoding::Utf16);
        assert_eq!(decoded.info.delimiter, Delimiter::Pipe);
        assert_eq!(decoded.info.pass, DecodePass::Autodetect);
        assert_eq!(decoded.info.header_row, None);
        assert_eq!(decoded.frame.shape(), (1, 4));
    }

    #[test]
    fn test_single_column_input_fails_with_diagnostic() {
        let diagnostic = RobustDecoder::default()
            .decode(b"just one column\nvalue\n")
            .unwrap_err();
        assert!(!diagnostic.errors.is_empty());
        assert!(
            diagnostic.errors[0].starts_with("Delimiter ';', encoding 'utf-8'"),
            "{:?}",
            diagnostic.errors[0]
        );
        assert!(diagnostic.detected_columns.is_empty());
    }

    #[test]
    fn test_decode_file_missing() {
        let err = RobustDecoder::default()
            .decode_file("/nonexistent/export.csv")
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
