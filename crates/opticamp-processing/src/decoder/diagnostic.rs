//! Failure report of the decoder and the last-resort header scan.

use super::encoding::TextEncoding;
use super::strategy::{Delimiter, parse_delimited};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Everything a person needs to fix a file the decoder could not read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeDiagnostic {
    /// One message per failed attempt, in attempt order.
    #[serde(rename = "errores")]
    pub errors: Vec<String>,

    /// Leading lines of the file split into cells, or the reason they could
    /// not be read.
    #[serde(rename = "preview_manual")]
    pub preview: ManualPreview,

    /// Cells of the guessed header line, empty when no header was found.
    #[serde(rename = "columnas_detectadas")]
    pub detected_columns: Vec<String>,
}

/// Manual preview of the first lines of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualPreview {
    /// Lines split by tab, each cell trimmed.
    Lines(Vec<Vec<String>>),
    /// The file could not even be decoded for a preview.
    Unavailable(String),
}

impl ManualPreview {
    pub fn lines(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Lines(lines) => Some(lines),
            Self::Unavailable(_) => None,
        }
    }
}

/// Outcome of scanning UTF-16 text for the header marker.
#[derive(Debug)]
pub(crate) struct HeaderScan {
    /// Index of the line holding the marker.
    pub header_row: Option<usize>,
    /// Table reparsed from the header line on, when it has several columns.
    pub frame: Option<DataFrame>,
    /// Why the reparse from the header line failed.
    pub error: Option<String>,
    pub preview: ManualPreview,
    pub detected_columns: Vec<String>,
}

/// Limits of the header scan.
#[derive(Debug, Clone)]
pub(crate) struct HeaderScanner<'a> {
    pub marker: &'a str,
    pub tail_lines: usize,
    pub unmatched_lines: usize,
}

impl HeaderScanner<'_> {
    /// Decode `bytes` as UTF-16, locate the header marker and reparse from
    /// there with a tab delimiter. The preview is built whatever the reparse
    /// outcome.
    pub fn scan(&self, bytes: &[u8]) -> HeaderScan {
        let text = match TextEncoding::Utf16.decode(bytes) {
            Ok(text) => text,
            Err(e) => {
                return HeaderScan {
                    header_row: None,
                    frame: None,
                    error: None,
                    preview: ManualPreview::Unavailable(e),
                    detected_columns: Vec::new(),
                };
            }
        };

        let lines: Vec<&str> = text.lines().collect();
        let header_row = lines.iter().position(|line| line.contains(self.marker));

        let Some(h) = header_row else {
            let preview = lines
                .iter()
                .take(self.unmatched_lines)
                .map(|line| split_line(line))
                .collect();
            return HeaderScan {
                header_row: None,
                frame: None,
                error: None,
                preview: ManualPreview::Lines(preview),
                detected_columns: Vec::new(),
            };
        };

        let (frame, error) = match parse_delimited(lines[h..].join("\n"), Delimiter::Tab) {
            Ok(df) if df.width() > 1 => (Some(df), None),
            Ok(_) => (None, Some("only one column detected".to_string())),
            Err(e) => (None, Some(e.to_string())),
        };

        let end = (h + self.tail_lines + 1).min(lines.len());
        let preview: Vec<Vec<String>> = lines[..end].iter().map(|line| split_line(line)).collect();
        let detected_columns = preview[h].clone();

        HeaderScan {
            header_row: Some(h),
            frame,
            error,
            preview: ManualPreview::Lines(preview),
            detected_columns,
        }
    }
}

fn split_line(line: &str) -> Vec<String> {
    line.trim().split('\t').map(|cell| cell.trim().to_string()).collect()
}
