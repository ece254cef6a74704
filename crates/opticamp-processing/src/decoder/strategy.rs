//! Ordered candidate strategies for reading a delimited export.

use super::encoding::TextEncoding;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Lines inspected when guessing a delimiter.
const SNIFF_LINES: usize = 10;

/// Field delimiter of a delimited export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    #[serde(rename = ";")]
    Semicolon,
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = "\t")]
    Tab,
    #[serde(rename = "|")]
    Pipe,
}

impl Delimiter {
    /// Delimiters of the primary pass, in order.
    pub const PRIMARY_ORDER: [Delimiter; 3] = [Delimiter::Semicolon, Delimiter::Comma, Delimiter::Tab];

    /// Delimiters considered by autodetection.
    pub const SNIFF_CANDIDATES: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
        Delimiter::Pipe,
    ];

    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Semicolon => b';',
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Pipe => b'|',
        }
    }

    pub fn as_char(&self) -> char {
        char::from(self.as_byte())
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tab => f.write_str("\\t"),
            other => write!(f, "{}", other.as_char()),
        }
    }
}

/// Which pass of the decoder a candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePass {
    /// Every encoding × delimiter combination.
    Primary,
    /// Semicolon retried against the UTF-16 variants.
    Extra,
    /// Delimiter guessed from the content.
    Autodetect,
    /// Header line located by scanning for the header marker.
    HeaderScan,
}

/// One attempt of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Parse with a known delimiter.
    Fixed {
        encoding: TextEncoding,
        delimiter: Delimiter,
        pass: DecodePass,
    },
    /// Guess the delimiter from the decoded content, then parse.
    Sniffed { encoding: TextEncoding },
}

/// Successful parse of one candidate, before the column-count check.
#[derive(Debug)]
pub(crate) struct Attempt {
    pub frame: DataFrame,
    pub delimiter: Delimiter,
}

impl Candidate {
    pub fn encoding(&self) -> TextEncoding {
        match self {
            Self::Fixed { encoding, .. } | Self::Sniffed { encoding } => *encoding,
        }
    }

    pub fn pass(&self) -> DecodePass {
        match self {
            Self::Fixed { pass, .. } => *pass,
            Self::Sniffed { .. } => DecodePass::Autodetect,
        }
    }

    /// Human-readable label used to prefix failure messages.
    pub fn label(&self) -> String {
        match self {
            Self::Fixed {
                encoding,
                delimiter,
                pass: DecodePass::Extra,
            } => format!("Delimiter '{delimiter}', encoding '{encoding}' (extra)"),
            Self::Fixed {
                encoding,
                delimiter,
                ..
            } => format!("Delimiter '{delimiter}', encoding '{encoding}'"),
            Self::Sniffed { encoding } => format!("Autodetect, encoding '{encoding}'"),
        }
    }

    /// Decode and parse `bytes` with this candidate.
    pub(crate) fn attempt(&self, bytes: &[u8]) -> Result<Attempt, String> {
        let text = decode_text(self.encoding(), bytes)?;
        let delimiter = match self {
            Self::Fixed { delimiter, .. } => *delimiter,
            Self::Sniffed { .. } => {
                sniff_delimiter(&text).ok_or_else(|| "could not detect a delimiter".to_string())?
            }
        };
        let frame = parse_delimited(text, delimiter).map_err(|e| e.to_string())?;
        Ok(Attempt { frame, delimiter })
    }
}

/// The full ordered candidate list, first success wins.
pub fn candidate_plan() -> Vec<Candidate> {
    let mut plan = Vec::with_capacity(19);

    for encoding in TextEncoding::PRIMARY_ORDER {
        for delimiter in Delimiter::PRIMARY_ORDER {
            plan.push(Candidate::Fixed {
                encoding,
                delimiter,
                pass: DecodePass::Primary,
            });
        }
    }

    for encoding in TextEncoding::UTF16_VARIANTS {
        plan.push(Candidate::Fixed {
            encoding,
            delimiter: Delimiter::Semicolon,
            pass: DecodePass::Extra,
        });
    }

    for encoding in TextEncoding::UTF16_VARIANTS {
        plan.push(Candidate::Sniffed { encoding });
    }

    plan
}

/// Decode bytes, rejecting text that only decodes because the encoding
/// accepts any byte (e.g. UTF-16 read as latin1 leaves NUL characters).
pub(crate) fn decode_text(encoding: TextEncoding, bytes: &[u8]) -> Result<String, String> {
    let text = encoding.decode(bytes)?;
    if text.contains('\0') {
        return Err("decoded text contains NUL characters".to_string());
    }
    Ok(text)
}

/// Parse delimited text with a header row, keeping every cell as a string.
pub(crate) fn parse_delimited(text: String, delimiter: Delimiter) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(delimiter.as_byte())
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(text))
        .finish()
}

/// Guess the delimiter from the first lines of the content.
///
/// Scores each candidate by its mean count per line, penalised by how much
/// that count varies between lines.
pub fn sniff_delimiter(content: &str) -> Option<Delimiter> {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let mut best: Option<(Delimiter, f64)> = None;

    for delimiter in Delimiter::SNIFF_CANDIDATES {
        let counts: Vec<f64> = sample
            .iter()
            .map(|line| line.chars().filter(|&c| c == delimiter.as_char()).count() as f64)
            .collect();

        let avg = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance =
            counts.iter().map(|&x| (x - avg).powi(2)).sum::<f64>() / counts.len() as f64;
        let score = avg / (1.0 + variance.sqrt());

        if score > 0.0 && best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((delimiter, score));
        }
    }

    best.map(|(delimiter, _)| delimiter)
}
