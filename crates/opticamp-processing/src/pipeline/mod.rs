//! Pipeline module.
//!
//! This module provides the analysis pipeline and the request and outcome
//! types of one analysis.

mod builder;

pub use builder::{AnalysisPipeline, AnalysisPipelineBuilder};

use crate::decoder::DecodingInfo;
use crate::filters::CampaignFilter;
use crate::reporting::AnalysisReport;
use crate::table::CanonicalTable;

/// One uploaded file to analyze.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Name of the upload, used for logging.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub filter: CampaignFilter,
}

impl AnalysisRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            filter: CampaignFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: CampaignFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Result of a successful analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The normalized, filtered and annotated table.
    pub table: CanonicalTable,
    pub report: AnalysisReport,
    pub decoding: DecodingInfo,
}
