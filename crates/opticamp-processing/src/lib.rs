//! Campaign Export Analysis Library
//!
//! Normalization, KPI derivation and rule-based recommendations for
//! advertising-campaign exports, built with Rust and Polars.
//!
//! # Overview
//!
//! Google Ads, Meta, TikTok and Pinterest export campaign data with their
//! own column names, delimiters and encodings. This library reconciles them:
//!
//! - **Robust Decoding**: tries encodings and delimiters in a fixed order, with
//!   a header-scan fallback and a diagnostic when nothing works
//! - **Schema Normalization**: maps platform columns onto one canonical
//!   vocabulary, coerces locale-formatted numbers and derives CTR, CPC and CVR
//! - **Recommendations**: a per-row rule ladder plus a global feedback message
//! - **Reporting**: global and per-campaign KPIs, spend per period, and a
//!   preview table as a JSON payload
//! - **Export**: canonical CSV and an HTML summary rendered to PDF by
//!   `wkhtmltopdf`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use opticamp_processing::{AnalysisPipeline, AnalysisRequest, ErrorPayload};
//!
//! let pipeline = AnalysisPipeline::builder().build()?;
//! let bytes = std::fs::read("campaigns.csv")?;
//!
//! match pipeline.analyze(AnalysisRequest::new("campaigns.csv", bytes)) {
//!     Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome.report)?),
//!     Err(e) => println!("{}", serde_json::to_string_pretty(&ErrorPayload::from(&e))?),
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisConfig`] to customize the pipeline:
//!
//! ```rust,ignore
//! use opticamp_processing::AnalysisConfig;
//!
//! let config = AnalysisConfig::builder()
//!     .preview_rows(50)
//!     .header_marker("Mes\tCampaña")
//!     .build()?;
//! ```

pub mod config;
pub mod decisions;
pub mod decoder;
pub mod error;
pub mod export;
pub mod filters;
pub mod normalizer;
pub mod pipeline;
pub mod reporting;
pub mod table;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use decisions::{
    GlobalFeedback, MetricSnapshot, Recommendation, RecommendationEngine, RuleBasedRecommender,
    annotate_recommendations,
};
pub use decoder::{
    DecodeDiagnostic, DecodePass, DecodedTable, DecodingInfo, Delimiter, ManualPreview,
    RobustDecoder, TextEncoding,
};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use export::{
    DocumentError, DocumentRenderer, RenderError, WkhtmltopdfRenderer, build_document_html,
    render_document, write_canonical_csv,
};
pub use filters::CampaignFilter;
pub use normalizer::{CanonicalField, SchemaNormalizer};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRequest};
pub use reporting::{
    AnalysisReport, CampaignKpis, CampaignSummary, ErrorPayload, KpiSummary, ReportGenerator,
    SpendSeries,
};
pub use table::CanonicalTable;
pub use utils::{parse_float_robust, parse_metric_str};
