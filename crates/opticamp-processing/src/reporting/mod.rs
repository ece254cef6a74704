//! Aggregation and dashboard payloads.
//!
//! [`ReportGenerator`] turns a canonical table into an [`AnalysisReport`]:
//! global KPIs and feedback, a spend series per period, one block per
//! campaign and a bounded preview table. Failed requests are described by
//! [`ErrorPayload`].
//!
//! # Example
//!
//! ```rust,ignore
//! use opticamp_processing::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::new(20).build_report(&table)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod aggregation;
mod generator;

pub use aggregation::{
    CampaignKpis, CampaignSummary, KpiSummary, SpendSeries, campaign_summaries, compute_kpis,
    spend_series,
};
pub use generator::{AnalysisReport, ErrorPayload, PREVIEW_COLUMNS, ReportGenerator};
