//! Recommendation and feedback rules.
//!
//! Two independent ladders live here: the per-row [`RecommendationEngine`]
//! that fills `Recomendación`, and the coarser [`GlobalFeedback`] chosen
//! from the table-wide KPIs.

mod feedback;
mod rule_engine;

pub use feedback::GlobalFeedback;
pub use rule_engine::RuleBasedRecommender;

use crate::error::Result;
use crate::normalizer::CanonicalField;
use crate::table::CanonicalTable;
use crate::utils::metric_to_count;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Name used for rows without a `Nombre`.
pub const DEFAULT_CAMPAIGN_NAME: &str = "Campaña";

/// Per-row metrics the recommendation rules look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub nombre: String,
    pub gasto: f64,
    pub clics: u64,
    pub conversiones: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self {
            nombre: DEFAULT_CAMPAIGN_NAME.to_string(),
            gasto: 0.0,
            clics: 0,
            conversiones: 0,
            ctr: 0.0,
            cpc: 0.0,
            cpa: 0.0,
        }
    }
}

impl MetricSnapshot {
    /// One snapshot per table row. Absent fields read as 0 and an absent
    /// name as [`DEFAULT_CAMPAIGN_NAME`].
    pub fn from_table(table: &CanonicalTable) -> Result<Vec<MetricSnapshot>> {
        let rows = table.height();
        let column = |field: CanonicalField| -> Result<Vec<f64>> {
            Ok(table.metric(field)?.unwrap_or_else(|| vec![0.0; rows]))
        };

        let names = table
            .text(CanonicalField::Nombre)?
            .unwrap_or_else(|| vec![None; rows]);
        let gasto = column(CanonicalField::Gasto)?;
        let clics = column(CanonicalField::Clics)?;
        let conversiones = column(CanonicalField::Conversiones)?;
        let ctr = column(CanonicalField::Ctr)?;
        let cpc = column(CanonicalField::Cpc)?;
        let cpa = column(CanonicalField::Cpa)?;

        Ok((0..rows)
            .map(|i| MetricSnapshot {
                nombre: names[i]
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CAMPAIGN_NAME.to_string()),
                gasto: gasto[i],
                clics: metric_to_count(clics[i]),
                conversiones: metric_to_count(conversiones[i]),
                ctr: ctr[i],
                cpc: cpc[i],
                cpa: cpa[i],
            })
            .collect())
    }
}

/// One of the three fixed per-row recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "improve creatives to raise CTR")]
    ImproveCreatives,
    #[serde(rename = "optimize targeting to reduce CPA")]
    OptimizeTargeting,
    #[serde(rename = "performance good, keep monitoring")]
    KeepMonitoring,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImproveCreatives => "improve creatives to raise CTR",
            Self::OptimizeTargeting => "optimize targeting to reduce CPA",
            Self::KeepMonitoring => "performance good, keep monitoring",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for per-row recommendation engines.
///
/// Implementations must be total and deterministic: every snapshot gets
/// exactly one recommendation.
pub trait RecommendationEngine: Send + Sync {
    fn recommend(&self, snapshot: &MetricSnapshot) -> Recommendation;
}

/// Fill `Recomendación` from `engine` unless the table already has it.
///
/// Returns whether the column was added.
pub fn annotate_recommendations(
    table: &mut CanonicalTable,
    engine: &dyn RecommendationEngine,
) -> Result<bool> {
    if table.has(CanonicalField::Recomendacion) {
        debug!("Keeping existing recommendations");
        return Ok(false);
    }

    let values: Vec<String> = MetricSnapshot::from_table(table)?
        .iter()
        .map(|snapshot| engine.recommend(snapshot).as_str().to_string())
        .collect();
    table.set_text(CanonicalField::Recomendacion, values)?;
    Ok(true)
}
