//! Table-wide feedback chosen from the global KPIs.

use super::rule_engine::{CPA_THRESHOLD, CTR_THRESHOLD};
use crate::reporting::KpiSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalFeedback {
    #[serde(rename = "No conversions recorded. Review the segmentation, the offer and the landing page.")]
    NoConversions,
    #[serde(rename = "CTR is low. Try new creatives and segmentations.")]
    LowCtr,
    #[serde(rename = "CPA is high. Optimize the segmentation and review the offer.")]
    HighCpa,
    #[serde(rename = "Good overall performance. Keep optimizing and testing changes.")]
    Positive,
}

impl GlobalFeedback {
    /// Pick the message for a KPI summary.
    ///
    /// Zero conversions first, then low mean CTR, then high CPA. Absent or
    /// zero CTR and CPA never trigger their rule.
    pub fn from_kpis(kpis: &KpiSummary) -> Self {
        if kpis.conversiones == Some(0) {
            Self::NoConversions
        } else if kpis.ctr.is_some_and(|ctr| ctr != 0.0 && ctr < CTR_THRESHOLD) {
            Self::LowCtr
        } else if kpis.cpa.is_some_and(|cpa| cpa != 0.0 && cpa > CPA_THRESHOLD) {
            Self::HighCpa
        } else {
            Self::Positive
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NoConversions => {
                "No conversions recorded. Review the segmentation, the offer and the landing page."
            }
            Self::LowCtr => "CTR is low. Try new creatives and segmentations.",
            Self::HighCpa => "CPA is high. Optimize the segmentation and review the offer.",
            Self::Positive => "Good overall performance. Keep optimizing and testing changes.",
        }
    }
}

impl fmt::Display for GlobalFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis(conversiones: u64, ctr: Option<f64>, cpa: Option<f64>) -> KpiSummary {
        KpiSummary {
            gasto_total: Some(100.0),
            conversiones: Some(conversiones),
            ctr,
            cpa,
        }
    }

    #[test]
    fn test_no_conversions_first() {
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(0, Some(0.1), None)),
            GlobalFeedback::NoConversions
        );
    }

    #[test]
    fn test_low_ctr() {
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(3, Some(0.4), Some(90.0))),
            GlobalFeedback::LowCtr
        );
    }

    #[test]
    fn test_high_cpa_when_ctr_absent() {
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(1, None, Some(100.0))),
            GlobalFeedback::HighCpa
        );
    }

    #[test]
    fn test_zero_ctr_skips_ctr_rule() {
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(2, Some(0.0), Some(600.0))),
            GlobalFeedback::HighCpa
        );
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(2, Some(0.0), Some(20.0))),
            GlobalFeedback::Positive
        );
    }

    #[test]
    fn test_positive() {
        assert_eq!(
            GlobalFeedback::from_kpis(&kpis(10, Some(2.0), Some(10.0))),
            GlobalFeedback::Positive
        );
        assert!(GlobalFeedback::Positive.to_string().starts_with("Good"));
    }
}
