//! Rule-based recommendation engine using fixed thresholds.

use super::{MetricSnapshot, Recommendation, RecommendationEngine};

/// CTR (percent) below which creatives are flagged.
pub const CTR_THRESHOLD: f64 = 1.0;

/// CPA above which targeting is flagged.
pub const CPA_THRESHOLD: f64 = 50.0;

/// Rule-based recommender.
///
/// Checks CTR first, then CPA:
///
/// 1. `CTR < 1` → [`Recommendation::ImproveCreatives`]
/// 2. `CPA > 50` → [`Recommendation::OptimizeTargeting`]
/// 3. otherwise → [`Recommendation::KeepMonitoring`]
#[derive(Debug, Clone)]
pub struct RuleBasedRecommender {
    ctr_threshold: f64,
    cpa_threshold: f64,
}

impl Default for RuleBasedRecommender {
    fn default() -> Self {
        Self::new(CTR_THRESHOLD, CPA_THRESHOLD)
    }
}

impl RuleBasedRecommender {
    pub fn new(ctr_threshold: f64, cpa_threshold: f64) -> Self {
        Self {
            ctr_threshold,
            cpa_threshold,
        }
    }
}

impl RecommendationEngine for RuleBasedRecommender {
    fn recommend(&self, snapshot: &MetricSnapshot) -> Recommendation {
        if snapshot.ctr < self.ctr_threshold {
            Recommendation::ImproveCreatives
        } else if snapshot.cpa > self.cpa_threshold {
            Recommendation::OptimizeTargeting
        } else {
            Recommendation::KeepMonitoring
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ctr: f64, cpa: f64) -> MetricSnapshot {
        MetricSnapshot {
            ctr,
            cpa,
            ..MetricSnapshot::default()
        }
    }

    #[test]
    fn test_low_ctr_wins_over_high_cpa() {
        let engine = RuleBasedRecommender::default();
        assert_eq!(
            engine.recommend(&snapshot(0.5, 80.0)),
            Recommendation::ImproveCreatives
        );
    }

    #[test]
    fn test_high_cpa() {
        let engine = RuleBasedRecommender::default();
        assert_eq!(
            engine.recommend(&snapshot(1.0, 50.01)),
            Recommendation::OptimizeTargeting
        );
    }

    #[test]
    fn test_boundaries_keep_monitoring() {
        let engine = RuleBasedRecommender::default();
        assert_eq!(
            engine.recommend(&snapshot(1.0, 50.0)),
            Recommendation::KeepMonitoring
        );
    }

    #[test]
    fn test_empty_snapshot_is_low_ctr() {
        let engine = RuleBasedRecommender::default();
        assert_eq!(
            engine.recommend(&MetricSnapshot::default()),
            Recommendation::ImproveCreatives
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = RuleBasedRecommender::new(0.1, 10.0);
        assert_eq!(
            engine.recommend(&snapshot(0.5, 20.0)),
            Recommendation::OptimizeTargeting
        );
    }
}
