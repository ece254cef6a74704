//! KPI aggregation over the canonical table.

use crate::error::Result;
use crate::normalizer::CanonicalField;
use crate::table::CanonicalTable;
use crate::utils::metric_to_count;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Table-wide KPIs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Sum of `Gasto`.
    pub gasto_total: Option<f64>,
    /// Sum of `Conversiones`, truncated.
    pub conversiones: Option<u64>,
    /// Mean `CTR`; `None` without a CTR column or without rows.
    pub ctr: Option<f64>,
    /// Total spend over total conversions; `None` when conversions sum to 0.
    pub cpa: Option<f64>,
}

/// The same KPIs as [`KpiSummary`], in the per-campaign payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignKpis {
    pub gasto: Option<f64>,
    pub conversiones: Option<u64>,
    pub ctr: Option<f64>,
    pub cpa: Option<f64>,
}

impl From<KpiSummary> for CampaignKpis {
    fn from(kpis: KpiSummary) -> Self {
        Self {
            gasto: kpis.gasto_total,
            conversiones: kpis.conversiones,
            ctr: kpis.ctr,
            cpa: kpis.cpa,
        }
    }
}

/// Spend per period, periods in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendSeries {
    pub labels: Vec<String>,
    pub gasto: Vec<f64>,
}

/// KPIs, feedback and spend series of one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub nombre: String,
    pub kpis: CampaignKpis,
    /// Recommendation of the campaign's first row.
    pub feedback: String,
    pub grafica: Option<SpendSeries>,
}

/// Compute the global KPIs of a table.
pub fn compute_kpis(table: &CanonicalTable) -> Result<KpiSummary> {
    let spend = table.metric(CanonicalField::Gasto)?;
    let conversions = table.metric(CanonicalField::Conversiones)?;
    let ctr = table.metric(CanonicalField::Ctr)?;

    let spend_sum = spend.as_deref().map(total);
    let conversions_sum = conversions.as_deref().map(total);

    let mean_ctr = ctr
        .filter(|values| !values.is_empty())
        .map(|values| values.iter().sum::<f64>() / values.len() as f64);

    let cpa = match (spend_sum, conversions_sum) {
        (Some(spend), Some(conversions)) if conversions > 0.0 => Some(spend / conversions),
        _ => None,
    };

    Ok(KpiSummary {
        gasto_total: spend_sum,
        conversiones: conversions_sum.map(metric_to_count),
        ctr: mean_ctr,
        cpa,
    })
}

/// Sum starting from positive zero, so an empty column totals `0.0`
/// rather than `-0.0`.
fn total(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

/// Spend summed per `Mes`, `None` without a `Mes` column. Rows without a
/// period are skipped.
pub fn spend_series(table: &CanonicalTable) -> Result<Option<SpendSeries>> {
    let (Some(periods), Some(spend)) = (
        table.text(CanonicalField::Mes)?,
        table.metric(CanonicalField::Gasto)?,
    ) else {
        return Ok(None);
    };

    let mut labels: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (period, value) in periods.into_iter().zip(spend) {
        let Some(period) = period else {
            continue;
        };
        match positions.get(&period) {
            Some(&i) => totals[i] += value,
            None => {
                positions.insert(period.clone(), labels.len());
                labels.push(period);
                totals.push(value);
            }
        }
    }

    Ok(Some(SpendSeries {
        labels,
        gasto: totals,
    }))
}

/// One block per `Campaña` value, ordered by name. Empty without a
/// `Campaña` column; rows without a campaign are left out.
pub fn campaign_summaries(table: &CanonicalTable) -> Result<Vec<CampaignSummary>> {
    let Some(campaigns) = table.text(CanonicalField::Campana)? else {
        return Ok(Vec::new());
    };

    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, campaign) in campaigns.into_iter().enumerate() {
        if let Some(campaign) = campaign {
            groups.entry(campaign).or_default().push(i);
        }
    }

    let mut summaries = Vec::with_capacity(groups.len());
    for (nombre, rows) in groups {
        let group = table.take_rows(&rows)?;

        let feedback = group
            .text(CanonicalField::Recomendacion)?
            .and_then(|values| values.into_iter().next().flatten())
            .unwrap_or_default();

        summaries.push(CampaignSummary {
            nombre,
            kpis: compute_kpis(&group)?.into(),
            feedback,
            grafica: spend_series(&group)?,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn table(frame: DataFrame) -> CanonicalTable {
        CanonicalTable::from_frame(frame)
    }

    #[test]
    fn test_kpis() {
        let table = table(
            df!(
                "Gasto" => [10.0, 30.0],
                "Conversiones" => [1.0, 1.5],
                "CTR" => [1.0, 3.0],
            )
            .unwrap(),
        );

        let kpis = compute_kpis(&table).unwrap();
        assert_eq!(kpis.gasto_total, Some(40.0));
        assert_eq!(kpis.conversiones, Some(2));
        assert_eq!(kpis.ctr, Some(2.0));
        assert_eq!(kpis.cpa, Some(16.0));
    }

    #[test]
    fn test_kpis_zero_conversions() {
        let table = table(
            df!(
                "Gasto" => [10.0],
                "Conversiones" => [0.0],
            )
            .unwrap(),
        );

        let kpis = compute_kpis(&table).unwrap();
        assert_eq!(kpis.conversiones, Some(0));
        assert_eq!(kpis.cpa, None);
        assert_eq!(kpis.ctr, None);
    }

    #[test]
    fn test_kpis_empty_table() {
        let table = table(
            df!(
                "Gasto" => Vec::<f64>::new(),
                "Conversiones" => Vec::<f64>::new(),
                "CTR" => Vec::<f64>::new(),
            )
            .unwrap(),
        );

        let kpis = compute_kpis(&table).unwrap();
        assert_eq!(kpis.gasto_total, Some(0.0));
        assert!(kpis.gasto_total.is_some_and(f64::is_sign_positive));
        assert_eq!(kpis.conversiones, Some(0));
        assert_eq!(kpis.ctr, None);
        assert_eq!(kpis.cpa, None);

        let json = serde_json::to_string(&kpis).unwrap();
        assert!(json.contains("\"gasto_total\":0.0"), "{json}");
    }

    #[test]
    fn test_spend_series_first_seen_order() {
        let table = table(
            df!(
                "Mes" => [Some("2024-02"), Some("2024-01"), None, Some("2024-02")],
                "Gasto" => [1.0, 2.0, 5.0, 3.0],
            )
            .unwrap(),
        );

        let series = spend_series(&table).unwrap().unwrap();
        assert_eq!(series.labels, vec!["2024-02", "2024-01"]);
        assert_eq!(series.gasto, vec![4.0, 2.0]);
    }

    #[test]
    fn test_spend_series_without_period() {
        let table = table(df!("Gasto" => [1.0]).unwrap());
        assert!(spend_series(&table).unwrap().is_none());
    }

    #[test]
    fn test_campaign_summaries_sorted_with_first_row_feedback() {
        let table = table(
            df!(
                "Campaña" => ["Zeta", "Alpha", "Zeta"],
                "Gasto" => [10.0, 5.0, 20.0],
                "Conversiones" => [0.0, 1.0, 2.0],
                "Recomendación" => ["first", "only", "second"],
            )
            .unwrap(),
        );

        let summaries = campaign_summaries(&table).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].nombre, "Alpha");
        assert_eq!(summaries[1].nombre, "Zeta");
        assert_eq!(summaries[1].feedback, "first");
        assert_eq!(summaries[1].kpis.gasto, Some(30.0));
        assert_eq!(summaries[1].kpis.cpa, Some(15.0));
        assert!(summaries[1].grafica.is_none());
    }

    #[test]
    fn test_campaign_summaries_without_column() {
        let table = table(df!("Gasto" => [1.0]).unwrap());
        assert!(campaign_summaries(&table).unwrap().is_empty());
    }
}
