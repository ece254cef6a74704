//! Channel, type and spend filtering of the canonical table.

use crate::error::Result;
use crate::normalizer::CanonicalField;
use crate::table::CanonicalTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value meaning "no filter" for channel and type.
pub const ALL_VALUES: &str = "Todos";

/// Column holding the advertising channel.
pub const CHANNEL_COLUMN: &str = "Canal";

/// Column holding the campaign type.
pub const KIND_COLUMN: &str = "Tipo";

/// Row filter applied after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilter {
    /// Keep rows whose `Canal` equals this value.
    pub channel: Option<String>,
    /// Keep rows whose `Tipo` equals this value.
    pub kind: Option<String>,
    /// Inclusive `(min, max)` bounds on `Gasto`.
    pub spend_range: Option<(f64, f64)>,
}

impl CampaignFilter {
    pub fn is_empty(&self) -> bool {
        active(&self.channel).is_none() && active(&self.kind).is_none() && self.spend_range.is_none()
    }

    /// Keep the matching rows.
    ///
    /// Channel and type only apply when their column exists.
    pub fn apply(&self, table: &CanonicalTable) -> Result<CanonicalTable> {
        let mut mask = vec![true; table.height()];

        for (value, column) in [(&self.channel, CHANNEL_COLUMN), (&self.kind, KIND_COLUMN)] {
            let Some(wanted) = active(value) else {
                continue;
            };
            if let Some(values) = table.text_column(column)? {
                for (keep, actual) in mask.iter_mut().zip(values) {
                    *keep &= actual.as_deref() == Some(wanted);
                }
            }
        }

        if let Some((min, max)) = self.spend_range {
            let spend = table
                .metric(CanonicalField::Gasto)?
                .unwrap_or_else(|| vec![0.0; table.height()]);
            for (keep, value) in mask.iter_mut().zip(spend) {
                *keep &= min <= value && value <= max;
            }
        }

        let filtered = table.filter_rows(&mask)?;
        debug!("Filter kept {} of {} rows", filtered.height(), table.height());
        Ok(filtered)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| *v != ALL_VALUES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn table() -> CanonicalTable {
        CanonicalTable::from_frame(
            df!(
                "Nombre" => ["A", "B", "C", "D"],
                "Gasto" => [5.0, 15.0, 25.0, 15.0],
                "Canal" => ["Google", "Meta", "Google", "Google"],
                "Tipo" => ["Search", "Video", "Video", "Search"],
            )
            .unwrap(),
        )
    }

    fn names(table: &CanonicalTable) -> Vec<String> {
        table
            .text(CanonicalField::Nombre)
            .unwrap()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = CampaignFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&table()).unwrap().height(), 4);
    }

    #[test]
    fn test_todos_means_no_filter() {
        let filter = CampaignFilter {
            channel: Some("Todos".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&table()).unwrap().height(), 4);
    }

    #[test]
    fn test_channel_kind_and_spend() {
        let filter = CampaignFilter {
            channel: Some("Google".to_string()),
            kind: Some("Search".to_string()),
            spend_range: Some((10.0, 20.0)),
        };
        assert_eq!(names(&filter.apply(&table()).unwrap()), vec!["D"]);
    }

    #[test]
    fn test_spend_bounds_are_inclusive() {
        let filter = CampaignFilter {
            spend_range: Some((5.0, 15.0)),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&table()).unwrap()), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_missing_channel_column_is_ignored() {
        let table = CanonicalTable::from_frame(
            df!("Nombre" => ["A"], "Gasto" => [1.0]).unwrap(),
        );
        let filter = CampaignFilter {
            channel: Some("Meta".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&table).unwrap().height(), 1);
    }
}
