//! Schema normalization.
//!
//! Turns a raw decoded table into a [`CanonicalTable`]:
//!
//! 1. trim column names
//! 2. rename platform labels to canonical names
//! 3. check the required fields
//! 4. coerce metric columns to `Float64`
//! 5. derive `CTR`, `CPC` and `CVR` when absent
//! 6. annotate `RankingGasto` and `ColorCampaña`

mod derive;
mod mapping;

pub use derive::{PALETTE, campaign_colors, ratio, spend_ranking};
pub use mapping::{CanonicalField, canonical_for};

use crate::error::{AnalysisError, Result, ResultExt};
use crate::table::CanonicalTable;
use crate::utils::{parse_float_robust, parse_metric_str};
use polars::prelude::*;
use tracing::{debug, info};

/// Maps heterogeneous platform exports onto the canonical schema.
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    /// Normalize a raw table. `source_name` is only used for logging.
    ///
    /// Fails with [`AnalysisError::SchemaMismatch`] when a required field is
    /// missing after renaming; no partial table is returned.
    pub fn normalize(raw: DataFrame, source_name: &str) -> Result<CanonicalTable> {
        info!(
            "Normalizing '{}' ({} rows, {} columns)",
            source_name,
            raw.height(),
            raw.width()
        );

        let mut df = Self::rename_columns(raw)?;

        let found: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let missing: Vec<String> = CanonicalField::REQUIRED
            .iter()
            .filter(|field| !found.iter().any(|name| name == field.as_str()))
            .map(|field| field.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::SchemaMismatch { missing, found });
        }

        for field in CanonicalField::METRICS {
            if df.column(field.as_str()).is_ok() {
                coerce_metric(&mut df, field.as_str())
                    .context(format!("Coercing column '{field}'"))?;
            }
        }

        let mut table = CanonicalTable::from_frame(df);
        Self::derive_metrics(&mut table)?;
        Self::annotate(&mut table)?;

        debug!("Canonical columns: {:?}", table.column_names());
        Ok(table)
    }

    /// Trim names and apply the platform table.
    ///
    /// A canonical name already present literally is never overwritten by a
    /// rename, and when several columns end up with the same name the last
    /// one in file order is kept.
    fn rename_columns(raw: DataFrame) -> Result<DataFrame> {
        let trimmed: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        let targets: Vec<String> = trimmed
            .iter()
            .map(|name| match canonical_for(name) {
                Some(field) if field.as_str() == name => name.clone(),
                Some(field) if CanonicalField::from_name(name).is_some()
                    && trimmed.iter().any(|other| other == field.as_str()) =>
                {
                    name.clone()
                }
                Some(field) => field.as_str().to_string(),
                None => name.clone(),
            })
            .collect();

        let mut columns = Vec::with_capacity(targets.len());
        for (i, (column, target)) in raw.get_columns().iter().zip(&targets).enumerate() {
            if targets[i + 1..].contains(target) {
                debug!("Column '{}' superseded by a later '{}'", column.name(), target);
                continue;
            }
            if column.name().as_str() != target {
                debug!("Renaming '{}' -> '{}'", column.name(), target);
            }
            let mut column = column.clone();
            column.rename(target.as_str().into());
            columns.push(column);
        }

        Ok(DataFrame::new(columns)?)
    }

    fn derive_metrics(table: &mut CanonicalTable) -> Result<()> {
        let spend = required_metric(table, CanonicalField::Gasto)?;
        let clicks = required_metric(table, CanonicalField::Clics)?;
        let conversions = required_metric(table, CanonicalField::Conversiones)?;

        if !table.has(CanonicalField::Ctr) {
            if let Some(impressions) = table.metric(CanonicalField::Impresiones)? {
                add_metric(table, CanonicalField::Ctr, ratio(&clicks, &impressions, 100.0))?;
            }
        }
        if !table.has(CanonicalField::Cpc) {
            add_metric(table, CanonicalField::Cpc, ratio(&spend, &clicks, 1.0))?;
        }
        if !table.has(CanonicalField::Cvr) {
            add_metric(table, CanonicalField::Cvr, ratio(&conversions, &clicks, 100.0))?;
        }

        Ok(())
    }

    fn annotate(table: &mut CanonicalTable) -> Result<()> {
        let spend = required_metric(table, CanonicalField::Gasto)?;
        table.set_column(Series::new(
            CanonicalField::RankingGasto.as_str().into(),
            spend_ranking(&spend),
        ))?;

        let names = table.text(CanonicalField::Nombre)?.unwrap_or_default();
        table.set_text(CanonicalField::ColorCampana, campaign_colors(&names))
    }
}

/// Replace a column with its robustly parsed `Float64` values.
fn coerce_metric(df: &mut DataFrame, name: &str) -> Result<()> {
    let series = df.column(name)?.as_materialized_series();
    let values: Vec<f64> = if series.dtype() == &DataType::String {
        series
            .str()?
            .into_iter()
            .map(|v| v.map(parse_metric_str).unwrap_or(0.0))
            .collect()
    } else {
        (0..series.len())
            .map(|i| series.get(i).map(|v| parse_float_robust(&v)))
            .collect::<PolarsResult<Vec<f64>>>()?
    };
    df.replace(name, Series::new(name.into(), values))?;
    Ok(())
}

fn required_metric(table: &CanonicalTable, field: CanonicalField) -> Result<Vec<f64>> {
    table
        .metric(field)?
        .ok_or_else(|| AnalysisError::SchemaMismatch {
            missing: vec![field.as_str().to_string()],
            found: table.column_names(),
        })
}

fn add_metric(table: &mut CanonicalTable, field: CanonicalField, values: Vec<f64>) -> Result<()> {
    debug!("Deriving {}", field);
    table.set_column(Series::new(field.as_str().into(), values))
}
