//! The canonical campaign table.

use crate::error::Result;
use crate::normalizer::CanonicalField;
use crate::utils::{parse_metric_str, sanitize_metric};
use polars::prelude::*;
use serde_json::{Map, Number, Value};

/// A normalized campaign table.
///
/// Holds at least `Nombre`, `Gasto`, `Clics` and `Conversiones`. Metric
/// columns are `Float64` with finite, non-negative values. Columns that are
/// not part of the canonical vocabulary (`CPM`, `Canal`, ...) are kept as
/// they came. Row order is file order.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    frame: DataFrame,
}

impl CanonicalTable {
    /// Wrap an already normalized frame.
    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.has_column(field.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Values of a metric column as floats, `None` when the column is absent.
    pub fn metric(&self, field: CanonicalField) -> Result<Option<Vec<f64>>> {
        self.numeric_column(field.as_str())
    }

    /// Values of any column read as floats. Nulls and unreadable values are 0.
    pub fn numeric_column(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let Ok(column) = self.frame.column(name) else {
            return Ok(None);
        };
        let series = column.as_materialized_series();
        let values = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .map(|v| v.map(parse_metric_str).unwrap_or(0.0))
                .collect(),
            _ => series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.map(sanitize_metric).unwrap_or(0.0))
                .collect(),
        };
        Ok(Some(values))
    }

    /// Values of a text field, `None` when the column is absent.
    pub fn text(&self, field: CanonicalField) -> Result<Option<Vec<Option<String>>>> {
        self.text_column(field.as_str())
    }

    /// Values of any column rendered as strings.
    pub fn text_column(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        let Ok(column) = self.frame.column(name) else {
            return Ok(None);
        };
        let series = column.as_materialized_series().cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(Some(values))
    }

    /// Add or replace a column.
    pub(crate) fn set_column(&mut self, series: Series) -> Result<()> {
        self.frame.with_column(series)?;
        Ok(())
    }

    pub(crate) fn set_text(&mut self, field: CanonicalField, values: Vec<String>) -> Result<()> {
        self.set_column(Series::new(field.as_str().into(), values))
    }

    /// Keep the rows whose mask entry is `true`.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<CanonicalTable> {
        let mask = Series::new("mask".into(), mask);
        let frame = self.frame.filter(mask.bool()?)?;
        Ok(Self { frame })
    }

    /// Rows at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> Result<CanonicalTable> {
        let indices: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
        let indices = IdxCa::from_vec("idx".into(), indices);
        let frame = self.frame.take(&indices)?;
        Ok(Self { frame })
    }

    /// First `limit` rows as JSON records restricted to `columns` (those that
    /// exist, in the given order).
    pub fn records(&self, columns: &[&str], limit: usize) -> Result<Vec<Map<String, Value>>> {
        let present: Vec<&Series> = columns
            .iter()
            .filter_map(|name| self.frame.column(name).ok())
            .map(|column| column.as_materialized_series())
            .collect();

        let rows = self.frame.height().min(limit);
        let mut records = Vec::with_capacity(rows);

        for i in 0..rows {
            let mut record = Map::new();
            for series in &present {
                record.insert(series.name().to_string(), any_value_to_json(&series.get(i)?));
            }
            records.push(record);
        }

        Ok(records)
    }
}

/// Convert a cell into a JSON value.
pub(crate) fn any_value_to_json(value: &AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => float_to_json(f64::from(*v)),
        AnyValue::Float64(v) => float_to_json(*v),
        AnyValue::String(s) => Value::String((*s).to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(other.to_string()),
    }
}

fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
