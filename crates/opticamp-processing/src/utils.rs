//! Shared utilities for the campaign analysis pipeline.
//!
//! Numeric parsing here never fails: anything that cannot be read as a
//! finite, non-negative number becomes `0.0`.

use polars::prelude::*;

// =============================================================================
// Metric Parsing Utilities
// =============================================================================

/// Characters removed from a cell before numeric parsing: percent sign,
/// space, narrow no-break space, no-break space and double quote.
pub const STRIPPED_CHARS: [char; 5] = ['%', ' ', '\u{202f}', '\u{a0}', '"'];

/// Separators of several values exported into a single cell.
pub const MULTI_VALUE_SEPARATORS: [char; 3] = [';', '\t', '|'];

/// Normalize a raw metric string: strip formatting characters, turn the
/// decimal comma into a point and keep only the first of several
/// concatenated values.
///
/// # Example
///
/// ```rust,ignore
/// use opticamp_processing::utils::clean_metric_string;
///
/// assert_eq!(clean_metric_string("12%;3"), "12");
/// assert_eq!(clean_metric_string("1 234,5"), "1234.5");
/// ```
pub fn clean_metric_string(s: &str) -> String {
    let stripped: String = s.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    let dotted = stripped.replace(',', ".");
    dotted
        .split(|c| MULTI_VALUE_SEPARATORS.contains(&c))
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Parse a metric string the way ad-platform exports write numbers.
///
/// Locale decimal commas, percent signs and thin spaces are accepted.
/// Returns `0.0` for anything unparsable.
pub fn parse_metric_str(s: &str) -> f64 {
    clean_metric_string(s)
        .trim()
        .parse::<f64>()
        .map(sanitize_metric)
        .unwrap_or(0.0)
}

/// Parse any cell value into a metric.
///
/// - null → `0.0`
/// - numeric → cast directly
/// - string → [`parse_metric_str`]
/// - anything else → `0.0`
///
/// The result is always finite and never negative.
pub fn parse_float_robust(value: &AnyValue<'_>) -> f64 {
    let parsed = match value {
        AnyValue::Null => 0.0,
        AnyValue::Boolean(b) => f64::from(u8::from(*b)),
        AnyValue::Int8(v) => f64::from(*v),
        AnyValue::Int16(v) => f64::from(*v),
        AnyValue::Int32(v) => f64::from(*v),
        AnyValue::Int64(v) => *v as f64,
        AnyValue::UInt8(v) => f64::from(*v),
        AnyValue::UInt16(v) => f64::from(*v),
        AnyValue::UInt32(v) => f64::from(*v),
        AnyValue::UInt64(v) => *v as f64,
        AnyValue::Float32(v) => f64::from(*v),
        AnyValue::Float64(v) => *v,
        AnyValue::String(s) => return parse_metric_str(s),
        AnyValue::StringOwned(s) => return parse_metric_str(s.as_str()),
        _ => 0.0,
    };
    sanitize_metric(parsed)
}

/// Map non-finite and negative values to `0.0`.
#[inline]
pub fn sanitize_metric(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Divide, replacing a zero denominator by one.
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    let denominator = if denominator == 0.0 { 1.0 } else { denominator };
    numerator / denominator
}

/// Truncate a metric to an integer count the way the dashboard does.
#[inline]
pub fn metric_to_count(value: f64) -> u64 {
    sanitize_metric(value).trunc() as u64
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_metric_string() {
        assert_eq!(clean_metric_string("12%;3"), "12");
        assert_eq!(clean_metric_string("\"1 234,5\""), "1234.5");
        assert_eq!(clean_metric_string("7\u{202f}000"), "7000");
        assert_eq!(clean_metric_string("3|4"), "3");
        assert_eq!(clean_metric_string("5\t6"), "5");
    }

    #[test]
    fn test_parse_metric_str() {
        assert_eq!(parse_metric_str("10,50"), 10.5);
        assert_eq!(parse_metric_str("12%;3"), 12.0);
        assert_eq!(parse_metric_str("4,2 %"), 4.2);
        assert_eq!(parse_metric_str("1\u{a0}500"), 1500.0);
        assert_eq!(parse_metric_str(""), 0.0);
        assert_eq!(parse_metric_str("n/a"), 0.0);
        assert_eq!(parse_metric_str("1.234,56"), 0.0);
    }

    #[test]
    fn test_parse_metric_str_never_returns_non_finite() {
        for raw in ["inf", "-inf", "NaN", "1e400", "-3", "--", "€"] {
            let value = parse_metric_str(raw);
            assert!(value.is_finite() && value >= 0.0, "{raw} -> {value}");
        }
    }

    #[test]
    fn test_parse_float_robust_any_value() {
        assert_eq!(parse_float_robust(&AnyValue::Null), 0.0);
        assert_eq!(parse_float_robust(&AnyValue::Int64(7)), 7.0);
        assert_eq!(parse_float_robust(&AnyValue::Float64(2.5)), 2.5);
        assert_eq!(parse_float_robust(&AnyValue::Float64(f64::NAN)), 0.0);
        assert_eq!(parse_float_robust(&AnyValue::String("3,5%")), 3.5);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(3.0, 0.0), 3.0);
    }

    #[test]
    fn test_metric_to_count() {
        assert_eq!(metric_to_count(5.9), 5);
        assert_eq!(metric_to_count(0.0), 0);
    }
}
