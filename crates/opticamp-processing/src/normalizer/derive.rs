//! Derived metrics and display annotations.

use crate::utils::safe_div;
use std::collections::HashMap;

/// Colors assigned to campaigns in first-seen order.
pub const PALETTE: [&str; 10] = [
    "#2563eb", "#10b981", "#f59e42", "#ef4444", "#a855f7", "#fbbf24", "#14b8a6", "#6366f1",
    "#eab308", "#f472b6",
];

/// `numerator / denominator × scale` per row, a zero denominator counting as 1.
pub fn ratio(numerator: &[f64], denominator: &[f64], scale: f64) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(&n, &d)| safe_div(n, d) * scale)
        .collect()
}

/// Rank by descending spend, ties sharing the lowest rank (1 = highest spend).
pub fn spend_ranking(spend: &[f64]) -> Vec<u32> {
    let mut sorted = spend.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    spend
        .iter()
        .map(|&v| (sorted.partition_point(|&x| x > v) + 1) as u32)
        .collect()
}

/// Palette color per row, keyed by the first appearance of each name.
pub fn campaign_colors(names: &[Option<String>]) -> Vec<String> {
    let mut first_seen: HashMap<Option<&str>, usize> = HashMap::new();

    names
        .iter()
        .map(|name| {
            let next = first_seen.len();
            let index = *first_seen.entry(name.as_deref()).or_insert(next);
            PALETTE[index % PALETTE.len()].to_string()
        })
        .collect()
}
