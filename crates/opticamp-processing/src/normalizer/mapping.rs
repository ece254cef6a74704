//! Canonical vocabulary and the platform column-name table.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A field of the canonical campaign table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "Nombre")]
    Nombre,
    #[serde(rename = "Gasto")]
    Gasto,
    #[serde(rename = "Clics")]
    Clics,
    #[serde(rename = "Conversiones")]
    Conversiones,
    #[serde(rename = "CTR")]
    Ctr,
    #[serde(rename = "CPC")]
    Cpc,
    #[serde(rename = "CPA")]
    Cpa,
    #[serde(rename = "CVR")]
    Cvr,
    #[serde(rename = "Impresiones")]
    Impresiones,
    #[serde(rename = "Mes")]
    Mes,
    #[serde(rename = "Campaña")]
    Campana,
    #[serde(rename = "RankingGasto")]
    RankingGasto,
    #[serde(rename = "ColorCampaña")]
    ColorCampana,
    #[serde(rename = "Recomendación")]
    Recomendacion,
}

impl CanonicalField {
    /// Every canonical field.
    pub const ALL: [CanonicalField; 14] = [
        CanonicalField::Nombre,
        CanonicalField::Gasto,
        CanonicalField::Clics,
        CanonicalField::Conversiones,
        CanonicalField::Ctr,
        CanonicalField::Cpc,
        CanonicalField::Cpa,
        CanonicalField::Cvr,
        CanonicalField::Impresiones,
        CanonicalField::Mes,
        CanonicalField::Campana,
        CanonicalField::RankingGasto,
        CanonicalField::ColorCampana,
        CanonicalField::Recomendacion,
    ];

    /// Fields that must exist after renaming.
    pub const REQUIRED: [CanonicalField; 4] = [
        CanonicalField::Nombre,
        CanonicalField::Gasto,
        CanonicalField::Clics,
        CanonicalField::Conversiones,
    ];

    /// Fields coerced to numbers, in coercion order.
    pub const METRICS: [CanonicalField; 8] = [
        CanonicalField::Gasto,
        CanonicalField::Clics,
        CanonicalField::Conversiones,
        CanonicalField::Ctr,
        CanonicalField::Cpc,
        CanonicalField::Cpa,
        CanonicalField::Cvr,
        CanonicalField::Impresiones,
    ];

    /// Exact column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nombre => "Nombre",
            Self::Gasto => "Gasto",
            Self::Clics => "Clics",
            Self::Conversiones => "Conversiones",
            Self::Ctr => "CTR",
            Self::Cpc => "CPC",
            Self::Cpa => "CPA",
            Self::Cvr => "CVR",
            Self::Impresiones => "Impresiones",
            Self::Mes => "Mes",
            Self::Campana => "Campaña",
            Self::RankingGasto => "RankingGasto",
            Self::ColorCampana => "ColorCampaña",
            Self::Recomendacion => "Recomendación",
        }
    }

    /// Look up a field by its exact column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source column label → canonical field, across Google Ads (ES/EN), Meta,
/// Pinterest and TikTok exports.
static COLUMN_MAP: Lazy<HashMap<&'static str, CanonicalField>> = Lazy::new(|| {
    use CanonicalField::*;

    HashMap::from([
        // Google Ads (ES)
        ("Mes", Mes),
        ("Campaña", Nombre),
        ("Clics", Clics),
        ("Impr.", Impresiones),
        ("CTR", Ctr),
        ("CPC medio", Cpc),
        ("Coste", Gasto),
        ("Conversiones", Conversiones),
        ("Coste/conv.", Cpa),
        ("Tasa de conv.", Cvr),
        // Google Ads (EN)
        ("Campaign", Nombre),
        ("Cost", Gasto),
        ("Clicks", Clics),
        ("All conversions", Conversiones),
        ("Impressions", Impresiones),
        ("Avg. CPC", Cpc),
        // Meta (EN)
        ("Campaign name", Nombre),
        ("Amount spent", Gasto),
        ("Link clicks", Clics),
        ("Results", Conversiones),
        ("Cost per link click", Cpc),
        // Pinterest
        ("Spend", Gasto),
        ("Conversions", Conversiones),
        // TikTok
        ("Ad name", Nombre),
        ("Total spend", Gasto),
        ("Website clicks", Clics),
        ("Reach", Impresiones),
        ("Click-through rate", Ctr),
        ("Cost per click", Cpc),
        // Meta (ES)
        ("Nombre del grupo publicitario", Nombre),
        ("Gasto total", Gasto),
        ("Clics en el Pin", Clics),
        ("Resultado", Conversiones),
        ("Campaña de Performance", Campana),
        ("Campaña Premiere Spotlight", Campana),
    ])
});

/// Canonical target of a trimmed source column label, if it has one.
pub fn canonical_for(label: &str) -> Option<CanonicalField> {
    COLUMN_MAP.get(label).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_labels() {
        assert_eq!(canonical_for("Campaña"), Some(CanonicalField::Nombre));
        assert_eq!(canonical_for("Amount spent"), Some(CanonicalField::Gasto));
        assert_eq!(canonical_for("Reach"), Some(CanonicalField::Impresiones));
        assert_eq!(
            canonical_for("Campaña de Performance"),
            Some(CanonicalField::Campana)
        );
        assert_eq!(canonical_for("CPM"), None);
        assert_eq!(canonical_for("campaign"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(CanonicalField::from_name("Canal"), None);
    }

    #[test]
    fn test_serde_uses_column_names() {
        let json = serde_json::to_string(&CanonicalField::Recomendacion).unwrap();
        assert_eq!(json, "\"Recomendación\"");
    }
}
