use super::aggregation::{
    CampaignSummary, KpiSummary, SpendSeries, campaign_summaries, compute_kpis, spend_series,
};
use crate::decisions::GlobalFeedback;
use crate::decoder::DecodeDiagnostic;
use crate::error::{AnalysisError, Result};
use crate::table::CanonicalTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Columns of the preview table, in display order.
pub const PREVIEW_COLUMNS: [&str; 11] = [
    "Campaña",
    "Nombre",
    "Gasto",
    "Clics",
    "Conversiones",
    "CTR",
    "CPC",
    "CPA",
    "ROAS",
    "CPM",
    "Recomendación",
];

/// Dashboard payload of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub kpis: KpiSummary,
    pub feedback: String,
    pub grafica_global: Option<SpendSeries>,
    pub campanas: Vec<CampaignSummary>,
    /// Leading rows of the table as records keyed by column name.
    pub tabla: Vec<Map<String, Value>>,
}

/// Body returned for a request that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostico: Option<DecodeDiagnostic>,
}

impl From<&AnalysisError> for ErrorPayload {
    fn from(error: &AnalysisError) -> Self {
        let message = match error {
            AnalysisError::WithContext { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            error: message,
            diagnostico: error.diagnostic().cloned(),
        }
    }
}

/// Builds dashboard payloads from canonical tables.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    preview_rows: usize,
}

impl ReportGenerator {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    /// Aggregate a table into its dashboard payload.
    pub fn build_report(&self, table: &CanonicalTable) -> Result<AnalysisReport> {
        let kpis = compute_kpis(table)?;
        let feedback = GlobalFeedback::from_kpis(&kpis);
        debug!("Global KPIs: {:?} -> {:?}", kpis, feedback);

        let report = AnalysisReport {
            feedback: feedback.message().to_string(),
            grafica_global: spend_series(table)?,
            campanas: campaign_summaries(table)?,
            tabla: table.records(&PREVIEW_COLUMNS, self.preview_rows)?,
            kpis,
        };

        info!(
            "Report built: {} campaigns, {} preview rows",
            report.campanas.len(),
            report.tabla.len()
        );
        Ok(report)
    }

    /// Write a report as pretty JSON.
    pub fn write_report_to_file(report: &AnalysisReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)
            .map_err(|e| AnalysisError::Io(e).with_context(path.display().to_string()))?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ManualPreview;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table() -> CanonicalTable {
        CanonicalTable::from_frame(
            df!(
                "Mes" => ["Ene", "Feb", "Ene"],
                "Campaña" => ["B", "A", "B"],
                "Nombre" => ["B1", "A1", "B2"],
                "Gasto" => [10.0, 20.0, 30.0],
                "Clics" => [100.0, 10.0, 50.0],
                "Conversiones" => [0.0, 0.0, 0.0],
                "CTR" => [2.0, 0.5, 1.0],
                "Recomendación" => ["r1", "r2", "r3"],
                "ColorCampaña" => ["#2563eb", "#10b981", "#f59e42"],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_report_payload_shape() {
        let report = ReportGenerator::new(2).build_report(&table()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json["kpis"],
            json!({"gasto_total": 60.0, "conversiones": 0, "ctr": 1.1666666666666667, "cpa": null})
        );
        assert_eq!(
            json["feedback"],
            json!(GlobalFeedback::NoConversions.message())
        );
        assert_eq!(
            json["grafica_global"],
            json!({"labels": ["Ene", "Feb"], "gasto": [40.0, 20.0]})
        );
        assert_eq!(json["campanas"][0]["nombre"], json!("A"));
        assert_eq!(json["campanas"][1]["kpis"]["gasto"], json!(40.0));
        assert_eq!(json["campanas"][1]["feedback"], json!("r1"));
        assert_eq!(json["tabla"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_preview_excludes_annotations() {
        let report = ReportGenerator::new(20).build_report(&table()).unwrap();
        let keys: Vec<&String> = report.tabla[0].keys().collect();
        assert_eq!(
            keys,
            vec![
                "Campaña",
                "Nombre",
                "Gasto",
                "Clics",
                "Conversiones",
                "CTR",
                "Recomendación"
            ]
        );
    }

    #[test]
    fn test_error_payload_carries_diagnostic() {
        let error = AnalysisError::from(DecodeDiagnostic {
            errors: vec!["x".to_string()],
            preview: ManualPreview::Unavailable("y".to_string()),
            detected_columns: vec![],
        })
        .with_context("upload.csv");

        let payload = ErrorPayload::from(&error);
        assert_eq!(
            payload.error,
            "Could not read the CSV file. Try another delimiter or check the format."
        );
        assert!(payload.diagnostico.is_some());
    }

    #[test]
    fn test_error_payload_without_diagnostic() {
        let error = AnalysisError::SchemaMismatch {
            missing: vec!["Gasto".to_string()],
            found: vec!["Nombre".to_string()],
        };
        let json = serde_json::to_value(ErrorPayload::from(&error)).unwrap();
        assert!(json.get("diagnostico").is_none());
        assert!(json["error"].as_str().unwrap().contains("Gasto"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = ReportGenerator::new(1).build_report(&table()).unwrap();

        ReportGenerator::write_report_to_file(&report, &path).unwrap();

        let read: AnalysisReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.campanas.len(), 2);
    }
}
