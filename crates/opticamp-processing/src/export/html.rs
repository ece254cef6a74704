//! HTML summary document of a campaign table.

use crate::error::Result;
use crate::normalizer::CanonicalField;
use crate::table::CanonicalTable;
use chrono::Local;
use polars::prelude::*;
use std::path::Path;

/// Document columns and their headers, in display order.
pub const DOCUMENT_COLUMNS: [(&str, &str); 8] = [
    ("Campaña", "Nombre campaña"),
    ("Gasto", "Gasto (€)"),
    ("Clics", "Clics"),
    ("Conversiones", "Conversiones"),
    ("CTR", "CTR (%)"),
    ("CPC", "CPC (€)"),
    ("CPA", "CPA (€)"),
    ("Recomendación", "Acción recomendada"),
];

pub const DOCUMENT_TITLE: &str = "Resumen de Campañas";

const STYLE: &str = "\
body { font-family: Inter, Arial, sans-serif; color: #111; background: #fff; }
h1 { color: #2563eb; }
.feedback { margin-bottom: 1.5rem; }
.tabla-campanas { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }
.tabla-campanas th, .tabla-campanas td { border: 1px solid #cbd5e1; padding: 8px; text-align: center; }
.tabla-campanas th { background: #e0e7ef; color: #2563eb; font-weight: 700; }
.tabla-campanas td { background: #f8fafc; }
.generado { color: #64748b; font-size: 0.8rem; }";

/// Build the summary document.
///
/// The campaign column falls back to `Nombre` when the table has no
/// `Campaña`. The logo is included only when the file exists.
pub fn build_document_html(
    table: &CanonicalTable,
    feedback: &str,
    logo: Option<&Path>,
) -> Result<String> {
    let frame = table.frame();

    let mut columns: Vec<(&Series, &str)> = Vec::with_capacity(DOCUMENT_COLUMNS.len());
    for (source, header) in DOCUMENT_COLUMNS {
        let column = match source {
            "Campaña" => frame
                .column(CanonicalField::Campana.as_str())
                .or_else(|_| frame.column(CanonicalField::Nombre.as_str())),
            other => frame.column(other),
        };
        if let Ok(column) = column {
            columns.push((column.as_materialized_series(), header));
        }
    }

    let mut html = String::new();
    html.push_str("<html><head><meta charset=\"utf-8\">\n<style>\n");
    html.push_str(STYLE);
    html.push_str("\n</style></head><body>\n");

    if let Some(logo) = logo.filter(|path| path.is_file()) {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"Logo\" style=\"height:60px;margin-bottom:1.5rem;\">\n",
            escape_html(&logo.display().to_string())
        ));
    }

    html.push_str(&format!("<h1>{}</h1>\n", escape_html(DOCUMENT_TITLE)));
    if !feedback.is_empty() {
        html.push_str(&format!(
            "<p class=\"feedback\">{}</p>\n",
            escape_html(feedback)
        ));
    }

    html.push_str("<table class=\"tabla-campanas\">\n<thead><tr>");
    for (_, header) in &columns {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for i in 0..frame.height() {
        html.push_str("<tr>");
        for (series, _) in &columns {
            html.push_str(&format!(
                "<td>{}</td>",
                escape_html(&format_cell(&series.get(i)?))
            ));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str(&format!(
        "<p class=\"generado\">Generado el {}</p>\n",
        Local::now().format("%d/%m/%Y %H:%M")
    ));
    html.push_str("</body></html>\n");

    Ok(html)
}

/// Render a cell for display: whole numbers without decimals, other
/// numbers with two.
pub(crate) fn format_cell(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format_number(*v),
        AnyValue::Float32(v) => format_number(f64::from(*v)),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CanonicalTable {
        CanonicalTable::from_frame(
            df!(
                "Nombre" => ["<Brand> & Co"],
                "Gasto" => [10.5],
                "Clics" => [100.0],
                "Conversiones" => [5.0],
                "CTR" => [2.0],
                "CPC" => [0.105],
                "CVR" => [5.0],
                "Recomendación" => ["performance good, keep monitoring"],
            )
            .unwrap(),
        )
    }

    fn headers(html: &str) -> Vec<String> {
        html.split("<th>")
            .skip(1)
            .map(|part| part.split("</th>").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_nombre_aliased_and_columns_ordered() {
        let html = build_document_html(&table(), "", None).unwrap();

        assert_eq!(
            headers(&html),
            vec![
                "Nombre campaña",
                "Gasto (€)",
                "Clics",
                "Conversiones",
                "CTR (%)",
                "CPC (€)",
                "Acción recomendada"
            ]
        );
        assert!(html.contains("<td>&lt;Brand&gt; &amp; Co</td>"));
        assert!(html.contains("<td>10.50</td>"));
        assert!(html.contains("<td>100</td>"));
        assert!(html.contains("<h1>Resumen de Campañas</h1>"));
        assert!(!html.contains("CVR"));
    }

    #[test]
    fn test_campana_column_preferred_over_nombre() {
        let table = CanonicalTable::from_frame(
            df!(
                "Campaña" => ["Search"],
                "Nombre" => ["Ad group"],
                "Gasto" => [1.0],
            )
            .unwrap(),
        );
        let html = build_document_html(&table, "ok", None).unwrap();

        assert!(html.contains("<td>Search</td>"));
        assert!(!html.contains("Ad group"));
        assert!(html.contains("<p class=\"feedback\">ok</p>"));
    }

    #[test]
    fn test_logo_only_when_file_exists() {
        let missing = build_document_html(&table(), "", Some(Path::new("/nonexistent/logo.png")))
            .unwrap();
        assert!(!missing.contains("<img"));

        let logo = tempfile::NamedTempFile::new().unwrap();
        let present = build_document_html(&table(), "", Some(logo.path())).unwrap();
        assert!(present.contains("<img src="));
    }

    #[test]
    fn test_document_sections_on_own_lines() {
        let html = build_document_html(&table(), "Keep <testing>", None).unwrap();
        let lines: Vec<&str> = html.lines().collect();

        assert!(lines.contains(&"<h1>Resumen de Campañas</h1>"));
        assert!(lines.contains(&"<p class=\"feedback\">Keep &lt;testing&gt;</p>"));
        assert!(
            lines
                .iter()
                .any(|line| line.starts_with("<p class=\"generado\">Generado el "))
        );
        assert_eq!(lines.last(), Some(&"</body></html>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a\"b'c"), "a&quot;b&#39;c");
    }
}
