//! CLI entry point for the campaign analysis pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use opticamp_processing::{
    AnalysisConfig, AnalysisOutcome, AnalysisPipeline, AnalysisReport, CampaignFilter,
    ErrorPayload, ReportGenerator, WkhtmltopdfRenderer, render_document, write_canonical_csv,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Campaign export analysis",
    long_about = "Normalizes Google Ads, Meta, TikTok and Pinterest campaign exports,\n\
                  derives KPIs and produces per-row recommendations.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  WKHTMLTOPDF_PATH    Path to the wkhtmltopdf executable (used by --pdf)\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  opticamp -i campaigns.csv\n\n  \
                  # Dashboard payload as JSON\n  \
                  opticamp -i campaigns.csv --json\n\n  \
                  # Only Meta campaigns spending between 100 and 500\n  \
                  opticamp -i campaigns.csv --channel Meta --min-spend 100 --max-spend 500"
)]
struct Args {
    /// Path to the campaign export to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Output the dashboard payload as JSON instead of a summary
    ///
    /// Disables all logs; failures print the error payload as JSON.
    #[arg(long)]
    json: bool,

    /// Write the full report as JSON to this path
    #[arg(short = 'r', long)]
    report: Option<PathBuf>,

    /// Write the canonical table as CSV to this path
    #[arg(long)]
    output_csv: Option<PathBuf>,

    /// Render a summary document to this path with wkhtmltopdf
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Path to the wkhtmltopdf executable
    #[arg(long, env = "WKHTMLTOPDF_PATH")]
    wkhtmltopdf: Option<PathBuf>,

    /// Logo embedded in the summary document
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Keep only rows of this channel (`Canal` column)
    #[arg(long)]
    channel: Option<String>,

    /// Keep only rows of this campaign type (`Tipo` column)
    #[arg(long)]
    kind: Option<String>,

    /// Minimum spend, inclusive
    #[arg(long, requires = "max_spend")]
    min_spend: Option<f64>,

    /// Maximum spend, inclusive
    #[arg(long, requires = "min_spend")]
    max_spend: Option<f64>,

    /// Rows in the preview table
    #[arg(long, default_value = "20")]
    preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final result
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the JSON payload.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed arguments
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let mut config_builder = AnalysisConfig::builder().preview_rows(args.preview_rows);
    if let Some(ref path) = args.wkhtmltopdf {
        config_builder = config_builder.wkhtmltopdf_path(path);
    }
    if let Some(ref path) = args.logo {
        config_builder = config_builder.logo_path(path);
    }
    let config = config_builder.build()?;

    let pipeline = AnalysisPipeline::builder().config(config).build()?;
    let filter = build_filter(&args);

    match pipeline.analyze_file(&args.input, filter) {
        Ok(outcome) => handle_outcome(&pipeline, &outcome, &args),
        Err(e) => {
            let payload = ErrorPayload::from(&e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                error!("{}", e);
                if let Some(diagnostic) = payload.diagnostico.as_ref() {
                    eprintln!("{}", serde_json::to_string_pretty(diagnostic)?);
                }
            }
            Err(anyhow!("Analysis failed [{}]: {}", e.error_code(), payload.error))
        }
    }
}

fn build_filter(args: &Args) -> CampaignFilter {
    CampaignFilter {
        channel: args.channel.clone(),
        kind: args.kind.clone(),
        spend_range: args.min_spend.zip(args.max_spend),
    }
}

/// Write the requested exports, then print the report.
///
/// Output behavior:
/// - Default: human-readable summary on stdout
/// - `--json`: the dashboard payload on stdout only
fn handle_outcome(pipeline: &AnalysisPipeline, outcome: &AnalysisOutcome, args: &Args) -> Result<()> {
    if let Some(ref path) = args.report {
        ReportGenerator::write_report_to_file(&outcome.report, path)?;
    }

    if let Some(ref path) = args.output_csv {
        write_canonical_csv(&outcome.table, path)?;
    }

    if let Some(ref path) = args.pdf {
        export_document(pipeline.config(), outcome, path);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    print_human_readable_summary(outcome, args);
    Ok(())
}

/// Render the summary document. Failures are reported but never fail the run.
fn export_document(config: &AnalysisConfig, outcome: &AnalysisOutcome, path: &Path) {
    let Some(executable) = config.wkhtmltopdf_path.as_ref() else {
        warn!("No wkhtmltopdf executable configured; set WKHTMLTOPDF_PATH or --wkhtmltopdf");
        return;
    };

    let renderer = WkhtmltopdfRenderer::new(executable, config.min_document_bytes);
    let rendered = render_document(
        &outcome.table,
        &outcome.report.feedback,
        config.logo_path.as_deref(),
        &renderer,
    );

    match rendered {
        Ok(bytes) => match std::fs::write(path, bytes) {
            Ok(()) => info!("Summary document written to: {}", path.display()),
            Err(e) => warn!("Could not write {}: {}", path.display(), e),
        },
        Err(e) => warn!("Summary document not generated: {}", e),
    }
}

fn format_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Print a human-readable summary of the analysis.
fn print_human_readable_summary(outcome: &AnalysisOutcome, args: &Args) {
    let AnalysisReport {
        kpis,
        feedback,
        campanas,
        grafica_global,
        ..
    } = &outcome.report;
    let decoding = &outcome.decoding;

    println!();
    println!("{}", "=".repeat(80));
    println!("CAMPAIGN ANALYSIS");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input: {} ({} rows, encoding {}, delimiter '{}')",
        args.input.display(),
        outcome.table.height(),
        decoding.encoding.label(),
        decoding.delimiter
    );
    if let Some(row) = decoding.header_row {
        println!("Header found on line {}", row + 1);
    }
    println!();

    println!("Global KPIs:");
    println!("  Spend:       {}", format_amount(kpis.gasto_total));
    println!(
        "  Conversions: {}",
        kpis.conversiones
            .map_or_else(|| "-".to_string(), |c| c.to_string())
    );
    println!("  CTR:         {}", format_amount(kpis.ctr));
    println!("  CPA:         {}", format_amount(kpis.cpa));
    println!();
    println!("Feedback: {}", feedback);
    println!();

    if let Some(series) = grafica_global {
        println!("Spend per period:");
        for (label, spend) in series.labels.iter().zip(&series.gasto) {
            println!("  {:<20} {:>12.2}", label, spend);
        }
        println!();
    }

    if !campanas.is_empty() {
        println!("Campaigns:");
        println!(
            "  {:<30} {:>12} {:>8} {:>8} {:>10}",
            "Name", "Spend", "Conv.", "CTR", "CPA"
        );
        println!("  {}", "-".repeat(72));
        for campaign in campanas {
            println!(
                "  {:<30} {:>12} {:>8} {:>8} {:>10}",
                truncate_str(&campaign.nombre, 29),
                format_amount(campaign.kpis.gasto),
                campaign
                    .kpis
                    .conversiones
                    .map_or_else(|| "-".to_string(), |c| c.to_string()),
                format_amount(campaign.kpis.ctr),
                format_amount(campaign.kpis.cpa)
            );
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}

/// Truncate a string to max characters with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
