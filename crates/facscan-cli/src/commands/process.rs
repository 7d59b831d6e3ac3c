//! Process command - extract fields from a single invoice.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use facscan_core::models::config::ScanConfig;
use facscan_core::pipeline::file_name;
use facscan_core::{DocumentScanner, InvoiceAnalyzer, OcrResult};

use super::{is_image_file, is_text_file, load_config, load_engine, read_text};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image, or .txt with OCR output)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Tolerance for the total = subtotal + tax check
    #[arg(long)]
    tol: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let result = if is_text_file(&args.input) {
        let text = read_text(&args.input)?;
        InvoiceAnalyzer::from_config(&config.extraction).analyze(&file_name(&args.input), &text)
    } else if is_image_file(&args.input) {
        let engine = load_engine(&config, args.model_dir.as_deref())?;
        DocumentScanner::from_config(engine, &config).scan_file(&args.input)?
    } else {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    };

    let tolerance = args.tol.unwrap_or(config.extraction.math_tolerance);
    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => format_text(&result, tolerance, &config),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn show(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn format_text(result: &OcrResult, tolerance: Decimal, config: &ScanConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", result.file));
    output.push('\n');

    output.push_str(&format!(
        "Unit prices ({}):\n",
        config.extraction.item_keywords.join(", ")
    ));
    for price in &result.numbers {
        output.push_str(&format!("  {}\n", price));
    }
    output.push_str(&format!("  Count: {}\n", result.numbers.len()));
    output.push_str(&format!("  Sum:   {}\n", result.sum));
    output.push_str(&format!("  Avg:   {}\n", show(result.avg)));
    output.push('\n');

    output.push_str("Footer:\n");
    output.push_str(&format!("  Subtotal: {}\n", show(result.subtotal_line)));
    output.push_str(&format!("  IVA:      {}\n", show(result.iva_line)));
    output.push_str(&format!("  Total:    {}\n", show(result.total_line)));

    let check = result.math_check(tolerance);
    let status = match check.ok {
        Some(true) => "ok",
        Some(false) => "mismatch",
        None => "unknown",
    };
    output.push_str(&format!(
        "  Check:    {} (diff {})\n",
        status,
        show(check.diff)
    ));

    output
}
