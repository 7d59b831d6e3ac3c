//! Batch processing command: a folder (or glob) of invoices into one CSV report.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use facscan_core::pipeline::file_name;
use facscan_core::{
    check_value, DocumentScanner, InvoiceAnalyzer, OcrBackend, OcrResult, PureOcrEngine, ScanConfig,
};

use super::{is_image_file, is_text_file, load_config, load_engine, read_text};

/// Byte order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const REPORT_NAME: &str = "results.csv";

const REPORT_HEADER: [&str; 14] = [
    "file",
    "n_numbers",
    "avg",
    "total_line",
    "subtotal_line",
    "iva_line",
    "check_math_ok",
    "check_math_diff",
    "text",
    "check_sum_ok",
    "check_sum_diff",
    "check_avg_ok",
    "check_avg_diff",
    "error",
];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern (default: configured input directory)
    input: Option<String>,

    /// CSV report path (default: <output_dir>/results.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Expected invoice total, compared with each document's total
    #[arg(long)]
    expected_sum: Option<Decimal>,

    /// Expected average unit price
    #[arg(long)]
    expected_avg: Option<Decimal>,

    /// Tolerance for all checks
    #[arg(long)]
    tol: Option<Decimal>,

    /// Disable grayscale conversion
    #[arg(long)]
    no_gray: bool,

    /// Disable Otsu binarization
    #[arg(long)]
    no_binary: bool,

    /// Enable Gaussian blur
    #[arg(long)]
    blur: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Outcome for one input file.
struct BatchRow {
    file: String,
    result: Result<OcrResult, String>,
}

/// Expected values and tolerance applied to every row.
struct Checks {
    expected_sum: Option<Decimal>,
    expected_avg: Option<Decimal>,
    tolerance: Decimal,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if args.no_gray {
        config.preprocess.grayscale = false;
    }
    if args.no_binary {
        config.preprocess.binarize = false;
    }
    if args.blur {
        config.preprocess.blur = true;
    }

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.io.input_dir.display().to_string());
    let files = collect_inputs(&input)?;

    if files.is_empty() {
        println!("{} No input files found in: {}", style("ℹ").blue(), input);
        return Ok(());
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Models are only needed when there is something to OCR. Without them,
    // image rows fail individually and text rows are still processed.
    let scanner = if files.iter().any(|f| is_image_file(f)) {
        load_scanner(&config, args.model_dir.as_deref())
    } else {
        Err("no image inputs".to_string())
    };
    let analyzer = InvoiceAnalyzer::from_config(&config.extraction);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Sequential; each document is independent.
    let mut rows = Vec::with_capacity(files.len());
    for path in &files {
        let file = file_name(path);
        let result = scan_one(path, &analyzer, &scanner).map_err(|e| {
            warn!("Failed to process {}: {}", path.display(), e);
            e.to_string()
        });
        rows.push(BatchRow { file, result });
        pb.inc(1);
    }

    pb.finish_and_clear();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.io.output_dir.join(REPORT_NAME));
    let checks = Checks {
        expected_sum: args.expected_sum,
        expected_avg: args.expected_avg,
        tolerance: args.tol.unwrap_or(config.extraction.math_tolerance),
    };
    write_report(&output, &rows, &checks)?;

    let failed: Vec<_> = rows.iter().filter(|r| r.result.is_err()).collect();

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        rows.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(rows.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for row in &failed {
            if let Err(e) = &row.result {
                println!("  - {}: {}", row.file, e);
            }
        }
    }

    println!("{} Report written to {}", style("✓").green(), output.display());

    Ok(())
}

/// Resolve a directory or glob pattern into supported input files, sorted.
fn collect_inputs(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);

    let mut files: Vec<PathBuf> = if path.is_dir() {
        fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect()
    } else {
        glob(input)?.filter_map(|r| r.ok()).collect()
    };

    files.retain(|p| p.is_file() && (is_image_file(p) || is_text_file(p)));
    files.sort();

    debug!("Resolved {} input files from {}", files.len(), input);
    Ok(files)
}

/// Load the OCR engine, keeping the failure reason for the image rows.
fn load_scanner(
    config: &ScanConfig,
    model_dir: Option<&Path>,
) -> Result<DocumentScanner<PureOcrEngine>, String> {
    match load_engine(config, model_dir) {
        Ok(engine) => {
            let scanner = DocumentScanner::from_config(engine, config);
            info!("Using OCR backend {}", scanner.backend().name());
            Ok(scanner)
        }
        Err(e) => {
            warn!("OCR engine unavailable, image inputs will fail: {}", e);
            Err(e.to_string())
        }
    }
}

fn scan_one(
    path: &Path,
    analyzer: &InvoiceAnalyzer,
    scanner: &Result<DocumentScanner<PureOcrEngine>, String>,
) -> anyhow::Result<OcrResult> {
    if is_text_file(path) {
        let text = read_text(path)?;
        return Ok(analyzer.analyze(&file_name(path), &text));
    }

    match scanner {
        Ok(scanner) => Ok(scanner.scan_file(path)?),
        Err(reason) => anyhow::bail!("{}", reason),
    }
}

fn write_report(path: &Path, rows: &[BatchRow], checks: &Checks) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(REPORT_HEADER)?;

    for row in rows {
        wtr.write_record(report_record(row, checks))?;
    }

    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn report_record(row: &BatchRow, checks: &Checks) -> Vec<String> {
    let result = match &row.result {
        Ok(result) => result,
        Err(error) => {
            let mut record = vec![String::new(); REPORT_HEADER.len()];
            record[0] = row.file.clone();
            record[REPORT_HEADER.len() - 1] = error.clone();
            return record;
        }
    };

    let math = result.math_check(checks.tolerance);
    let sum = check_value(result.total_line, checks.expected_sum, checks.tolerance);
    let avg = check_value(result.avg, checks.expected_avg, checks.tolerance);

    vec![
        row.file.clone(),
        result.numbers.len().to_string(),
        cell(result.avg),
        cell(result.total_line),
        cell(result.subtotal_line),
        cell(result.iva_line),
        flag(math.ok),
        cell(math.diff),
        result.text.clone(),
        flag(sum.ok),
        cell(sum.diff),
        flag(avg.ok),
        cell(avg.diff),
        String::new(),
    ]
}

fn cell(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facscan_core::analyze_text;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn checks() -> Checks {
        Checks {
            expected_sum: Some(dec("302.43")),
            expected_avg: None,
            tolerance: dec("0.01"),
        }
    }

    #[test]
    fn test_record_for_success() {
        let text = "Casco 49,95\nBASE IMPONIBLE 249,94\nIVA 52,49\nTOTAL 302,43";
        let row = BatchRow {
            file: "a.txt".to_string(),
            result: Ok(analyze_text("a.txt", text)),
        };

        let record = report_record(&row, &checks());
        assert_eq!(record.len(), REPORT_HEADER.len());
        assert_eq!(record[0], "a.txt");
        assert_eq!(record[1], "1");
        assert_eq!(record[3], "302.43");
        assert_eq!(record[6], "true");
        assert_eq!(record[7], "0.00");
        assert_eq!(record[9], "true");
        assert_eq!(record[10], "0.00");
        assert_eq!(record[11], "");
        assert_eq!(record[13], "");
    }

    #[test]
    fn test_record_for_failure() {
        let row = BatchRow {
            file: "b.png".to_string(),
            result: Err("bad image".to_string()),
        };

        let record = report_record(&row, &checks());
        assert_eq!(record[0], "b.png");
        assert_eq!(record[13], "bad image");
        assert!(record[1..13].iter().all(|c| c.is_empty()));
    }
}
