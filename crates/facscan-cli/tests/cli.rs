//! End-to-end tests for the `facscan` binary, driven by pre-extracted OCR
//! text so no models are needed.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "CONCEPTO PRECIO\n\
                       Curso Dron 199.99 1 199.99\n\
                       Casco 49.95 1 49.95\n\
                       BASE IMPONIBLE 249.94\n\
                       IVA 21% 52.49\n\
                       TOTAL 302.43\n";

const GARBLED: &str = "CONCEPTO\n\
                       Casco 100,00\n\
                       BASE IMPONIBLE 100,00\n\
                       IVA 21%\n\
                       TOTAL 1 2 1 0 0\n";

fn facscan() -> Command {
    let mut cmd = Command::cargo_bin("facscan").unwrap();
    for key in [
        "FACSCAN_INPUT_DIR",
        "FACSCAN_OUTPUT_DIR",
        "FACSCAN_MODEL_DIR",
        "FACSCAN_GRAYSCALE",
        "FACSCAN_BINARIZE",
        "FACSCAN_BLUR",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn read_report(path: &Path) -> String {
    let bytes = fs::read(path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "report must start with a BOM");
    String::from_utf8(bytes[3..].to_vec()).unwrap()
}

#[test]
fn process_text_file_as_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "factura.txt", INVOICE);

    facscan()
        .arg("process")
        .arg(dir.path().join("factura.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""file": "factura.txt""#))
        .stdout(predicate::str::contains(r#""total_line": "302.43""#))
        .stdout(predicate::str::contains(r#""iva_line": "52.49""#));
}

#[test]
fn process_text_file_as_summary() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "factura.txt", INVOICE);

    facscan()
        .args(["process", "--format", "text"])
        .arg(dir.path().join("factura.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Sum:   249.94"))
        .stdout(predicate::str::contains("Total:    302.43"))
        .stdout(predicate::str::contains("Check:    ok"));
}

#[test]
fn process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "factura.txt", INVOICE);
    let output = dir.path().join("out.json");

    facscan()
        .arg("process")
        .arg(dir.path().join("factura.txt"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(json["subtotal_line"], "249.94");
    assert_eq!(json["numbers"].as_array().unwrap().len(), 2);
}

#[test]
fn process_missing_file_fails() {
    facscan()
        .args(["process", "no/such/factura.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_unsupported_format_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "factura.pdf", "%PDF");

    facscan()
        .arg("process")
        .arg(dir.path().join("factura.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn batch_writes_csv_report() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", INVOICE);
    write(dir.path(), "b.txt", GARBLED);
    write(dir.path(), "notes.md", "ignored");
    let report = dir.path().join("out").join("report.csv");

    facscan()
        .arg("batch")
        .arg(dir.path())
        .arg("--output")
        .arg(&report)
        .args(["--expected-sum", "302.43"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("2 successful"));

    let content = read_report(&report);
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "file");
    assert_eq!(&headers[13], "error");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "a.txt");
    assert_eq!(&rows[0][1], "2");
    assert_eq!(&rows[0][3], "302.43");
    assert_eq!(&rows[0][6], "true");
    assert_eq!(&rows[0][9], "true");
    assert_eq!(&rows[0][8], INVOICE);

    // tax derived from the rate, total recovered from split digits
    assert_eq!(&rows[1][0], "b.txt");
    assert_eq!(&rows[1][5], "21.00");
    assert_eq!(&rows[1][3], "121.00");
    assert_eq!(&rows[1][9], "false");
}

#[test]
fn batch_without_models_still_processes_text() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.png", "not really an image");
    write(dir.path(), "b.txt", INVOICE);
    let report = dir.path().join("report.csv");

    facscan()
        .arg("batch")
        .arg(dir.path())
        .arg("--output")
        .arg(&report)
        .args(["--model-dir", "/nonexistent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    let content = read_report(&report);
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "a.png");
    assert!(rows[0][13].contains("Failed to load OCR models"), "error was {:?}", &rows[0][13]);

    assert_eq!(&rows[1][0], "b.txt");
    assert_eq!(&rows[1][3], "302.43");
    assert_eq!(&rows[1][13], "");
}

#[test]
fn batch_accepts_glob_pattern() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", INVOICE);
    write(dir.path(), "b.txt", INVOICE);
    let report = dir.path().join("report.csv");
    let pattern = dir.path().join("a*.txt");

    facscan()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 files"));

    let content = read_report(&report);
    assert!(content.contains("a.txt"));
    assert!(!content.contains("b.txt"));
}

#[test]
fn batch_with_no_inputs_reports_and_exits() {
    let dir = TempDir::new().unwrap();

    facscan()
        .arg("batch")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No input files found"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("facscan").join("config.json");
    let config = config.to_str().unwrap();

    facscan()
        .args(["--config", config, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    facscan()
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    facscan()
        .args(["--config", config, "config", "set", "extraction.item_keywords", r#"["Widget"]"#])
        .assert()
        .success();

    facscan()
        .args(["--config", config, "config", "get", "extraction.item_keywords"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget"))
        .stdout(predicate::str::contains("Casco").not());

    facscan()
        .args(["--config", config, "config", "set", "extraction.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn configured_keywords_drive_extraction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"extraction": {"item_keywords": ["Widget"]}}"#).unwrap();
    write(dir.path(), "w.txt", "Widget 12,00\nCasco 49,95\n");

    facscan()
        .arg("--config")
        .arg(&config)
        .args(["process", "--format", "text"])
        .arg(dir.path().join("w.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Count: 1"))
        .stdout(predicate::str::contains("Sum:   12.00"));
}
