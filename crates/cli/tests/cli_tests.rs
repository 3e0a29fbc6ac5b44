// Integration tests for the `skucalc` binary against the CSV fixtures.
// Run with: cargo test -p skucalc-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// `skucalc` run from an empty directory so no stray skucalc.toml is picked up.
fn skucalc(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_skucalc"));
    cmd.current_dir(cwd);
    cmd.env_remove("SKUCALC_CONFIG");
    cmd.env_remove("SKUCALC_LOG");
    cmd
}

fn with_fixtures(cwd: &Path, args: &[&str]) -> Output {
    let usage = fixture("usage.csv");
    let commitment = fixture("commitment.csv");
    skucalc(cwd)
        .arg("--usage")
        .arg(&usage)
        .arg("--commitment")
        .arg(&commitment)
        .args(args)
        .output()
        .expect("run skucalc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn top_ranks_tenants_by_cost() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["top", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value = json(&output);
    assert_eq!(value["view"], "top_tenants");
    let tenants = value["tenants"].as_array().unwrap();
    // Delta only has a "nan" SKU and is filtered out
    let names: Vec<&str> = tenants.iter().map(|t| t["tenant"].as_str().unwrap()).collect();
    assert_eq!(names, ["Gamma", "Acme", "Beta"]);
    assert_eq!(tenants[0]["total_cost"], 300.0);
    assert_eq!(tenants[1]["total_cost"], 190.0);
    assert_eq!(tenants[2]["total_cost"], 15.0);
    assert_eq!(tenants[2]["unpriced_lines"], 1);
}

#[test]
fn top_n_limits_rows() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["top", "-n", "1"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Top 1 tenants by total cost"));
    assert!(text.contains("Gamma"));
    assert!(!text.contains("Acme"));
    assert!(text.contains("$300.00"));
}

#[test]
fn products_by_service_shows_stats() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["products", "--service", "Backup"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("Backup - All SKUs"));
    assert!(text.contains("Customers: 2"));
    assert!(text.contains("Total revenue: $165.00"));
}

#[test]
fn products_ranks_top_customers() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["products", "--service", "Backup", "--top", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let ranking = &text[text.find("Top 1 customers by revenue").expect("ranking")..];
    assert!(ranking.contains("Acme"));
    assert!(ranking.contains("$150.00"));
    assert!(!ranking.contains("Beta"));
}

#[test]
fn products_top_zero_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["products", "--top", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--top must be at least 1"));
}

#[test]
fn credit_row_with_text_quantity_does_not_fail_the_run() {
    // The C100 credit line in the fixture carries "N/A" as its quantity
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["tenant", "Gamma", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["detail"]["lines"].as_array().unwrap().len(), 1);
    assert_eq!(value["detail"]["total_cost"], 300.0);
}

#[test]
fn products_accepts_option_label_for_sku() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["products", "--sku", "Mailboxes - S2", "--json"]);
    assert!(output.status.success());
    let value = json(&output);
    assert_eq!(value["view"], "products");
    assert_eq!(value["breakdown"]["filter"]["sku"], "S2");
    let rows = value["breakdown"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["tenant"], "Gamma");
    assert_eq!(rows[0]["total_cost"], 300.0);
    assert_eq!(value["breakdown"]["stats"]["total_quantity"], 34.0);
}

#[test]
fn unknown_sku_prints_no_data_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["products", "--service", "Backup", "--sku", "S404"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "No data found for Backup - S404.\n");
}

#[test]
fn tenant_json_has_lines_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["tenant", "Beta", "--json"]);
    assert!(output.status.success());
    let value = json(&output);
    assert_eq!(value["view"], "tenant");
    let detail = &value["detail"];
    assert_eq!(detail["tenant"], "Beta");
    assert_eq!(detail["total_cost"], 15.0);
    assert_eq!(detail["average_cost"], 7.5);
    assert_eq!(detail["unpriced_lines"], 1);
    let lines = detail["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["sku"], "S9");
    assert!(lines[1]["per_unit"].is_null());
    assert_eq!(value["largest_tenant_total"], 300.0);
}

#[test]
fn tenant_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["tenant", "Acme"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Report for Acme"));
    assert!(text.contains("Total Usage Amount: $190.00"));
    assert!(text.contains("Average per line: $95.00"));
}

#[test]
fn options_lists_choices() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["options", "--service", "Email", "--json"]);
    assert!(output.status.success());
    let value = json(&output);
    let options = &value["options"];
    assert_eq!(options["services"], serde_json::json!(["Backup", "Email"]));
    assert_eq!(options["tenants"], serde_json::json!(["Acme", "Beta", "Gamma"]));
    let labels: Vec<&str> = options["skus"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["Mailboxes - S2"]);
}

#[test]
fn request_file_answers_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let request = fixture("top_request.toml");
    let output = with_fixtures(dir.path(), &["request", request.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["view"], "top_tenants");
    assert_eq!(value["tenants"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// File outputs
// ---------------------------------------------------------------------------

#[test]
fn export_writes_default_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["export"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Exported 6 rows"));
    let written = dir.path().join("MergedUsageWithCosts.xlsx");
    let bytes = std::fs::read(&written).unwrap();
    // xlsx is a zip archive
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn export_csv_has_price_and_total_columns() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.csv");
    let output = with_fixtures(dir.path(), &["export", "-o", out.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("Tenant name,Service name,Edition,SKU"));
    assert!(header.ends_with(",perunit,total"));
    assert_eq!(lines.count(), 6);
    assert!(text.contains("Acme,Backup,Advanced,S1,Storage,GB,100,EU,Backup storage,1.5,150"));
}

#[test]
fn report_writes_pdf_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let reports = dir.path().join("reports");
    std::fs::create_dir(&reports).unwrap();
    let output = with_fixtures(
        dir.path(),
        &["report", "Acme", "--layout", "landscape", "-o", reports.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("landscape report for Acme"));

    let bytes = std::fs::read(reports.join("Report_Acme.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn local_config_supplies_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "[usage]\nfile = {:?}\n\n[commitment]\nfile = {:?}\n\n[report]\ntop_n = 1\ncurrency_symbol = \"EUR \"\n",
        fixture("usage.csv").display().to_string(),
        fixture("commitment.csv").display().to_string(),
    );
    std::fs::write(dir.path().join("skucalc.toml"), config).unwrap();

    let output = skucalc(dir.path()).arg("top").output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("Top 1 tenants"));
    assert!(text.contains("EUR 300.00"));
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

#[test]
fn missing_inputs_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = skucalc(dir.path()).arg("top").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("error: no usage table given"));
    assert!(err.contains("hint:  pass --usage FILE"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = skucalc(dir.path())
        .args(["--usage", "nope.csv", "--commitment"])
        .arg(fixture("commitment.csv"))
        .arg("top")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("file not found"));
}

#[test]
fn missing_price_column_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_fixtures(dir.path(), &["--price-column", "Commitment 9", "top"]);
    assert_eq!(output.status.code(), Some(4));
    let err = stderr(&output);
    assert!(err.contains("missing column 'Commitment 9'"));
    assert!(err.contains("hint:"));
}

#[test]
fn unparsable_quantity_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = skucalc(dir.path())
        .arg("--usage")
        .arg(fixture("bad_quantity.csv"))
        .arg("--commitment")
        .arg(fixture("commitment.csv"))
        .args(["--usage-header-row", "0", "top"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("row 2"));
}

#[test]
fn invalid_request_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("bad.toml");
    std::fs::write(&request, "[action]\nkind = \"top_tenants\"\nn = 0\n").unwrap();
    let output = with_fixtures(dir.path(), &["request", request.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
}
