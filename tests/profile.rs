use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::tempdir;

mod common;
use common::write_csv;

fn fixture_lines() -> Vec<&'static str> {
    vec![
        "id,status,amount,joined,note",
        "1,yes,10,2024-01-05,alpha",
        "2,no,12,2024-02-10,beta",
        "3,yes,9,2024-03-15,alpha",
        "4,no,14,2024-04-20,gamma",
        "5,yes,11,2024-05-25,beta",
        "6,no,200,2024-06-30,alpha",
    ]
}

#[test]
fn profile_reports_binary_value_counts() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(temp.path(), "people.csv", &fixture_lines());

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args(["profile", "-i", path.to_str().unwrap(), "-C", "status"])
        .assert()
        .success()
        .stdout(
            contains("Value Counts (Binary)")
                .and(contains("yes"))
                .and(contains("3 (50.00%)"))
                .and(contains("Convert to binary column")),
        );
}

#[test]
fn profile_flags_constant_and_index_columns() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(
        temp.path(),
        "shape.csv",
        &[
            "tag,serial",
            "fixed,a-1",
            "fixed,a-2",
            "fixed,a-3",
            "fixed,a-4",
        ],
    );

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args(["profile", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("Constant column, can be removed")
                .and(contains("Index column (every row has a unique value)")),
        );
}

#[test]
fn profile_numeric_column_reports_statistics() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(temp.path(), "people.csv", &fixture_lines());

    let assert = Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args(["profile", "-i", path.to_str().unwrap(), "-C", "amount"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    assert!(stdout.contains("Mean"), "mean missing: {stdout}");
    assert!(stdout.contains("Lower Quartile"), "q1 missing: {stdout}");
    assert!(
        stdout.contains("Outlier Count (1.5x IQR)  1"),
        "outlier count missing: {stdout}"
    );
}

#[test]
fn profile_json_output_keeps_fact_order() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(temp.path(), "people.csv", &fixture_lines());

    let assert = Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "profile",
            "-i",
            path.to_str().unwrap(),
            "-C",
            "joined",
            "--format",
            "json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    let summary = parsed.get("joined").expect("joined summary");
    assert_eq!(
        summary.get("Date Range").and_then(|v| v.as_str()),
        Some("2024-01-05 to 2024-06-30")
    );
    let data_type_pos = stdout.find("Data Type").expect("data type key");
    let recommendation_pos = stdout.rfind("Recommendation").expect("recommendation key");
    assert!(data_type_pos < recommendation_pos);
}

#[test]
fn profile_unknown_column_fails() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(temp.path(), "people.csv", &fixture_lines());

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args(["profile", "-i", path.to_str().unwrap(), "-C", "nope"])
        .assert()
        .failure()
        .stderr(contains("column 'nope' not found"));
}

#[test]
fn profile_writes_distribution_plot_specs() {
    let temp = tempdir().expect("temp dir");
    let path = write_csv(temp.path(), "people.csv", &fixture_lines());
    let plot_dir = temp.path().join("plots");

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "profile",
            "-i",
            path.to_str().unwrap(),
            "-C",
            "amount",
            "--plots",
            plot_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let histogram = plot_dir.join("amount_histogram.json");
    let boxplot = plot_dir.join("amount_boxplot.json");
    assert!(histogram.exists(), "missing {histogram:?}");
    assert!(boxplot.exists(), "missing {boxplot:?}");

    let spec: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&histogram).unwrap()).expect("valid spec");
    assert_eq!(spec.get("kind").and_then(|v| v.as_str()), Some("histogram"));
}
