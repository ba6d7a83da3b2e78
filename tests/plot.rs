use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

mod common;
use common::write_csv;

fn numbers_csv(temp: &std::path::Path) -> std::path::PathBuf {
    let mut lines = vec!["x,y,group".to_string()];
    for i in 0..60 {
        lines.push(format!("{i},{v},{g}", v = i * 3, g = ["red", "blue"][i % 2]));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_csv(temp, "numbers.csv", &refs)
}

#[test]
fn histogram_spec_has_thirty_bins() {
    let temp = tempdir().expect("temp dir");
    let path = numbers_csv(temp.path());

    let assert = Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "x",
            "-k",
            "histogram",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let spec: serde_json::Value = serde_json::from_str(&stdout).expect("valid spec");
    assert_eq!(spec["kind"], "histogram");
    assert_eq!(spec["geometry"]["bins"].as_array().unwrap().len(), 30);
}

#[test]
fn two_variable_kind_without_second_column_fails() {
    let temp = tempdir().expect("temp dir");
    let path = numbers_csv(temp.path());

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "x",
            "-k",
            "scatter",
        ])
        .assert()
        .failure()
        .stderr(contains("requires a second column"));
}

#[test]
fn unknown_plot_kind_fails() {
    let temp = tempdir().expect("temp dir");
    let path = numbers_csv(temp.path());

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "x",
            "-k",
            "sunburst",
        ])
        .assert()
        .failure()
        .stderr(contains("unsupported plot kind"));
}

#[test]
fn grouped_boxplot_spec_is_written_to_file() {
    let temp = tempdir().expect("temp dir");
    let path = numbers_csv(temp.path());
    let out = temp.path().join("box.json");

    Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "y",
            "-y",
            "group",
            "-k",
            "boxplot",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let spec: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).expect("valid spec");
    let groups = spec["geometry"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["label"], "red");
    assert_eq!(groups[1]["label"], "blue");
}

#[test]
fn line_plot_within_a_year_formats_ticks_as_month_day_time() {
    let temp = tempdir().expect("temp dir");
    let mut lines = vec!["when,value".to_string()];
    for m in 1..=12 {
        lines.push(format!("2024-{m:02}-01,{m}"));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let path = write_csv(temp.path(), "series.csv", &refs);

    let assert = Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "when",
            "-y",
            "value",
            "-k",
            "line",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let spec: serde_json::Value = serde_json::from_str(&stdout).expect("valid spec");
    let ticks = spec["geometry"]["ticks"].as_array().unwrap();
    assert!(ticks.len() <= 15);
    assert_eq!(ticks[0]["label"], "01-01 00:00");
}

#[test]
fn heatmap_spec_cross_tabulates_categories() {
    let temp = tempdir().expect("temp dir");
    let path = numbers_csv(temp.path());

    let assert = Command::cargo_bin("csv-scout")
        .expect("binary exists")
        .args([
            "plot",
            "-i",
            path.to_str().unwrap(),
            "-x",
            "group",
            "-y",
            "y",
            "-k",
            "heatmap",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let spec: serde_json::Value = serde_json::from_str(&stdout).expect("valid spec");
    let x_labels = spec["geometry"]["x_labels"].as_array().unwrap();
    assert_eq!(x_labels.len(), 2);
    let y_labels = spec["geometry"]["y_labels"].as_array().unwrap();
    assert_eq!(y_labels.len(), 10);
    let counts = spec["geometry"]["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 10);
}
