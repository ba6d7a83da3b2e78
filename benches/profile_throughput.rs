use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use csv_scout::dataset::Dataset;
use csv_scout::{overview, profile};
use encoding_rs::UTF_8;
use tempfile::TempDir;

fn generate_events(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("events.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "id,amount,status,seen_at,note").expect("header");
    for i in 0..rows {
        let status = match i % 3 {
            0 => "active",
            1 => "idle",
            _ => "closed",
        };
        let day = (i % 28) + 1;
        let note = if i % 17 == 0 { "NA" } else { "detail" };
        writeln!(
            file,
            "{i},{amount},{status},2024-03-{day:02},{note}",
            amount = (i % 997) as f64 / 3.0
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn load(rows: usize) -> (TempDir, Dataset) {
    let (temp_dir, csv_path) = generate_events(rows);
    let dataset = Dataset::from_csv_path(&csv_path, b',', UTF_8, 0).expect("load dataset");
    (temp_dir, dataset)
}

fn bench_profile(c: &mut Criterion) {
    let (_guard, dataset) = load(10_000);

    c.bench_function("classify_numeric_column_10k", |b| {
        let column = dataset.column("amount").expect("amount column");
        b.iter(|| profile::classify_column(std::hint::black_box(column)));
    });

    c.bench_function("classify_datetime_column_10k", |b| {
        let column = dataset.column("seen_at").expect("seen_at column");
        b.iter(|| profile::classify_column(std::hint::black_box(column)));
    });

    c.bench_function("dataset_overview_10k", |b| {
        b.iter(|| overview::profile_dataset(std::hint::black_box(&dataset)));
    });
}

criterion_group!(benches, bench_profile);
criterion_main!(benches);
