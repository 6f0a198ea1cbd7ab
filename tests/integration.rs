//! End-to-end tests: CSV on disk through to the rendered report.

use purchase_dashboard::output::{render, write_json};
use purchase_dashboard::pipeline::section_titles;
use purchase_dashboard::summary::{correlation_matrix, describe};
use purchase_dashboard::{build_report, load_table, Column, DataLoadError, ReportOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

/// Customer rows in the dataset's column layout.
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "user_id,age,annual_income,purchase_amount,loyalty_score,region,purchase_frequency"
    )
    .unwrap();
    writeln!(file, "1,25,45000,200,4.5,North,12").unwrap();
    writeln!(file, "2,34,55000,350,7.0,South,18").unwrap();
    writeln!(file, "3,45,65000,500,8.0,West,22").unwrap();
    writeln!(file, "4,22,30000,150,3.0,East,10").unwrap();
    writeln!(file, "5,29,47000,220,4.8,North,13").unwrap();
    writeln!(file, "6,52,72000,640,9.1,South,0").unwrap();
    writeln!(file, "7,58,81000,600,5.0,West,21").unwrap();
    writeln!(file, "8,41,60000,oops,6.2,South,17").unwrap();
    file
}

fn options() -> ReportOptions {
    ReportOptions {
        charts_dir: None,
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_report() {
    let csv = create_test_csv();
    let (table, load) = load_table(csv.path()).unwrap();
    assert_eq!(table.len(), 8);
    assert_eq!(load.coercion_errors.len(), 1);
    assert_eq!(load.coercion_errors[0].row, 7);
    assert_eq!(table.records()[7].purchase_amount, None);

    let (report, stats) = build_report(&table, &load, &options(), &mut StdRng::seed_from_u64(42));
    let mut buf = Vec::new();
    render(&report, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    // every section appears, in the fixed order
    let mut last = 0;
    for title in section_titles(5) {
        let pos = text
            .find(&format!("## {}\n", title))
            .unwrap_or_else(|| panic!("missing section {title}"));
        assert!(pos >= last, "section {title} out of order");
        last = pos;
    }

    assert!(text.contains("Shape\n\n(8, 7)"));
    assert!(text.contains("Highest purchasing region: West with $1,100.00"));
    assert_eq!(stats.top_region.as_deref(), Some("West"));
    assert_eq!(stats.coercion_errors, 1);
    // the unreadable amount is one missing value; the column stays numeric
    assert!(text.contains("| purchase_amount    | float64 |"));
    assert!(text.contains("| purchase_amount    | 7     |"));
}

#[test]
fn test_bad_cells_keep_column_in_statistics() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "user_id,age,annual_income,purchase_amount,loyalty_score,region,purchase_frequency"
    )
    .unwrap();
    writeln!(file, "1,25,45000,200,4.5,North,12").unwrap();
    writeln!(file, "2,34,55000,350,7.0,South,18").unwrap();
    writeln!(file, "3,25.5,65000,500,8.0,West,22").unwrap();
    writeln!(file, "4,22,30000,oops,3.0,East,10").unwrap();
    writeln!(file, "5,58,81000,100,5.0,West,21").unwrap();
    file.flush().unwrap();

    let (table, load) = load_table(file.path()).unwrap();
    assert_eq!(load.coercion_errors.len(), 2);

    let described: Vec<(Column, usize)> = describe(&table)
        .iter()
        .map(|s| (s.column, s.count))
        .collect();
    assert!(described.contains(&(Column::PurchaseAmount, 4)));
    assert!(described.contains(&(Column::Age, 4)));

    let corr = correlation_matrix(&table);
    assert!(corr.columns.contains(&Column::PurchaseAmount));
    assert!(corr.columns.contains(&Column::Age));
}

#[test]
fn test_region_totals_match_grand_total() {
    let csv = create_test_csv();
    let (table, _) = load_table(csv.path()).unwrap();
    let grand: f64 = table.present_values(Column::PurchaseAmount).iter().sum();
    let sales = purchase_dashboard::segments::sales_by_region(&table);
    let by_region: f64 = sales.totals.iter().map(|(_, v)| v).sum();
    assert!((grand - by_region).abs() < 1e-9);
}

#[test]
fn test_zero_frequency_never_ranked() {
    let csv = create_test_csv();
    let (table, _) = load_table(csv.path()).unwrap();
    let rows = purchase_dashboard::enrich::enrich(&table);
    let top = purchase_dashboard::segments::top_spenders_per_visit(&rows, table.len());
    assert!(top.iter().all(|s| s.record.user_id != Some(6)));
    // user 8 has no readable purchase amount
    assert!(top.iter().all(|s| s.record.user_id != Some(8)));
    assert_eq!(top.len(), 6);
}

#[test]
fn test_missing_file_aborts() {
    let err = load_table(Path::new("no-such-dataset.csv")).unwrap_err();
    assert!(matches!(err, DataLoadError::Io { .. }));
}

#[test]
fn test_summary_json_written() {
    let csv = create_test_csv();
    let (table, load) = load_table(csv.path()).unwrap();
    let (_, stats) = build_report(&table, &load, &options(), &mut StdRng::seed_from_u64(1));

    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.json");
    write_json(&path, &stats).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["rows"], 8);
    assert_eq!(value["top_region"], "West");
    assert_eq!(value["loyalty_tiers"][0][0], "Low");
}
