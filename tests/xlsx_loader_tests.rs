//! Reading real `.xlsx` files written with `rust_xlsxwriter`.

mod common;

use common::{EnvColumns, default_config, spec_grid, write_xlsx};
use tempfile::tempdir;
use test_stat::Aggregator;
use test_stat::core::filter::FilterSpec;
use test_stat::core::summary::{FileInput, aggregate_file};
use test_stat::infra::workbook::{WorkbookLoader, WorkbookSource, Worksheet};
use test_stat::infra::xlsx::XlsxLoader;

fn sample_grid() -> Vec<Vec<String>> {
    spec_grid(
        &[
            EnvColumns {
                name: "Chrome",
                cases: &[
                    ["Pass", "Alice", "2024-01-01", "2024-01-01"],
                    ["Fail", "", "2024-01-02", "2024-01-02"],
                    ["", "", "", "2024-01-03"],
                ],
            },
            EnvColumns {
                name: "Firefox",
                cases: &[["Blocked", "Bob", "2024-01-02", ""]],
            },
        ],
        true,
    )
}

#[test]
fn date_cells_are_read_as_iso_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spec.xlsx");
    write_xlsx(&path, &[("機能テスト", sample_grid())]);

    let book = XlsxLoader.load(&path).unwrap();
    assert_eq!(book.sheet_names(), vec!["機能テスト"]);
    let sheet = book.worksheet("機能テスト").unwrap();
    assert_eq!(sheet.cell(1, 2), Some("No."));
    assert_eq!(sheet.cell(1, 3), Some("1"));
    assert_eq!(sheet.cell(5, 3), Some("2024-01-01"));
    assert_eq!(sheet.cell(3, 1), Some("Chrome"));
}

#[test]
fn xlsx_file_aggregates_like_the_in_memory_sheet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spec.xlsx");
    write_xlsx(&path, &[("機能テスト", sample_grid()), ("表紙", vec![vec!["cover".to_string()]])]);

    let config = default_config();
    let aggregator = Aggregator::new(&config);
    let file = aggregate_file(
        &FileInput::new(&path),
        &XlsxLoader,
        &aggregator,
        &FilterSpec::default(),
    );
    let report = file.report().expect("file aggregates");

    assert_eq!(report.stats.all, 6);
    assert_eq!(report.stats.executed, 3);
    assert_eq!(report.stats.planned, 3);
    assert_eq!(report.daily.dated["2024-01-02"].get("Fail"), 1);
    assert_eq!(report.daily.dated["2024-01-03"].get("計画数"), 1);
    assert_eq!(report.by_name["2024-01-02"]["NO_NAME"], 1);
    assert_eq!(report.by_env["Firefox"]["2024-01-02"].get("Blocked"), 1);
}

#[test]
fn unreadable_file_is_a_processing_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    let config = default_config();
    let file = aggregate_file(
        &FileInput::new(&path),
        &XlsxLoader,
        &Aggregator::new(&config),
        &FilterSpec::default(),
    );
    assert_eq!(file.error().map(|e| e.kind.as_str()), Some("processing_error"));
}

#[test]
fn numeric_set_name_cells_fall_back_to_the_set_index() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("numeric.xlsx");
    let grid = spec_grid(
        &[EnvColumns {
            name: "",
            cases: &[["Pass", "Alice", "2024-01-01", ""]],
        }],
        false,
    );

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("機能テスト").unwrap();
    for (row, cells) in grid.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row as u32, col as u16, value).unwrap();
            }
        }
    }
    worksheet.write_number(0, 2, 2024).unwrap();
    workbook.save(&path).unwrap();

    let book = XlsxLoader.load(&path).unwrap();
    let sheet = book.worksheet("機能テスト").unwrap();
    assert_eq!(sheet.cell(3, 1), Some("2024"));
    assert!(!sheet.is_text(3, 1));
    assert!(sheet.is_text(1, 2));

    let config = default_config();
    let file = aggregate_file(
        &FileInput::new(&path),
        &XlsxLoader,
        &Aggregator::new(&config),
        &FilterSpec::default(),
    );
    let report = file.report().expect("file aggregates");
    assert!(report.by_env.contains_key("セット1"));
    assert!(!report.by_env.contains_key("2024"));
}
