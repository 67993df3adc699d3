//! Console, JSON, CSV and HTML output of aggregated reports.

mod common;

use common::{MemoryLoader, default_config, simple_sheet};
use tempfile::tempdir;
use test_stat::Aggregator;
use test_stat::core::filter::{FilterSpec, RawFilter};
use test_stat::core::models::FileReport;
use test_stat::core::summary::{BatchSummary, FileInput, aggregate_files};
use test_stat::infra::workbook::{Workbook, WorkbookLoader, WorkbookSource};
use test_stat::infra::xlsx::XlsxLoader;
use test_stat::reporting::excel::{self, ExcelMetadata};
use test_stat::reporting::export::{self, ExportValue};
use test_stat::reporting::{console, csv, html, json};

fn reports(filter: &FilterSpec) -> Vec<FileReport> {
    let config = default_config();
    let book = Workbook::new(vec![simple_sheet(
        "機能テスト",
        "Windows",
        &[
            ["Pass", "Alice", "2024-01-01", "2024-01-01"],
            ["Fail", "", "2024-01-02", ""],
            ["", "", "", "2024-01-03"],
        ],
    )]);
    let loader = MemoryLoader::default().with("a.xlsx", book);
    let inputs = [
        FileInput::new("a.xlsx").with_identifier("build-42"),
        FileInput::new("missing.xlsx"),
    ];
    aggregate_files(&inputs, &loader, &Aggregator::new(&config), filter)
}

#[test]
fn json_uses_the_external_field_names() {
    let reports = reports(&FilterSpec::default());
    let single = json::to_json_string(&reports[..1], None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&single).unwrap();

    assert_eq!(value["file"], "a.xlsx");
    assert_eq!(value["identifier"], "build-42");
    for key in ["all", "excluded", "available", "executed", "completed", "incompleted", "planned"] {
        assert!(value["stats"].get(key).is_some(), "missing stats.{key}");
    }
    assert_eq!(value["run"]["status"], "進行中");
    assert!(value["run"].get("state").is_none());
    assert_eq!(value["daily"]["2024-01-01"]["Pass"], 1);
    assert_eq!(value["by_name"]["2024-01-02"]["NO_NAME"], 1);
    assert_eq!(value["by_env"]["Windows"]["2024-01-03"]["計画数"], 1);
    assert_eq!(value["total"]["Total"], 2);
    assert_eq!(value["total"]["完了数"], 1);
    assert_eq!(value["total"]["完了率(%)"], 33.33);
    assert_eq!(value["count_by_sheet"][0]["env_count"], 1);
    assert!(value.get("warning").is_none());
    assert!(value.get("filtered_stats").is_none());

    let config = default_config();
    let summary = BatchSummary::from_reports(&reports, &config);
    let batch: serde_json::Value =
        serde_json::from_str(&json::to_json_string(&reports, Some(&summary)).unwrap()).unwrap();
    assert_eq!(batch["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(batch["files"][1]["error"]["type"], "processing_error");
    assert_eq!(batch["summary"]["processed"], 1);
}

#[test]
fn csv_has_one_row_per_environment_and_date() {
    let config = default_config();
    let output = csv::to_csv_string(&reports(&FilterSpec::default()), &config.test_status).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines[0],
        "file,identifier,environment,date,Pass,Fixed,Fail,Blocked,Suspend,N/A,消化数,完了数,計画数"
    );
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "a.xlsx,build-42,Windows,2024-01-01,1,0,0,0,0,0,1,1,1");
    assert_eq!(lines[2], "a.xlsx,build-42,Windows,2024-01-02,0,0,1,0,0,0,1,0,0");
    assert_eq!(lines[3], "a.xlsx,build-42,Windows,2024-01-03,0,0,0,0,0,0,0,0,1");
}

#[test]
fn console_report_lists_filters_status_and_tables() {
    colored::control::set_override(false);
    let config = default_config();
    let filter = FilterSpec::parse(
        &RawFilter {
            tester: Some("alice".to_string()),
            ..Default::default()
        },
        &config.test_status,
    )
    .unwrap();
    let reports = reports(&filter);

    let text = console::render_file_report(&reports[0], &filter, "en");
    assert!(text.contains("File: a.xlsx"));
    assert!(text.contains("Identifier: build-42"));
    assert!(text.contains("Tester: alice (partial match)"));
    assert!(text.contains("Rows after filtering: 1 of 3"));
    assert!(text.contains("Status: 進行中"));
    assert!(text.contains("Windows"));
    assert!(text.contains("完了率(%)"));

    let failed = console::render_file_report(&reports[1], &filter, "en");
    assert!(failed.contains("Error [processing_error]"));

    let summary = BatchSummary::from_reports(&reports, &config);
    let batch = console::render_batch_summary(&reports, &summary, "ja");
    assert!(batch.contains("処理ファイル数: 1 / 2"));
    assert!(batch.contains("missing.xlsx"));
    assert!(batch.contains("build-42"));
}

#[test]
fn html_report_is_written_to_disk() {
    let config = default_config();
    let reports = reports(&FilterSpec::default());
    let summary = BatchSummary::from_reports(&reports, &config);
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.html");

    html::generate_html_report(&reports, Some(&summary), &path, "en").unwrap();
    let page = std::fs::read_to_string(&path).unwrap();

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<style>"));
    assert!(page.contains("build-42"));
    assert!(page.contains("2024-01-02"));
    assert!(page.contains("processing_error"));
    assert!(page.ends_with("</html>"));
}

#[test]
fn tables_drop_styling_when_color_is_disabled() {
    colored::control::set_override(false);
    let reports = reports(&FilterSpec::default());
    let report = reports[0].report().unwrap();

    let table = console::total_table(report);
    assert!(!table.is_tty());
    assert!(!table.to_string().contains("\x1b["));

    let text = console::render_file_report(&reports[0], &FilterSpec::default(), "en");
    assert!(!text.contains("\x1b["));
}

#[test]
fn csv_files_start_with_a_byte_order_mark() {
    let config = default_config();
    let reports = reports(&FilterSpec::default());
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.csv");

    csv::write_csv_file(&path, &reports, &config.test_status).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with(csv::UTF8_BOM));
    assert!(written[csv::UTF8_BOM.len()..].starts_with("file,identifier,environment,date"));

    let printed = csv::to_csv_string(&reports, &config.test_status).unwrap();
    assert!(!printed.starts_with(csv::UTF8_BOM));
}

#[test]
fn export_summary_has_rates_and_not_run_counts() {
    let config = default_config();
    let reports = reports(&FilterSpec::default());

    let header = export::export_header(&config.test_status);
    assert_eq!(header[..7], ["No.", "ファイル名", "項目数", "更新日", "完了数", "消化率", "完了率"]);
    assert_eq!(header.last().map(String::as_str), Some("未着手"));

    let rows = export::export_rows(&reports, &config.test_status);
    assert_eq!(rows.len(), 2);
    let first = &rows[0];
    assert_eq!(first.len(), header.len());
    assert_eq!(first[0], ExportValue::Count(1));
    assert_eq!(first[1], ExportValue::text("a.xlsx"));
    assert_eq!(first[2], ExportValue::Count(3));
    assert_eq!(first[4], ExportValue::Count(1));
    assert_eq!(first[5], ExportValue::text("2/3 (66.7%)"));
    assert_eq!(first[6], ExportValue::text("1/3 (33.3%)"));
    assert_eq!(first[7], ExportValue::Count(1));
    assert_eq!(first.last(), Some(&ExportValue::Count(1)));

    let failed = &rows[1];
    assert_eq!(failed[0], ExportValue::Count(2));
    assert_eq!(failed[1], ExportValue::text("missing.xlsx"));
    assert!(failed[2..].iter().all(|cell| *cell == ExportValue::text("")));

    let tsv = export::to_tsv_string(&reports, &config.test_status);
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("No.\tファイル名\t項目数"));
    assert!(lines[1].starts_with("1\ta.xlsx\t3\t"));
    assert!(lines[1].contains("\t2/3 (66.7%)\t1/3 (33.3%)\t"));
}

#[test]
fn excel_report_is_written_with_every_sheet() {
    let config = default_config();
    let reports = reports(&FilterSpec::default());
    let summary = BatchSummary::from_reports(&reports, &config);
    let meta = ExcelMetadata {
        generated_at: "2024-01-05 09:00:00".to_string(),
        config_path: "TestStat.toml".to_string(),
        filters: Vec::new(),
    };
    let sheets = excel::excel_sheets(&reports, Some(&summary), &config.test_status, &meta, "en");
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    excel::generate_excel_report(&sheets, &config.test_status, &path).unwrap();
    let book = XlsxLoader.load(&path).unwrap();
    assert_eq!(
        book.sheet_names(),
        vec![
            "SUMMARY TOTAL RESULTS",
            "SUMMARY STATISTICS",
            "INDIVIDUAL FILES",
            "DAILY BREAKDOWN",
            "BY NAME",
            "BY ENVIRONMENT",
            "EXPORT SUMMARY",
            "METADATA",
        ]
    );

    let export_sheet = book.worksheet("EXPORT SUMMARY").unwrap();
    assert_eq!(export_sheet.cell(2, 1), Some("ファイル名"));
    assert_eq!(export_sheet.cell(2, 2), Some("a.xlsx"));
    assert_eq!(export_sheet.cell(3, 2), Some("3"));
    assert_eq!(export_sheet.cell(7, 2), Some("1/3 (33.3%)"));
    assert_eq!(export_sheet.cell(2, 3), Some("missing.xlsx"));

    let metadata = book.worksheet("METADATA").unwrap();
    assert_eq!(metadata.cell(1, 2), Some("Generated at"));
    assert_eq!(metadata.cell(2, 2), Some("2024-01-05 09:00:00"));

    let single = excel::excel_sheets(&reports[..1], None, &config.test_status, &meta, "en");
    let names: Vec<&str> = single.iter().map(|sheet| sheet.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "TOTAL RESULTS",
            "STATISTICS",
            "DAILY BREAKDOWN",
            "BY NAME",
            "BY ENVIRONMENT",
            "EXPORT SUMMARY",
            "METADATA",
        ]
    );
}
