//! # Excel Workbook Export / Excel 工作簿导出
//!
//! Writes the report as an `.xlsx` workbook with one sheet per view. A single
//! file gets its totals, statistics, daily, by-tester and by-environment sheets;
//! a batch gets the summary totals and statistics, a per-file sheet and the
//! breakdowns combined across files. Both end with the export summary and a
//! metadata sheet.
//!
//! 将报告写成 `.xlsx` 工作簿，每个视图一张工作表。单个文件输出总计、统计、按日、
//! 按担当者和按环境工作表；批处理输出汇总总计与统计、逐文件工作表以及跨文件合并的
//! 各维度工作表。两者最后都附带导出摘要和元数据工作表。

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::config::TestStatus;
use crate::core::models::{
    AggregateReport, EnvBreakdown, FileReport, GrandTotal, NameBreakdown, Stats, TOTAL_KEY, Tally,
};
use crate::core::summary::BatchSummary;
use crate::infra::t;
use crate::reporting::export::{self, ExportValue};

const FONT_NAME: &str = "游ゴシック";

/// Context shown on the metadata sheet.
/// 元数据工作表中显示的上下文信息。
#[derive(Debug, Clone, Default)]
pub struct ExcelMetadata {
    pub generated_at: String,
    pub config_path: String,
    /// Output of [`crate::core::filter::FilterSpec::describe`].
    pub filters: Vec<String>,
}

/// Contents of one worksheet before it is written.
/// 写入之前的一张工作表的内容。
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<ExportValue>>,
}

impl SheetData {
    fn new(name: &str, header: Vec<String>, rows: Vec<Vec<ExportValue>>) -> Self {
        Self {
            name: name.to_string(),
            header,
            rows,
        }
    }
}

fn count(value: u64) -> ExportValue {
    ExportValue::Count(value as i64)
}

fn bucket_values<'a>(
    bucket: &'a Tally,
    status: &'a TestStatus,
) -> impl Iterator<Item = ExportValue> + 'a {
    status.bucket_labels().map(|label| count(bucket.get(label)))
}

fn total_sheet(name: &str, total: &GrandTotal, status: &TestStatus, locale: &str) -> SheetData {
    let mut header = vec![t!("excel.category", locale = locale).to_string()];
    header.extend(status.results.iter().cloned());
    header.extend([
        TOTAL_KEY.to_string(),
        total.labels.completed.clone(),
        total.labels.executed.clone(),
        total.labels.completion_rate.clone(),
        total.labels.execution_rate.clone(),
    ]);

    let mut row = vec![ExportValue::text(name)];
    row.extend(status.results.iter().map(|r| count(total.results.get(r))));
    row.extend([
        count(total.total),
        count(total.completed),
        count(total.executed),
        ExportValue::Rate(total.completion_rate),
        ExportValue::Rate(total.execution_rate),
    ]);
    SheetData::new(name, header, vec![row])
}

fn stats_sheet(name: &str, stats: &Stats, locale: &str) -> SheetData {
    let header = vec![
        t!("excel.metric", locale = locale).to_string(),
        t!("report.count", locale = locale).to_string(),
    ];
    let rows = [
        ("all", count(stats.all)),
        ("excluded", count(stats.excluded)),
        ("available", ExportValue::Count(stats.available)),
        ("executed", count(stats.executed)),
        ("completed", count(stats.completed)),
        ("incompleted", count(stats.incompleted)),
        ("planned", count(stats.planned)),
    ]
    .into_iter()
    .map(|(metric, value)| vec![ExportValue::text(metric), value])
    .collect();
    SheetData::new(name, header, rows)
}

fn daily_sheet(daily: &BTreeMap<String, Tally>, status: &TestStatus, locale: &str) -> SheetData {
    let mut header = vec![t!("report.date", locale = locale).to_string()];
    header.extend(status.bucket_labels().map(str::to_string));
    let rows = daily
        .iter()
        .map(|(date, bucket)| {
            let mut row = vec![ExportValue::text(date.as_str())];
            row.extend(bucket_values(bucket, status));
            row
        })
        .collect();
    SheetData::new("DAILY BREAKDOWN", header, rows)
}

/// Pivots date → tester counts into one column per tester, sorted by name.
fn by_name_sheet(by_name: &NameBreakdown, locale: &str) -> SheetData {
    let testers: BTreeSet<&str> = by_name
        .values()
        .flat_map(|testers| testers.keys().map(String::as_str))
        .collect();

    let mut header = vec![t!("report.date", locale = locale).to_string()];
    header.extend(testers.iter().map(|t| t.to_string()));
    let rows = by_name
        .iter()
        .map(|(date, counts)| {
            let mut row = vec![ExportValue::text(date.as_str())];
            row.extend(
                testers
                    .iter()
                    .map(|tester| count(counts.get(*tester).copied().unwrap_or(0))),
            );
            row
        })
        .collect();
    SheetData::new("BY NAME", header, rows)
}

fn by_env_sheet(by_env: &EnvBreakdown, status: &TestStatus, locale: &str) -> SheetData {
    let mut header = vec![
        t!("report.environment", locale = locale).to_string(),
        t!("report.date", locale = locale).to_string(),
    ];
    header.extend(status.bucket_labels().map(str::to_string));
    let rows = by_env
        .iter()
        .flat_map(|(env, daily)| {
            daily.iter().map(move |(date, bucket)| {
                let mut row = vec![ExportValue::text(env.as_str()), ExportValue::text(date.as_str())];
                row.extend(bucket_values(bucket, status));
                row
            })
        })
        .collect();
    SheetData::new("BY ENVIRONMENT", header, rows)
}

fn individual_files_sheet(reports: &[FileReport], status: &TestStatus, locale: &str) -> SheetData {
    let labels = &status.labels;
    let mut header = vec![
        t!("summary.file", locale = locale).to_string(),
        "all".to_string(),
        "available".to_string(),
        "excluded".to_string(),
    ];
    header.extend(status.results.iter().cloned());
    header.extend([
        TOTAL_KEY.to_string(),
        labels.completed.clone(),
        labels.executed.clone(),
        labels.completion_rate.clone(),
        labels.execution_rate.clone(),
    ]);

    let rows = reports
        .iter()
        .filter_map(|file| file.report().map(|report| (file, report)))
        .map(|(file, report)| {
            let total = &report.total;
            let mut row = vec![
                ExportValue::text(file.file.as_str()),
                count(report.stats.all),
                ExportValue::Count(report.stats.available),
                count(report.stats.excluded),
            ];
            row.extend(status.results.iter().map(|r| count(total.results.get(r))));
            row.extend([
                count(total.total),
                count(total.completed),
                count(total.executed),
                ExportValue::Rate(total.completion_rate),
                ExportValue::Rate(total.execution_rate),
            ]);
            row
        })
        .collect();
    SheetData::new("INDIVIDUAL FILES", header, rows)
}

fn combined_daily<'a>(
    dailies: impl IntoIterator<Item = &'a BTreeMap<String, Tally>>,
) -> BTreeMap<String, Tally> {
    let mut combined: BTreeMap<String, Tally> = BTreeMap::new();
    for daily in dailies {
        for (date, bucket) in daily {
            let entry = combined.entry(date.clone()).or_default();
            for (label, value) in bucket.iter() {
                entry.add(label, value);
            }
        }
    }
    combined
}

fn combined_by_name<'a>(breakdowns: impl IntoIterator<Item = &'a NameBreakdown>) -> NameBreakdown {
    let mut combined = NameBreakdown::new();
    for by_name in breakdowns {
        for (date, testers) in by_name {
            let entry = combined.entry(date.clone()).or_default();
            for (tester, value) in testers {
                *entry.entry(tester.clone()).or_default() += value;
            }
        }
    }
    combined
}

fn combined_by_env<'a>(breakdowns: impl IntoIterator<Item = &'a EnvBreakdown>) -> EnvBreakdown {
    let mut combined = EnvBreakdown::new();
    for by_env in breakdowns {
        for (env, daily) in by_env {
            let env_entry = combined.entry(env.clone()).or_default();
            for (date, bucket) in daily {
                let entry = env_entry.entry(date.clone()).or_default();
                for (label, value) in bucket.iter() {
                    entry.add(label, value);
                }
            }
        }
    }
    combined
}

fn export_sheet(reports: &[FileReport], status: &TestStatus) -> SheetData {
    SheetData::new(
        "EXPORT SUMMARY",
        export::export_header(status),
        export::export_rows(reports, status),
    )
}

fn metadata_sheet(
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    meta: &ExcelMetadata,
    locale: &str,
) -> SheetData {
    let header = vec![
        t!("excel.item", locale = locale).to_string(),
        t!("excel.value", locale = locale).to_string(),
    ];
    let pair = |key: &str, value: String| {
        vec![
            ExportValue::text(t!(key, locale = locale).to_string()),
            ExportValue::text(value),
        ]
    };

    let mut rows = vec![
        pair("excel.generated_at", meta.generated_at.clone()),
        pair("excel.format", "Excel".to_string()),
    ];
    if let Some(summary) = summary {
        rows.push(pair(
            "excel.processed_files",
            format!("{}/{}", summary.processed, summary.file_count),
        ));
    }
    if !meta.filters.is_empty() {
        rows.push(pair("excel.filters", meta.filters.join("; ")));
    }
    rows.push(pair("excel.config_file", meta.config_path.clone()));
    for file in reports {
        if let Some(error) = file.error() {
            rows.push(pair(
                "excel.file_error",
                format!("{} [{}]: {}", file.file, error.kind, error.message),
            ));
        }
    }
    SheetData::new("METADATA", header, rows)
}

/// Lays out every sheet of the workbook in order.
/// 按顺序生成工作簿的全部工作表。
pub fn excel_sheets(
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    status: &TestStatus,
    meta: &ExcelMetadata,
    locale: &str,
) -> Vec<SheetData> {
    let mut sheets = Vec::new();
    match summary {
        Some(summary) => {
            let successes: Vec<&AggregateReport> =
                reports.iter().filter_map(FileReport::report).collect();
            sheets.push(total_sheet("SUMMARY TOTAL RESULTS", &summary.total, status, locale));
            sheets.push(stats_sheet("SUMMARY STATISTICS", &summary.stats, locale));
            sheets.push(individual_files_sheet(reports, status, locale));
            let daily = combined_daily(successes.iter().map(|r| &r.daily.dated));
            let by_name = combined_by_name(successes.iter().map(|r| &r.by_name));
            let by_env = combined_by_env(successes.iter().map(|r| &r.by_env));
            sheets.push(daily_sheet(&daily, status, locale));
            sheets.push(by_name_sheet(&by_name, locale));
            sheets.push(by_env_sheet(&by_env, status, locale));
        }
        None => {
            if let Some(report) = reports.first().and_then(FileReport::report) {
                sheets.push(total_sheet("TOTAL RESULTS", &report.total, status, locale));
                sheets.push(stats_sheet("STATISTICS", &report.stats, locale));
                sheets.push(daily_sheet(&report.daily.dated, status, locale));
                sheets.push(by_name_sheet(&report.by_name, locale));
                sheets.push(by_env_sheet(&report.by_env, status, locale));
            }
        }
    }
    sheets.push(export_sheet(reports, status));
    sheets.push(metadata_sheet(reports, summary, meta, locale));
    sheets
}

struct Styles {
    header: Format,
    body: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_font_name(FONT_NAME)
                .set_bold()
                .set_background_color(Color::RGB(0xCCCCCC))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            body: Format::new()
                .set_font_name(FONT_NAME)
                .set_border(FormatBorder::Thin),
        }
    }
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &ExportValue,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        ExportValue::Count(count) => {
            worksheet.write_number_with_format(row, col, *count as f64, format)?;
        }
        ExportValue::Rate(rate) => {
            worksheet.write_number_with_format(row, col, *rate, format)?;
        }
        ExportValue::Text(text) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
    }
    Ok(())
}

/// Writes one sheet. Result and total columns keep the default width; the others
/// are sized to their longest value.
fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetData,
    status: &TestStatus,
    styles: &Styles,
) -> Result<(), XlsxError> {
    worksheet.set_name(&sheet.name)?;

    for (col, label) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, &styles.header)?;
    }
    for (row, values) in sheet.rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            write_value(worksheet, row as u32 + 1, col as u16, value, &styles.body)?;
        }
    }

    for (col, label) in sheet.header.iter().enumerate() {
        if label == TOTAL_KEY || status.is_result(label) {
            continue;
        }
        let longest = sheet
            .rows
            .iter()
            .filter_map(|values| values.get(col))
            .map(|value| value.to_string().chars().count())
            .chain([label.chars().count()])
            .max()
            .unwrap_or(0);
        worksheet.set_column_width(col as u16, (longest + 4) as f64)?;
    }
    Ok(())
}

/// Writes `sheets` to an `.xlsx` file at `output_path`.
///
/// # Errors / 错误
/// Fails when a sheet name is invalid or the file cannot be saved.
/// 工作表名称无效或无法保存文件时返回错误。
pub fn generate_excel_report(
    sheets: &[SheetData],
    status: &TestStatus,
    output_path: &Path,
) -> Result<()> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, status, &styles)
            .with_context(|| format!("failed to write sheet '{}'", sheet.name))?;
    }
    workbook
        .save(output_path)
        .with_context(|| format!("failed to save workbook to '{}'", output_path.display()))?;
    Ok(())
}
