//! # Export Summary / 导出摘要
//!
//! One row per file with the figures usually pasted into a progress sheet:
//! case count, last update, completed count, both rates as `done/available (x%)`
//! text, every result count and the not-run count. Rendered as TSV for pasting
//! and embedded as a sheet in the Excel workbook.
//!
//! 每个文件一行，包含通常粘贴到进度表中的数据：项目数、更新日、完成数、
//! 以 `完成/可用 (x%)` 文本表示的两个比率、各结果数以及未着手数。
//! 以 TSV 形式输出以便粘贴，并作为一张工作表嵌入 Excel 工作簿。

use std::fmt;
use std::path::Path;

use crate::core::config::TestStatus;
use crate::core::models::FileReport;

const FIXED_HEADERS: [&str; 7] = ["No.", "ファイル名", "項目数", "更新日", "完了数", "消化率", "完了率"];

/// One exported cell.
/// 一个导出单元格。
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Count(i64),
    /// Percentage rounded to 2 decimals.
    Rate(f64),
    Text(String),
}

impl ExportValue {
    pub fn text(value: impl Into<String>) -> Self {
        ExportValue::Text(value.into())
    }
}

impl fmt::Display for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportValue::Count(count) => write!(f, "{count}"),
            ExportValue::Rate(rate) => write!(f, "{rate:.2}"),
            ExportValue::Text(text) => f.write_str(text),
        }
    }
}

/// `done/available (rate%)` with one decimal, or `-` when nothing is available.
/// `完成/可用 (比率%)`，保留一位小数；没有可用项目时为 `-`。
pub fn count_and_rate_text(done: u64, available: i64) -> String {
    if available <= 0 {
        return "-".to_string();
    }
    let rate = done as f64 / available as f64 * 100.0;
    format!("{done}/{available} ({rate:.1}%)")
}

/// Fixed columns, then every result label, then the not-run label.
pub fn export_header(status: &TestStatus) -> Vec<String> {
    FIXED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(status.results.iter().cloned())
        .chain([status.labels.not_run.clone()])
        .collect()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Builds one row per file, numbered from 1. Failed files keep only their number
/// and name followed by blank cells.
///
/// 为每个文件构建一行，编号从 1 开始。失败的文件只保留编号和文件名，其余为空白单元格。
pub fn export_rows(reports: &[FileReport], status: &TestStatus) -> Vec<Vec<ExportValue>> {
    reports
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let mut row = vec![
                ExportValue::Count(index as i64 + 1),
                ExportValue::text(file_name(&file.file)),
            ];
            let Some(report) = file.report() else {
                row.extend(std::iter::repeat_n(ExportValue::text(""), FIXED_HEADERS.len() - 2));
                return row;
            };

            let stats = &report.stats;
            row.extend([
                ExportValue::Count(stats.available),
                ExportValue::text(report.run.last_update.clone().unwrap_or_default()),
                ExportValue::Count(stats.completed as i64),
                ExportValue::text(count_and_rate_text(stats.executed, stats.available)),
                ExportValue::text(count_and_rate_text(stats.completed, stats.available)),
            ]);
            row.extend(
                status
                    .results
                    .iter()
                    .map(|result| ExportValue::Count(report.total.results.get(result) as i64)),
            );
            row.push(ExportValue::Count(stats.incompleted as i64));
            row
        })
        .collect()
}

/// Tab-separated header and rows, one line each.
/// 以制表符分隔的表头和数据行，每行一条。
pub fn to_tsv_string(reports: &[FileReport], status: &TestStatus) -> String {
    let mut out = export_header(status).join("\t");
    out.push('\n');
    for row in export_rows(reports, status) {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        out.push_str(&line.join("\t"));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_text_uses_one_decimal() {
        assert_eq!(count_and_rate_text(1, 3), "1/3 (33.3%)");
        assert_eq!(count_and_rate_text(2, 2), "2/2 (100.0%)");
        assert_eq!(count_and_rate_text(0, 0), "-");
        assert_eq!(count_and_rate_text(1, -1), "-");
    }

    #[test]
    fn values_render_as_plain_text() {
        assert_eq!(ExportValue::Count(7).to_string(), "7");
        assert_eq!(ExportValue::Rate(33.3).to_string(), "33.30");
        assert_eq!(ExportValue::text("a.xlsx").to_string(), "a.xlsx");
    }
}
