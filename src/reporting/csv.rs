//! # CSV Export / CSV 导出
//!
//! Flat two-dimensional export: one row per file, environment and date.
//! Files without environment data fall back to their daily rows, and files
//! without any dated data to a single totals row.
//!
//! 扁平的二维导出：每个文件、环境、日期一行。没有环境数据的文件退回到每日数据，
//! 没有任何日期数据的文件输出一行总计。

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::core::config::TestStatus;
use crate::core::models::{FileReport, Tally};

/// Byte order mark written at the start of CSV files so spreadsheet apps read UTF-8.
/// CSV 文件开头写入的字节顺序标记，使电子表格软件按 UTF-8 读取。
pub const UTF8_BOM: &str = "\u{feff}";

/// Header row: file, identifier, environment, date, results, then executed,
/// completed and planned labels.
pub fn header(status: &TestStatus) -> Vec<String> {
    let mut header: Vec<String> = ["file", "identifier", "environment", "date"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    header.extend(status.results.iter().cloned());
    header.extend([
        status.labels.executed.clone(),
        status.labels.completed.clone(),
        status.labels.planned.clone(),
    ]);
    header
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn bucket_values(bucket: &Tally, status: &TestStatus) -> Vec<String> {
    status
        .results
        .iter()
        .map(String::as_str)
        .chain([
            status.labels.executed.as_str(),
            status.labels.completed.as_str(),
            status.labels.planned.as_str(),
        ])
        .map(|label| bucket.get(label).to_string())
        .collect()
}

/// Builds every data row. Failed files produce no rows.
/// 构建所有数据行。失败的文件不产生任何行。
pub fn rows(reports: &[FileReport], status: &TestStatus) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    for file in reports {
        let Some(report) = file.report() else {
            continue;
        };
        let name = file_name(&file.file);
        let identifier = file.identifier.clone().unwrap_or_default();
        let prefix = |env: &str, date: &str| {
            vec![name.clone(), identifier.clone(), env.to_string(), date.to_string()]
        };

        let has_env = report.by_env.values().any(|daily| !daily.is_empty());
        if has_env {
            for (env, daily) in &report.by_env {
                for (date, bucket) in daily {
                    let mut row = prefix(env, date);
                    row.extend(bucket_values(bucket, status));
                    out.push(row);
                }
            }
        } else if !report.daily.dated.is_empty() {
            for (date, bucket) in &report.daily.dated {
                let mut row = prefix("", date);
                row.extend(bucket_values(bucket, status));
                out.push(row);
            }
        } else {
            let mut row = prefix("", "");
            row.extend(
                status
                    .results
                    .iter()
                    .map(|r| report.total.results.get(r).to_string()),
            );
            row.push(report.stats.executed.to_string());
            row.push(report.stats.completed.to_string());
            row.push(report.stats.planned.to_string());
            out.push(row);
        }
    }
    out
}

/// Writes the header and every row to `writer`.
pub fn write_csv<W: io::Write>(writer: W, reports: &[FileReport], status: &TestStatus) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(status))
        .context("failed to write CSV header")?;
    for row in rows(reports, status) {
        csv.write_record(&row).context("failed to write CSV row")?;
    }
    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Renders the CSV into a string.
pub fn to_csv_string(reports: &[FileReport], status: &TestStatus) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, reports, status)?;
    String::from_utf8(buffer).context("CSV output is not valid UTF-8")
}

/// Writes the CSV to `path`, prefixed with [`UTF8_BOM`].
pub fn write_csv_file(path: &Path, reports: &[FileReport], status: &TestStatus) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(UTF8_BOM.as_bytes())
        .context("failed to write CSV byte order mark")?;
    write_csv(&mut writer, reports, status)?;
    writer.flush().context("failed to flush CSV file")?;
    Ok(())
}
