//! # Console Reporting Module / 控制台报告模块
//!
//! Renders file reports and batch summaries as colored text and tables for the
//! terminal. Rendering returns strings; the `print_*` wrappers write them out.
//!
//! 将文件报告和批处理汇总渲染为终端中的彩色文本与表格。
//! 渲染函数返回字符串，`print_*` 包装函数负责输出。

use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use std::fmt::Write;

use crate::core::filter::FilterSpec;
use crate::core::models::{AggregateReport, FileReport, RunState, TOTAL_KEY, Tally};
use crate::core::summary::BatchSummary;
use crate::infra::t;

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

/// Tables follow the `colored` switch, so a disabled override also strips cell styling.
fn new_table(headers: Vec<Cell>) -> Table {
    let mut table = Table::new();
    if !colored::control::SHOULD_COLORIZE.should_colorize() {
        table.force_no_tty();
    }
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn align_numbers_from(table: &mut Table, first: usize) {
    for index in first..table.column_count() {
        align_column(table, index, CellAlignment::Right);
    }
}

fn colored_status(status: &str, state: RunState) -> ColoredString {
    match state {
        RunState::Completed => status.green().bold(),
        RunState::InProgress => status.yellow().bold(),
        RunState::NotStarted => status.dimmed(),
        RunState::Unknown => status.red(),
    }
}

fn label_headers(bucket: &Tally) -> Vec<Cell> {
    bucket.iter().map(|(label, _)| header_cell(label)).collect()
}

fn count_cells(bucket: &Tally) -> Vec<Cell> {
    bucket.iter().map(|(_, count)| Cell::new(count)).collect()
}

/// Table with one row: results, `Total`, completed, executed and the two rates.
pub fn total_table(report: &AggregateReport) -> Table {
    let total = &report.total;
    let mut headers = label_headers(&total.results);
    headers.extend([
        header_cell(TOTAL_KEY),
        header_cell(&total.labels.completed),
        header_cell(&total.labels.executed),
        header_cell(&total.labels.completion_rate),
        header_cell(&total.labels.execution_rate),
    ]);

    let mut row = count_cells(&total.results);
    row.extend([
        Cell::new(total.total).add_attribute(Attribute::Bold),
        Cell::new(total.completed).fg(Color::Green),
        Cell::new(total.executed),
        Cell::new(format!("{:.2}", total.completion_rate)),
        Cell::new(format!("{:.2}", total.execution_rate)),
    ]);

    let mut table = new_table(headers);
    table.add_row(row);
    align_numbers_from(&mut table, 0);
    table
}

/// Date rows with every bucket label as a column.
pub fn daily_table(report: &AggregateReport, locale: &str) -> Option<Table> {
    let first = report.daily.dated.values().next()?;
    let mut headers = vec![header_cell(&t!("report.date", locale = locale))];
    headers.extend(label_headers(first));

    let mut table = new_table(headers);
    for (date, bucket) in &report.daily.dated {
        let mut row = vec![Cell::new(date)];
        row.extend(count_cells(bucket));
        table.add_row(row);
    }
    align_numbers_from(&mut table, 1);
    Some(table)
}

pub fn by_name_table(report: &AggregateReport, locale: &str) -> Option<Table> {
    if report.by_name.is_empty() {
        return None;
    }
    let mut table = new_table(vec![
        header_cell(&t!("report.date", locale = locale)),
        header_cell(&t!("report.tester", locale = locale)),
        header_cell(&t!("report.count", locale = locale)),
    ]);
    for (date, testers) in &report.by_name {
        for (tester, count) in testers {
            table.add_row(vec![Cell::new(date), Cell::new(tester), Cell::new(count)]);
        }
    }
    align_column(&mut table, 2, CellAlignment::Right);
    Some(table)
}

pub fn by_env_table(report: &AggregateReport, locale: &str) -> Option<Table> {
    let first = report.by_env.values().flat_map(|daily| daily.values()).next()?;
    let mut headers = vec![
        header_cell(&t!("report.environment", locale = locale)),
        header_cell(&t!("report.date", locale = locale)),
    ];
    headers.extend(label_headers(first));

    let mut table = new_table(headers);
    for (env, daily) in &report.by_env {
        for (date, bucket) in daily {
            let mut row = vec![Cell::new(env), Cell::new(date)];
            row.extend(count_cells(bucket));
            table.add_row(row);
        }
    }
    align_numbers_from(&mut table, 2);
    Some(table)
}

/// Renders one file: title, filters, status, totals and the breakdown tables.
/// Failed files render as a single error line.
///
/// 渲染单个文件：标题、过滤条件、状态、总计以及各维度表格。失败的文件渲染为一行错误信息。
pub fn render_file_report(file: &FileReport, filter: &FilterSpec, locale: &str) -> String {
    let mut out = String::new();
    let title = t!("report.file", file = &file.file, locale = locale);
    let _ = writeln!(out, "\n{}", title.bold());
    if let Some(identifier) = &file.identifier {
        let _ = writeln!(out, "{}", t!("report.identifier", id = identifier, locale = locale));
    }

    let report = match (file.report(), file.error()) {
        (Some(report), _) => report,
        (None, Some(error)) => {
            let line = t!("report.error", kind = &error.kind, message = &error.message, locale = locale);
            let _ = writeln!(out, "{}", line.red());
            return out;
        }
        (None, None) => return out,
    };

    let filter_lines = filter.describe();
    if !filter_lines.is_empty() {
        let _ = writeln!(out, "{}", t!("report.filters", locale = locale).cyan());
        for line in filter_lines {
            let _ = writeln!(out, "  {line}");
        }
    }
    if let Some(filtered) = report.filtered_stats {
        let line = t!(
            "report.filtered_cases",
            filtered = filtered.filtered_count,
            total = filtered.original_count,
            locale = locale
        );
        let _ = writeln!(out, "{line}");
    }

    let stats = &report.stats;
    let _ = writeln!(
        out,
        "{}: {}",
        t!("report.status", locale = locale),
        colored_status(&report.run.status, report.run.state)
    );
    let _ = writeln!(
        out,
        "{}",
        t!(
            "report.cases",
            all = stats.all,
            excluded = stats.excluded,
            available = stats.available,
            planned = stats.planned,
            locale = locale
        )
    );
    if let Some(start) = &report.run.start_date {
        let _ = writeln!(out, "{}: {start}", t!("report.start_date", locale = locale));
    }
    if let Some(last) = &report.run.last_update {
        let _ = writeln!(out, "{}: {last}", t!("report.last_update", locale = locale));
    }
    if let Some(warning) = &report.warning {
        let line = t!("report.warning", message = &warning.message, locale = locale);
        let _ = writeln!(out, "{}", line.yellow());
    }

    let _ = writeln!(out, "\n{}", t!("report.total", locale = locale).bold());
    let _ = writeln!(out, "{}", total_table(report));

    let sections = [
        (t!("report.daily", locale = locale), daily_table(report, locale)),
        (t!("report.by_name", locale = locale), by_name_table(report, locale)),
        (t!("report.by_env", locale = locale), by_env_table(report, locale)),
    ];
    for (title, table) in sections {
        if let Some(table) = table {
            let _ = writeln!(out, "\n{}", title.bold());
            let _ = writeln!(out, "{table}");
        }
    }

    out
}

/// Renders the multi-file breakdown, the error list and the overall status.
/// 渲染多文件明细、错误列表和整体状态。
pub fn render_batch_summary(reports: &[FileReport], summary: &BatchSummary, locale: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", t!("summary.banner", locale = locale).bold());
    let _ = writeln!(
        out,
        "{}",
        t!(
            "summary.files",
            processed = summary.processed,
            total = summary.file_count,
            locale = locale
        )
    );

    let labels = &summary.total.labels;
    let mut table = new_table(vec![
        header_cell(&t!("summary.file", locale = locale)),
        header_cell(&t!("report.status", locale = locale)),
        header_cell(TOTAL_KEY),
        header_cell(&labels.completed),
        header_cell(&labels.executed),
        header_cell(&labels.completion_rate),
        header_cell(&labels.execution_rate),
    ]);
    for file in reports {
        let name = file.identifier.as_deref().unwrap_or(&file.file);
        match (file.report(), file.error()) {
            (Some(report), _) => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(&report.run.status),
                    Cell::new(report.total.total),
                    Cell::new(report.total.completed),
                    Cell::new(report.total.executed),
                    Cell::new(format!("{:.2}", report.total.completion_rate)),
                    Cell::new(format!("{:.2}", report.total.execution_rate)),
                ]);
            }
            (None, Some(error)) => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(&error.kind).fg(Color::Red),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
            (None, None) => {}
        }
    }
    let total = &summary.total;
    table.add_row(vec![
        Cell::new(TOTAL_KEY).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(&summary.status).add_attribute(Attribute::Bold),
        Cell::new(total.total).add_attribute(Attribute::Bold),
        Cell::new(total.completed).add_attribute(Attribute::Bold),
        Cell::new(total.executed).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", total.completion_rate)).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", total.execution_rate)).add_attribute(Attribute::Bold),
    ]);
    align_numbers_from(&mut table, 2);
    let _ = writeln!(out, "{table}");

    if !summary.errors.is_empty() {
        let _ = writeln!(out, "\n{}", t!("summary.errors", locale = locale).red().bold());
        for failed in &summary.errors {
            let _ = writeln!(out, "  - {} [{}]: {}", failed.file, failed.error.kind, failed.error.message);
        }
    }

    let _ = writeln!(
        out,
        "\n{}",
        t!("summary.overall", status = &summary.status, locale = locale).bold()
    );
    if let Some(start) = &summary.start_date {
        let _ = writeln!(out, "{}", t!("summary.earliest_start", date = start, locale = locale));
    }
    if let Some(last) = &summary.last_update {
        let _ = writeln!(out, "{}", t!("summary.latest_update", date = last, locale = locale));
    }
    out
}

pub fn print_file_report(file: &FileReport, filter: &FilterSpec, locale: &str) {
    print!("{}", render_file_report(file, filter, locale));
}

pub fn print_batch_summary(reports: &[FileReport], summary: &BatchSummary, locale: &str) {
    print!("{}", render_batch_summary(reports, summary, locale));
}
