//! # HTML Reporting Module / HTML 报告模块
//!
//! Builds a self-contained HTML report with summary cards and the total, daily,
//! by-tester and by-environment tables of every file.
//!
//! 生成一个独立的 HTML 报告，包含摘要卡片以及每个文件的总计、按日、按担当者和按环境表格。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::{AggregateReport, FileReport, RunState, TOTAL_KEY, Tally};
use crate::core::summary::BatchSummary;
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Simple HTML escape function to replace special characters with their HTML entities
/// 简单的 HTML 转义函数，用 HTML 实体替换特殊字符
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn state_class(state: RunState) -> &'static str {
    match state {
        RunState::Completed => "completed",
        RunState::InProgress => "in-progress",
        RunState::NotStarted => "not-started",
        RunState::Unknown => "unknown",
    }
}

fn summary_item(html: &mut String, value: impl std::fmt::Display, label: &str, class: &str) {
    html.push_str(&format!(
        "<div class='summary-item'><span class='count {}'>{}</span><span class='label'>{}</span></div>",
        class,
        escape_html(&value.to_string()),
        escape_html(label)
    ));
}

fn header_row(html: &mut String, leading: &[&str], bucket: &Tally) {
    html.push_str("<thead><tr>");
    for label in leading.iter().copied().chain(bucket.iter().map(|(l, _)| l)) {
        html.push_str(&format!("<th>{}</th>", escape_html(label)));
    }
    html.push_str("</tr></thead>");
}

fn bucket_row(html: &mut String, leading: &[&str], bucket: &Tally) {
    html.push_str("<tr>");
    for cell in leading {
        html.push_str(&format!("<td>{}</td>", escape_html(cell)));
    }
    for (_, count) in bucket.iter() {
        html.push_str(&format!("<td class='num'>{count}</td>"));
    }
    html.push_str("</tr>");
}

fn push_report(html: &mut String, report: &AggregateReport, locale: &str) {
    let stats = &report.stats;
    let total = &report.total;

    html.push_str("<div class='summary-container'>");
    summary_item(html, &report.run.status, &t!("report.status", locale = locale), state_class(report.run.state));
    summary_item(html, stats.all, &t!("html_report.all", locale = locale), "");
    summary_item(html, stats.available, &t!("html_report.available", locale = locale), "");
    summary_item(html, total.executed, &total.labels.executed, "");
    summary_item(html, total.completed, &total.labels.completed, "completed");
    summary_item(html, format!("{:.2}", total.completion_rate), &total.labels.completion_rate, "");
    summary_item(html, format!("{:.2}", total.execution_rate), &total.labels.execution_rate, "");
    html.push_str("</div>");

    if let Some(start) = &report.run.start_date {
        html.push_str(&format!(
            "<p class='dates'>{}: {}",
            t!("report.start_date", locale = locale),
            escape_html(start)
        ));
        if let Some(last) = &report.run.last_update {
            html.push_str(&format!(
                " &middot; {}: {}",
                t!("report.last_update", locale = locale),
                escape_html(last)
            ));
        }
        html.push_str("</p>");
    }
    if let Some(warning) = &report.warning {
        html.push_str(&format!(
            "<p class='warning'>{}</p>",
            escape_html(&t!("report.warning", message = &warning.message, locale = locale))
        ));
    }

    // Totals
    html.push_str(&format!("<h3>{}</h3><table>", t!("report.total", locale = locale)));
    html.push_str("<thead><tr>");
    for (label, _) in total.results.iter() {
        html.push_str(&format!("<th>{}</th>", escape_html(label)));
    }
    for label in [
        TOTAL_KEY,
        total.labels.completed.as_str(),
        total.labels.executed.as_str(),
        total.labels.completion_rate.as_str(),
        total.labels.execution_rate.as_str(),
    ] {
        html.push_str(&format!("<th>{}</th>", escape_html(label)));
    }
    html.push_str("</tr></thead><tbody><tr>");
    for (_, count) in total.results.iter() {
        html.push_str(&format!("<td class='num'>{count}</td>"));
    }
    html.push_str(&format!(
        "<td class='num'>{}</td><td class='num'>{}</td><td class='num'>{}</td><td class='num'>{:.2}</td><td class='num'>{:.2}</td>",
        total.total, total.completed, total.executed, total.completion_rate, total.execution_rate
    ));
    html.push_str("</tr></tbody></table>");

    // Daily
    if let Some(first) = report.daily.dated.values().next() {
        let date_label = t!("report.date", locale = locale);
        html.push_str(&format!("<h3>{}</h3><table>", t!("report.daily", locale = locale)));
        header_row(html, &[&*date_label], first);
        html.push_str("<tbody>");
        for (date, bucket) in &report.daily.dated {
            bucket_row(html, &[date.as_str()], bucket);
        }
        html.push_str("</tbody></table>");
    }

    // By tester
    if !report.by_name.is_empty() {
        html.push_str(&format!(
            "<h3>{}</h3><table><thead><tr><th>{}</th><th>{}</th><th>{}</th></tr></thead><tbody>",
            t!("report.by_name", locale = locale),
            t!("report.date", locale = locale),
            t!("report.tester", locale = locale),
            t!("report.count", locale = locale)
        ));
        for (date, testers) in &report.by_name {
            for (tester, count) in testers {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td class='num'>{}</td></tr>",
                    escape_html(date),
                    escape_html(tester),
                    count
                ));
            }
        }
        html.push_str("</tbody></table>");
    }

    // By environment
    if let Some(first) = report.by_env.values().flat_map(|daily| daily.values()).next() {
        let env_label = t!("report.environment", locale = locale);
        let date_label = t!("report.date", locale = locale);
        html.push_str(&format!("<h3>{}</h3><table>", t!("report.by_env", locale = locale)));
        header_row(html, &[&*env_label, &*date_label], first);
        html.push_str("<tbody>");
        for (env, daily) in &report.by_env {
            for (date, bucket) in daily {
                bucket_row(html, &[env.as_str(), date.as_str()], bucket);
            }
        }
        html.push_str("</tbody></table>");
    }
}

fn push_batch_summary(html: &mut String, summary: &BatchSummary, locale: &str) {
    let total = &summary.total;
    html.push_str(&format!("<h2>{}</h2>", t!("summary.banner", locale = locale)));
    html.push_str("<div class='summary-container'>");
    summary_item(html, &summary.status, &t!("report.status", locale = locale), "");
    summary_item(
        html,
        format!("{}/{}", summary.processed, summary.file_count),
        &t!("html_report.files", locale = locale),
        "",
    );
    summary_item(html, summary.stats.available, &t!("html_report.available", locale = locale), "");
    summary_item(html, total.executed, &total.labels.executed, "");
    summary_item(html, total.completed, &total.labels.completed, "completed");
    summary_item(html, format!("{:.2}", total.completion_rate), &total.labels.completion_rate, "");
    summary_item(html, format!("{:.2}", total.execution_rate), &total.labels.execution_rate, "");
    html.push_str("</div>");

    if !summary.errors.is_empty() {
        html.push_str(&format!("<h3>{}</h3><ul class='errors'>", t!("summary.errors", locale = locale)));
        for failed in &summary.errors {
            html.push_str(&format!(
                "<li><strong>{}</strong> [{}] {}</li>",
                escape_html(&failed.file),
                escape_html(&failed.error.kind),
                escape_html(&failed.error.message)
            ));
        }
        html.push_str("</ul>");
    }
}

/// Renders the complete HTML document.
/// 渲染完整的 HTML 文档。
pub fn render_html_report(
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    locale: &str,
) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'><title>{}</title>",
        t!("html_report.title", locale = locale)
    ));
    html.push_str("<style>");
    html.push_str(HTML_STYLE);
    html.push_str("</style>");
    html.push_str("</head><body>");
    html.push_str(&format!(
        "<h1>{}</h1>",
        t!("html_report.main_header", locale = locale)
    ));

    if let Some(summary) = summary {
        push_batch_summary(&mut html, summary, locale);
    }

    for file in reports {
        html.push_str("<section class='file'>");
        html.push_str(&format!("<h2>{}</h2>", escape_html(&file.file)));
        if let Some(identifier) = &file.identifier {
            html.push_str(&format!("<p class='identifier'>{}</p>", escape_html(identifier)));
        }
        match (file.report(), file.error()) {
            (Some(report), _) => push_report(&mut html, report, locale),
            (None, Some(error)) => html.push_str(&format!(
                "<p class='error'>{}</p>",
                escape_html(&t!(
                    "report.error",
                    kind = &error.kind,
                    message = &error.message,
                    locale = locale
                ))
            )),
            (None, None) => {}
        }
        html.push_str("</section>");
    }

    html.push_str("</body></html>");
    html
}

/// Writes the HTML report to `output_path`.
///
/// # Errors / 错误
/// Fails when the file cannot be written.
/// 无法写入文件时返回错误。
pub fn generate_html_report(
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    output_path: &Path,
    locale: &str,
) -> Result<()> {
    let html = render_html_report(reports, summary, locale);
    fs::write(output_path, html)
        .with_context(|| format!("failed to write HTML report to '{}'", output_path.display()))?;
    Ok(())
}
