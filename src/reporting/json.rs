//! # JSON Output / JSON 输出
//!
//! Pretty-printed JSON for a single file or for a batch with its summary.
//!
//! 单个文件或带汇总的批处理的格式化 JSON 输出。

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::models::FileReport;
use crate::core::summary::BatchSummary;

#[derive(Serialize)]
struct BatchDocument<'a> {
    files: &'a [FileReport],
    summary: &'a BatchSummary,
}

/// One file serializes as its report; several files as `{ "files": [...], "summary": {...} }`.
/// 单个文件序列化为其报告；多个文件序列化为 `{ "files": [...], "summary": {...} }`。
pub fn to_json_string(reports: &[FileReport], summary: Option<&BatchSummary>) -> Result<String> {
    let json = match (reports, summary) {
        ([single], None) => serde_json::to_string_pretty(single),
        (files, Some(summary)) => serde_json::to_string_pretty(&BatchDocument { files, summary }),
        (files, None) => serde_json::to_string_pretty(files),
    };
    json.context("failed to serialize report as JSON")
}
