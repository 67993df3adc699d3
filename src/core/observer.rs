//! # Aggregation Observer / 聚合观察者
//!
//! Telemetry hooks passed explicitly into the aggregation pipeline. The library
//! never logs on its own; callers decide where events go.
//!
//! 显式传入聚合管道的遥测钩子。库本身从不直接记录日志，由调用方决定事件去向。

use std::path::Path;

use crate::core::columns::ColumnLayout;
use crate::core::config::column_letter;
use crate::core::models::Notice;

/// Receives progress events from the pipeline. Every method defaults to a no-op.
/// 接收管道进度事件。所有方法默认均为空操作。
pub trait AggregationObserver {
    fn on_sheets_selected(&self, _sheets: &[String]) {}

    fn on_header_found(&self, _sheet: &str, _row: usize) {}

    fn on_columns_resolved(&self, _sheet: &str, _layout: &ColumnLayout, _tobe: &[usize]) {}

    fn on_sheet_counted(&self, _sheet: &str, _sets: usize, _cases: u64) {}

    fn on_filter_applied(&self, _kept: usize, _total: usize) {}

    fn on_warning(&self, _warning: &Notice) {}

    fn on_file_started(&self, _path: &Path) {}

    fn on_file_finished(&self, _path: &Path, _error: Option<&Notice>) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AggregationObserver for NoopObserver {}

/// Forwards events to `tracing`.
/// 将事件转发到 `tracing`。
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AggregationObserver for TracingObserver {
    fn on_sheets_selected(&self, sheets: &[String]) {
        tracing::debug!(count = sheets.len(), sheets = ?sheets, "target sheets selected");
    }

    fn on_header_found(&self, sheet: &str, row: usize) {
        tracing::debug!(sheet, row, "header row located");
    }

    fn on_columns_resolved(&self, sheet: &str, layout: &ColumnLayout, tobe: &[usize]) {
        for (index, set) in layout.sets.iter().enumerate() {
            tracing::debug!(
                sheet,
                set = index + 1,
                result = %column_letter(set.result),
                tester = %column_letter(set.tester),
                date = %column_letter(set.date),
                plan = ?set.plan.map(column_letter),
                "column set resolved"
            );
        }
        let tobe: Vec<String> = tobe.iter().copied().map(column_letter).collect();
        tracing::debug!(
            sheet,
            tobe = ?tobe,
            has_plan = layout.has_plan(),
            "expected-result columns resolved"
        );
    }

    fn on_sheet_counted(&self, sheet: &str, sets: usize, cases: u64) {
        tracing::debug!(sheet, sets, cases, "sheet counted");
    }

    fn on_filter_applied(&self, kept: usize, total: usize) {
        tracing::info!(kept, total, "filters applied");
    }

    fn on_warning(&self, warning: &Notice) {
        tracing::warn!(kind = %warning.kind, "{}", warning.message);
    }

    fn on_file_started(&self, path: &Path) {
        tracing::info!(file = %path.display(), "aggregating");
    }

    fn on_file_finished(&self, path: &Path, error: Option<&Notice>) {
        match error {
            Some(error) => {
                tracing::error!(file = %path.display(), kind = %error.kind, "{}", error.message)
            }
            None => tracing::info!(file = %path.display(), "aggregated"),
        }
    }
}
