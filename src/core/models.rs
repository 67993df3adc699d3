//! # Data Models / 数据模型
//!
//! Typed records flowing through the aggregation pipeline: extracted rows,
//! zero-initialized count buckets, and the final per-file report.
//!
//! 在聚合管道中流转的类型化记录：提取出的行、零初始化的计数桶以及最终的单文件报告。

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::config::TestStatus;

/// Tester name used for rows that have a result and a date but nobody recorded.
/// 有结果和日期但未记录担当者的行所使用的担当者名称。
pub const NO_NAME: &str = "NO_NAME";

/// Key under which undated rows are reported at the serialization boundary.
/// 无日期行在序列化边界上使用的键。
pub const NO_DATE: &str = "no_date";

/// One data row of one set. Empty cells are `None`.
/// 某个集合中的一行数据。空单元格为 `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub result: Option<String>,
    pub tester: Option<String>,
    pub date: Option<String>,
    /// Planned execution date on the same spreadsheet row, if the sheet has plan columns.
    /// 同一表格行上的计划实施日期（如果工作表有计划列）。
    pub plan: Option<String>,
    pub sheet: String,
}

impl Row {
    /// The tester this row aggregates under.
    ///
    /// Rows with a result and a date but no tester report as [`NO_NAME`] so they stay
    /// visible in the by-name breakdown.
    ///
    /// 此行聚合时使用的担当者。
    /// 有结果和日期但没有担当者的行会以 [`NO_NAME`] 报告，以便在按人员统计中可见。
    pub fn tester_label(&self) -> Option<&str> {
        match &self.tester {
            Some(tester) => Some(tester.as_str()),
            None if self.result.is_some() && self.date.is_some() => Some(NO_NAME),
            None => None,
        }
    }
}

/// Ordered category → count record. Key order is the configured order.
/// 有序的类别 → 计数记录。键顺序即配置顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, u64)>,
}

impl Tally {
    /// Builds a bucket with a zero count for every label.
    /// 构建一个每个标签计数都为零的桶。
    pub fn zeroed<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: labels.into_iter().map(|l| (l.to_string(), 0)).collect(),
        }
    }

    /// A bucket holding every result plus the completed, executed and planned labels.
    pub fn for_status(status: &TestStatus) -> Self {
        Self::zeroed(status.bucket_labels())
    }

    pub fn get(&self, label: &str) -> u64 {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == label)
    }

    /// Adds `amount` to `label`, appending the label if the bucket lacks it.
    pub fn add(&mut self, label: &str, amount: u64) {
        match self.entries.iter_mut().find(|(key, _)| key == label) {
            Some((_, count)) => *count += amount,
            None => self.entries.push((label.to_string(), amount)),
        }
    }

    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    /// Keeps only the labels accepted by `keep`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(key, _)| keep(key));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Date-keyed buckets plus the separate bucket of undated rows.
///
/// Only the dated part is serialized; the undated bucket feeds the grand total.
///
/// 按日期索引的计数桶，以及单独的无日期行计数桶。
/// 只有带日期的部分会被序列化；无日期桶仅计入总计。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyTally {
    pub dated: BTreeMap<String, Tally>,
    pub undated: Option<Tally>,
}

impl DailyTally {
    /// Earliest date key / 最早的日期键
    pub fn first_date(&self) -> Option<&str> {
        self.dated.keys().next().map(String::as_str)
    }

    /// Latest date key / 最晚的日期键
    pub fn last_date(&self) -> Option<&str> {
        self.dated.keys().next_back().map(String::as_str)
    }

    /// All buckets, dated first in key order, then the undated one.
    pub fn buckets(&self) -> impl Iterator<Item = &Tally> {
        self.dated.values().chain(self.undated.iter())
    }
}

impl Serialize for DailyTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dated.serialize(serializer)
    }
}

/// Case counts of one file.
/// 单个文件的用例计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub all: u64,
    pub excluded: u64,
    /// `all - excluded`; negative only when the sheet data is inconsistent.
    pub available: i64,
    pub executed: u64,
    pub completed: u64,
    pub incompleted: u64,
    pub planned: u64,
}

/// Run status of a file (or of a whole batch).
/// 文件（或整个批次）的实施状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    InProgress,
    Completed,
    /// Not reachable with consistent counts; reported as `"???"`.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    #[serde(skip)]
    pub state: RunState,
    /// Configured display name of `state` / `state` 的配置显示名称
    pub status: String,
    pub start_date: Option<String>,
    pub last_update: Option<String>,
}

/// Grand totals: per-result counts followed by derived counters and rates.
///
/// Serialized with the configured labels as keys:
/// `{<results…>, "Total", <completed>, <executed>, <completion rate>, <execution rate>}`.
///
/// 总计：各结果的计数，其后为派生计数器和比率。以配置的标签作为序列化键。
#[derive(Debug, Clone, PartialEq)]
pub struct GrandTotal {
    pub results: Tally,
    pub total: u64,
    pub completed: u64,
    pub executed: u64,
    pub completion_rate: f64,
    pub execution_rate: f64,
    pub labels: TotalLabels,
}

/// Keys used when a [`GrandTotal`] is serialized or rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalLabels {
    pub completed: String,
    pub executed: String,
    pub completion_rate: String,
    pub execution_rate: String,
}

impl TotalLabels {
    pub fn from_status(status: &TestStatus) -> Self {
        Self {
            completed: status.labels.completed.clone(),
            executed: status.labels.executed.clone(),
            completion_rate: status.labels.completion_rate.clone(),
            execution_rate: status.labels.execution_rate.clone(),
        }
    }
}

pub const TOTAL_KEY: &str = "Total";

impl Serialize for GrandTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, count) in self.results.iter() {
            map.serialize_entry(key, &count)?;
        }
        map.serialize_entry(TOTAL_KEY, &self.total)?;
        map.serialize_entry(&self.labels.completed, &self.completed)?;
        map.serialize_entry(&self.labels.executed, &self.executed)?;
        map.serialize_entry(&self.labels.completion_rate, &self.completion_rate)?;
        map.serialize_entry(&self.labels.execution_rate, &self.execution_rate)?;
        map.end()
    }
}

/// A typed message attached to a report: a warning or an error record.
/// 附加在报告上的类型化消息：警告或错误记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Per-sheet contribution to the case counts.
/// 每个工作表对用例计数的贡献。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetCounts {
    pub sheet_name: String,
    pub env_count: usize,
    pub all: u64,
    pub all_plan: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilteredStats {
    pub filtered_count: usize,
    pub original_count: usize,
}

/// Set name → date → bucket.
pub type EnvBreakdown = BTreeMap<String, BTreeMap<String, Tally>>;

/// Date → tester → number of rows with a result.
pub type NameBreakdown = BTreeMap<String, BTreeMap<String, u64>>;

/// The aggregate of one workbook. Created once and never mutated afterwards.
/// 单个工作簿的聚合结果。创建一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub stats: Stats,
    pub run: RunInfo,
    pub count_by_sheet: Vec<SheetCounts>,
    pub daily: DailyTally,
    pub by_name: NameBreakdown,
    pub by_env: EnvBreakdown,
    pub total: GrandTotal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_stats: Option<FilteredStats>,
}

/// Outcome of one file in a batch.
/// 批处理中单个文件的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Aggregated(Box<AggregateReport>),
    Failed { error: Notice },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn report(&self) -> Option<&AggregateReport> {
        match &self.outcome {
            FileOutcome::Aggregated(report) => Some(report),
            FileOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&Notice> {
        match &self.outcome {
            FileOutcome::Failed { error } => Some(error),
            FileOutcome::Aggregated(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(result: Option<&str>, tester: Option<&str>, date: Option<&str>) -> Row {
        Row {
            result: result.map(str::to_string),
            tester: tester.map(str::to_string),
            date: date.map(str::to_string),
            plan: None,
            sheet: "S".to_string(),
        }
    }

    #[test]
    fn missing_tester_becomes_no_name_only_with_result_and_date() {
        assert_eq!(row(Some("Pass"), None, Some("2024-01-01")).tester_label(), Some(NO_NAME));
        assert_eq!(row(Some("Pass"), None, None).tester_label(), None);
        assert_eq!(row(None, None, Some("2024-01-01")).tester_label(), None);
        assert_eq!(row(None, Some("Bob"), None).tester_label(), Some("Bob"));
    }

    #[test]
    fn tally_keeps_label_order_and_serializes_as_map() {
        let mut tally = Tally::zeroed(["Pass", "Fail", "完了数"]);
        tally.increment("Fail");
        tally.add("Pass", 2);
        tally.increment("extra");
        assert_eq!(tally.get("Pass"), 2);
        assert_eq!(tally.get("missing"), 0);
        assert_eq!(tally.sum(), 4);

        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"Pass":2,"Fail":1,"完了数":0,"extra":1}"#);

        tally.retain(|key| key == "Pass");
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("Pass", 2)]);
    }

    #[test]
    fn failed_outcome_serializes_with_error_key() {
        let report = FileReport {
            file: "a.xlsx".to_string(),
            identifier: None,
            outcome: FileOutcome::Failed {
                error: Notice::new("header_not_found", "missing"),
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["file"], "a.xlsx");
        assert_eq!(value["error"]["type"], "header_not_found");
        assert!(value.get("identifier").is_none());
    }
}
