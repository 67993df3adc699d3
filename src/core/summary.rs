//! # Batch Processing & Summary / 批处理与汇总
//!
//! Runs the pipeline over several files, turning per-file failures into error
//! records, and rolls successful reports up into one [`BatchSummary`].
//!
//! 对多个文件运行聚合管道，将单文件失败转换为错误记录，
//! 并把成功的报告汇总为一个 [`BatchSummary`]。

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::error::AggregateError;
use crate::core::filter::FilterSpec;
use crate::core::metrics::{self, UNKNOWN_STATUS};
use crate::core::models::{
    AggregateReport, FileOutcome, FileReport, GrandTotal, Notice, RunState, Stats, Tally,
};
use crate::core::pipeline::Aggregator;
use crate::infra::workbook::WorkbookLoader;

/// A file to aggregate, with an optional display identifier.
/// 要聚合的文件，以及可选的显示标识。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub path: PathBuf,
    pub identifier: Option<String>,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            identifier: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// Loads and aggregates one file. Errors become a [`FileOutcome::Failed`] record.
/// 加载并聚合单个文件。错误会转换为 [`FileOutcome::Failed`] 记录。
pub fn aggregate_file(
    input: &FileInput,
    loader: &dyn WorkbookLoader,
    aggregator: &Aggregator<'_>,
    filter: &FilterSpec,
) -> FileReport {
    let observer = aggregator.observer();
    observer.on_file_started(&input.path);

    let outcome = match run_one(&input.path, loader, aggregator, filter) {
        Ok(report) => FileOutcome::Aggregated(Box::new(report)),
        Err(err) => FileOutcome::Failed {
            error: Notice::new(err.kind(), err.to_string()),
        },
    };

    let report = FileReport {
        file: input.path.display().to_string(),
        identifier: input.identifier.clone(),
        outcome,
    };
    observer.on_file_finished(&input.path, report.error());
    report
}

fn run_one(
    path: &Path,
    loader: &dyn WorkbookLoader,
    aggregator: &Aggregator<'_>,
    filter: &FilterSpec,
) -> Result<AggregateReport, AggregateError> {
    let book = loader.load(path)?;
    aggregator.aggregate(&book, filter)
}

/// Aggregates files one after another. One failing file never stops the others.
/// 依次聚合文件。单个文件失败不会影响其他文件。
pub fn aggregate_files(
    inputs: &[FileInput],
    loader: &dyn WorkbookLoader,
    aggregator: &Aggregator<'_>,
    filter: &FilterSpec,
) -> Vec<FileReport> {
    inputs
        .iter()
        .map(|input| aggregate_file(input, loader, aggregator, filter))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub error: Notice,
}

/// Rollup of a batch of file reports.
/// 一批文件报告的汇总。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub file_count: usize,
    pub processed: usize,
    pub status: String,
    pub start_date: Option<String>,
    pub last_update: Option<String>,
    pub stats: Stats,
    pub total: GrandTotal,
    pub errors: Vec<FailedFile>,
}

impl BatchSummary {
    /// Sums every successful report.
    ///
    /// The overall status is completed when every file is completed, in progress
    /// when any file is in progress, and otherwise the first file's status.
    /// Completed and executed counts are taken from the dated daily buckets.
    ///
    /// 汇总所有成功的报告。
    /// 所有文件均完成时整体状态为完成；任一文件进行中时为进行中；否则取第一个文件的状态。
    /// 完成数与消化数取自带日期的每日计数桶。
    pub fn from_reports(reports: &[FileReport], config: &Config) -> Self {
        let status_def = &config.test_status;
        let successes: Vec<&AggregateReport> =
            reports.iter().filter_map(FileReport::report).collect();

        let mut stats = Stats::default();
        let mut results = Tally::zeroed(status_def.results.iter().map(String::as_str));
        let mut completed = 0;
        let mut executed = 0;

        for report in &successes {
            let s = &report.stats;
            stats.all += s.all;
            stats.excluded += s.excluded;
            stats.available += s.available;
            stats.executed += s.executed;
            stats.completed += s.completed;
            stats.incompleted += s.incompleted;
            stats.planned += s.planned;

            for (label, count) in report.total.results.iter() {
                results.add(label, count);
            }

            for bucket in report.daily.dated.values() {
                completed += status_def
                    .completed_results
                    .iter()
                    .map(|r| bucket.get(r))
                    .sum::<u64>();
                executed += status_def
                    .executed_results
                    .iter()
                    .map(|r| bucket.get(r))
                    .sum::<u64>();
            }
        }

        let names = &config.output_definition.state;
        let status = match successes.first() {
            None => UNKNOWN_STATUS.to_string(),
            Some(_) if successes.iter().all(|r| r.run.state == RunState::Completed) => {
                names.completed.name.clone()
            }
            Some(_) if successes.iter().any(|r| r.run.state == RunState::InProgress) => {
                names.in_progress.name.clone()
            }
            Some(first) => first.run.status.clone(),
        };

        let start_date = successes
            .iter()
            .filter_map(|r| r.run.start_date.clone())
            .min();
        let last_update = successes
            .iter()
            .filter_map(|r| r.run.last_update.clone())
            .max();

        let errors = reports
            .iter()
            .filter_map(|r| {
                r.error().map(|error| FailedFile {
                    file: r.file.clone(),
                    error: error.clone(),
                })
            })
            .collect();

        Self {
            file_count: reports.len(),
            processed: successes.len(),
            status,
            start_date,
            last_update,
            stats,
            total: metrics::total_record(results, completed, executed, stats.available, status_def),
            errors,
        }
    }
}
