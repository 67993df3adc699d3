//! # Aggregation Pipeline / 聚合管道
//!
//! Orchestrates one workbook: sheet selection, per-sheet column resolution and
//! extraction, filtering, and the final rollup into an [`AggregateReport`].
//! Any failing sheet fails the whole workbook.
//!
//! 编排单个工作簿的处理：工作表选择、逐表列解析与提取、过滤，
//! 以及最终汇总为 [`AggregateReport`]。任一工作表失败即整个工作簿失败。

use crate::core::columns::{resolve_layout, resolve_tobe_columns};
use crate::core::config::{Config, ReadDefinition};
use crate::core::cross_axis;
use crate::core::daily::aggregate_daily;
use crate::core::error::AggregateError;
use crate::core::extract::{RowSet, count_cases, extract_sets};
use crate::core::filter::FilterSpec;
use crate::core::metrics;
use crate::core::models::{AggregateReport, FilteredStats, SheetCounts};
use crate::core::observer::{AggregationObserver, NoopObserver};
use crate::infra::workbook::{WorkbookSource, Worksheet};

/// Sheets to aggregate: every sheet when no search key is configured, otherwise
/// those containing a key and none of the ignore words.
///
/// 要聚合的工作表：未配置搜索关键字时为全部工作表，否则为包含关键字且不含排除词的工作表。
pub fn select_sheets(names: &[String], read_def: &ReadDefinition) -> Vec<String> {
    if read_def.sheet_search_keys.is_empty() {
        return names.to_vec();
    }
    names
        .iter()
        .filter(|name| {
            let wanted = read_def
                .sheet_search_keys
                .iter()
                .any(|key| name.contains(key.as_str()));
            let ignored = read_def
                .sheet_search_ignores
                .iter()
                .any(|ignore| name.contains(ignore.as_str()));
            wanted && !ignored
        })
        .cloned()
        .collect()
}

/// Extracted data of one sheet.
/// 单个工作表提取出的数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub sets: Vec<RowSet>,
    pub counts: SheetCounts,
}

/// Aggregates workbooks against one configuration.
/// 基于同一配置聚合工作簿。
pub struct Aggregator<'a> {
    config: &'a Config,
    observer: &'a dyn AggregationObserver,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            observer: &NoopObserver,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn AggregationObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn observer(&self) -> &dyn AggregationObserver {
        self.observer
    }

    /// Reads one sheet: header, column sets, rows and case counts.
    ///
    /// # Errors / 错误
    /// `HeaderNotFound`, `InconsistentResultSet`, `InconsistentPlanSet`, `NoTobeRow`
    /// or `NoTestcases`, checked in that order.
    pub fn process_sheet(&self, sheet: &dyn Worksheet) -> Result<SheetData, AggregateError> {
        let read_def = &self.config.read_definition;
        let name = sheet.name();

        let header_row = sheet
            .find_row(self.config.header_search_column(), &read_def.header.search_key)
            .ok_or_else(|| AggregateError::HeaderNotFound {
                sheet: name.to_string(),
            })?;
        self.observer.on_header_found(name, header_row);

        let header = sheet.row_values(header_row);
        let layout = resolve_layout(&header, read_def, name)?;
        let sets = extract_sets(sheet, header_row, &layout);

        let tobe = resolve_tobe_columns(&header, read_def, name)?;
        self.observer.on_columns_resolved(name, &layout, &tobe);

        let cases = count_cases(sheet, header_row, &tobe);
        if cases == 0 {
            return Err(AggregateError::NoTestcases {
                sheet: name.to_string(),
                columns: tobe,
            });
        }
        self.observer.on_sheet_counted(name, sets.len(), cases);

        let counts = SheetCounts {
            sheet_name: name.to_string(),
            env_count: sets.len(),
            all: cases,
            all_plan: sets.iter().map(RowSet::planned).sum(),
        };

        Ok(SheetData { sets, counts })
    }

    /// Aggregates every selected sheet of `book` into one report.
    /// 将 `book` 中所有选中的工作表聚合为一份报告。
    pub fn aggregate(
        &self,
        book: &dyn WorkbookSource,
        filter: &FilterSpec,
    ) -> Result<AggregateReport, AggregateError> {
        let config = self.config;
        let status = &config.test_status;

        let sheet_names = select_sheets(&book.sheet_names(), &config.read_definition);
        if sheet_names.is_empty() {
            return Err(AggregateError::SheetNotFound);
        }
        self.observer.on_sheets_selected(&sheet_names);

        let mut sets = Vec::new();
        let mut count_by_sheet = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let sheet = book.worksheet(name).ok_or(AggregateError::SheetNotFound)?;
            let data = self.process_sheet(sheet)?;
            sets.extend(data.sets);
            count_by_sheet.push(data.counts);
        }

        let all_rows: Vec<_> = sets.iter().flat_map(|set| set.rows.iter().cloned()).collect();
        let original_count = all_rows.len();
        let rows = filter.apply(all_rows);
        let filtered_stats = (!filter.is_empty()).then(|| {
            self.observer.on_filter_applied(rows.len(), original_count);
            FilteredStats {
                filtered_count: rows.len(),
                original_count,
            }
        });

        let daily = aggregate_daily(&rows, status);
        let by_name = cross_axis::by_name(&rows);
        let mut by_env = cross_axis::by_env(&sets, status);
        filter.prune_env(&mut by_env);
        let results = cross_axis::grand_total(&daily, status);

        let all = count_by_sheet
            .iter()
            .map(|c| c.env_count as u64 * c.all)
            .sum();
        let stats = metrics::compute_stats(all, &rows, &results, config);
        let state = metrics::run_state(&stats);
        let run = metrics::run_info(state, &daily, &config.output_definition.state);
        let total = metrics::total_record(
            results,
            stats.completed,
            stats.executed,
            stats.available,
            status,
        );

        let warning = metrics::warning(&stats);
        if let Some(warning) = &warning {
            self.observer.on_warning(warning);
        }

        Ok(AggregateReport {
            stats,
            run,
            count_by_sheet,
            daily,
            by_name,
            by_env,
            total,
            warning,
            filtered_stats,
        })
    }
}
