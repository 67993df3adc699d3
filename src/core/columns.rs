//! # Column Resolver / 列解析器
//!
//! Maps a header row and the keyword configuration to the columns of each
//! semantic role, and zips result/tester/date (and plan) columns into sets.
//!
//! 根据表头行和关键字配置找出各语义角色对应的列，
//! 并将结果/担当者/日期（以及计划）列按顺序组合成集合。

use crate::core::config::{ColumnKeywords, ReadDefinition};
use crate::core::error::AggregateError;
use crate::infra::workbook::Cell;

/// One environment column group: result, tester, date and optional plan column (1-indexed).
/// 一个环境列组：结果、担当者、日期及可选计划列（从 1 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSet {
    pub result: usize,
    pub tester: usize,
    pub date: usize,
    pub plan: Option<usize>,
}

/// All sets of one sheet, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub sets: Vec<ColumnSet>,
}

impl ColumnLayout {
    pub fn has_plan(&self) -> bool {
        self.sets.iter().any(|set| set.plan.is_some())
    }
}

/// Returns every 1-indexed column whose header contains one of `keywords.keys`
/// and is not exactly one of `keywords.ignores`. Left to right, duplicates kept.
///
/// 返回表头包含 `keywords.keys` 中任一关键字、且不完全等于 `keywords.ignores`
/// 中任一项的所有列（从 1 开始）。从左到右，保留重复。
pub fn find_columns(header: &[Cell], keywords: &ColumnKeywords) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let text = cell.as_deref()?;
            let matched = keywords.keys.iter().any(|key| text.contains(key.as_str()));
            let ignored = keywords.ignores.iter().any(|ignore| ignore == text);
            (matched && !ignored).then_some(index + 1)
        })
        .collect()
}

/// Resolves the result/tester/date/plan sets of one sheet.
///
/// # Errors / 错误
/// - `InconsistentResultSet` when the result, tester and date column counts differ
///   or are all zero.
/// - `InconsistentPlanSet` when plan columns exist but their count differs from the
///   result column count.
pub fn resolve_layout(
    header: &[Cell],
    read_def: &ReadDefinition,
    sheet: &str,
) -> Result<ColumnLayout, AggregateError> {
    let results = find_columns(header, &read_def.result_row);
    let testers = find_columns(header, &read_def.person_row);
    let dates = find_columns(header, &read_def.date_row);

    let same_len = results.len() == testers.len() && testers.len() == dates.len();
    if !same_len || results.is_empty() {
        return Err(AggregateError::InconsistentResultSet {
            sheet: sheet.to_string(),
            results,
            testers,
            dates,
        });
    }

    let plans = find_columns(header, &read_def.plan_row);
    if !plans.is_empty() && plans.len() != results.len() {
        return Err(AggregateError::InconsistentPlanSet {
            sheet: sheet.to_string(),
            results,
            plans,
        });
    }

    let sets = results
        .iter()
        .zip(&testers)
        .zip(&dates)
        .enumerate()
        .map(|(index, ((&result, &tester), &date))| ColumnSet {
            result,
            tester,
            date,
            plan: plans.get(index).copied(),
        })
        .collect();

    Ok(ColumnLayout { sets })
}

/// Resolves the expected-result ("to-be") columns used to count test cases.
///
/// # Errors / 错误
/// `NoTobeRow` when no column matches.
pub fn resolve_tobe_columns(
    header: &[Cell],
    read_def: &ReadDefinition,
    sheet: &str,
) -> Result<Vec<usize>, AggregateError> {
    let columns = find_columns(header, &read_def.tobe_row);
    if columns.is_empty() {
        return Err(AggregateError::NoTobeRow {
            sheet: sheet.to_string(),
            keys: read_def.tobe_row.keys.clone(),
        });
    }
    Ok(columns)
}
