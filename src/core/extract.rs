//! # Row-Set Extractor / 行集合提取器
//!
//! Reads the data rows below the header for every resolved column set.
//!
//! 为每个已解析的列集合读取表头以下的数据行。

use crate::core::columns::ColumnLayout;
use crate::core::models::Row;
use crate::infra::workbook::Worksheet;

/// Rows of one set, labelled with the set (environment) name.
/// 单个集合的行，带有集合（环境）名称。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Number of rows carrying a plan date.
    pub fn planned(&self) -> u64 {
        self.rows.iter().filter(|row| row.plan.is_some()).count() as u64
    }
}

/// Name of set `index`: row 1 of its result column with line breaks turned into
/// underscores, or `セット{index + 1}` when that cell is empty or not text.
///
/// 集合 `index` 的名称：其结果列第 1 行的值（换行替换为下划线），
/// 为空或不是文本时使用 `セット{index + 1}`。
pub fn set_name(sheet: &dyn Worksheet, result_col: usize, index: usize) -> String {
    sheet
        .cell(result_col, 1)
        .filter(|_| sheet.is_text(result_col, 1))
        .map(|name| name.replace("\r\n", "_").replace('\n', "_"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("セット{}", index + 1))
}

/// Extracts one [`RowSet`] per column set, reading every row after `header_row`.
/// 为每个列集合提取一个 [`RowSet`]，读取 `header_row` 之后的每一行。
pub fn extract_sets(sheet: &dyn Worksheet, header_row: usize, layout: &ColumnLayout) -> Vec<RowSet> {
    layout
        .sets
        .iter()
        .enumerate()
        .map(|(index, set)| {
            let mut columns = vec![set.result, set.tester, set.date];
            columns.extend(set.plan);

            let rows = sheet
                .column_values(&columns, header_row + 1)
                .into_iter()
                .map(|mut cells| {
                    cells.resize(4, None);
                    let mut cells = cells.into_iter();
                    let mut next = || cells.next().flatten();
                    Row {
                        result: next(),
                        tester: next(),
                        date: next(),
                        plan: next(),
                        sheet: sheet.name().to_string(),
                    }
                })
                .collect();

            RowSet {
                name: set_name(sheet, set.result, index),
                rows,
            }
        })
        .collect()
}

/// Number of rows below the header that have any value in the expected-result columns.
/// 表头以下在期待结果列中有任意值的行数。
pub fn count_cases(sheet: &dyn Worksheet, header_row: usize, tobe_columns: &[usize]) -> u64 {
    sheet
        .column_values(tobe_columns, header_row + 1)
        .iter()
        .filter(|cells| cells.iter().any(Option::is_some))
        .count() as u64
}
