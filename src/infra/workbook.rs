//! # Workbook Access / 工作簿访问
//!
//! The read-only view the aggregation engine needs from a spreadsheet, plus an
//! in-memory implementation. Concrete file formats live in sibling modules.
//!
//! 聚合引擎所需的电子表格只读视图，以及一个内存实现。具体文件格式位于同级模块中。

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::AggregateError;

/// A cell value. Empty cells are `None`; dates are `YYYY-MM-DD` strings.
/// 单元格值。空单元格为 `None`；日期为 `YYYY-MM-DD` 字符串。
pub type Cell = Option<String>;

/// Read access to one sheet. Rows and columns are 1-indexed.
/// 对单个工作表的读取访问。行和列均从 1 开始。
pub trait Worksheet {
    fn name(&self) -> &str;

    /// Last used row / 最后使用的行
    fn max_row(&self) -> usize;

    /// Last used column / 最后使用的列
    fn max_column(&self) -> usize;

    fn cell(&self, col: usize, row: usize) -> Option<&str>;

    /// Whether the cell held text in the source file. Numbers, dates and
    /// booleans are rendered as text by [`Worksheet::cell`] but are not text.
    /// 单元格在源文件中是否为文本。数字、日期和布尔值虽由 [`Worksheet::cell`]
    /// 渲染为文本，但并非文本。
    fn is_text(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_some()
    }

    /// First row whose cell in `col` equals `text` exactly.
    /// `col` 列中值与 `text` 完全相等的第一行。
    fn find_row(&self, col: usize, text: &str) -> Option<usize> {
        (1..=self.max_row()).find(|&row| self.cell(col, row) == Some(text))
    }

    fn row_values(&self, row: usize) -> Vec<Cell> {
        (1..=self.max_column())
            .map(|col| self.cell(col, row).map(str::to_string))
            .collect()
    }

    /// Values of `columns` for every row from `start_row` to the last used row.
    /// 从 `start_row` 到最后使用行的每一行中 `columns` 列的值。
    fn column_values(&self, columns: &[usize], start_row: usize) -> Vec<Vec<Cell>> {
        (start_row.max(1)..=self.max_row())
            .map(|row| {
                columns
                    .iter()
                    .map(|&col| self.cell(col, row).map(str::to_string))
                    .collect()
            })
            .collect()
    }
}

/// A workbook: an ordered list of named sheets.
/// 工作簿：有序的命名工作表列表。
pub trait WorkbookSource {
    fn sheet_names(&self) -> Vec<String>;

    fn worksheet(&self, name: &str) -> Option<&dyn Worksheet>;
}

/// Opens a workbook file.
/// 打开工作簿文件。
pub trait WorkbookLoader {
    fn load(&self, path: &Path) -> Result<Workbook, AggregateError>;
}

/// In-memory sheet storing rows of optional strings.
/// 以可选字符串行存储的内存工作表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    /// `(col, row)` of cells whose source value was not text.
    non_text: BTreeSet<(usize, usize)>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            non_text: BTreeSet::new(),
        }
    }

    /// Builds a sheet from row-major cells. Empty strings are stored as `None`.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(normalize).collect())
            .collect();
        Self {
            name: name.into(),
            rows,
            non_text: BTreeSet::new(),
        }
    }

    /// Records that the cell at `col`, `row` came from a number, date or boolean.
    pub fn mark_non_text(&mut self, col: usize, row: usize) {
        self.non_text.insert((col, row));
    }

    /// Sets one cell, growing the grid as needed.
    pub fn set(&mut self, col: usize, row: usize, value: impl Into<String>) {
        if col == 0 || row == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, None);
        }
        cells[col - 1] = normalize(Some(value.into()));
    }
}

fn normalize(cell: Cell) -> Cell {
    cell.filter(|value| !value.is_empty())
}

impl Worksheet for Sheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_column(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, col: usize, row: usize) -> Option<&str> {
        if col == 0 || row == 0 {
            return None;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(col - 1))
            .and_then(|cell| cell.as_deref())
    }

    fn is_text(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_some() && !self.non_text.contains(&(col, row))
    }
}

/// In-memory workbook. Produced by the file loaders and by tests.
/// 内存工作簿。由文件加载器和测试生成。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }
}

impl WorkbookSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn worksheet(&self, name: &str) -> Option<&dyn Worksheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s as &dyn Worksheet)
    }
}
