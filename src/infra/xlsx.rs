//! # Spreadsheet File Loader / 电子表格文件加载器
//!
//! Reads `.xlsx` / `.xlsm` / `.xls` / `.ods` files through `calamine` into the
//! in-memory [`Workbook`]. Date cells become `YYYY-MM-DD` strings and integral
//! numbers lose their fractional part. Cells that were not strings in the file
//! are marked so callers can tell them apart.
//!
//! 通过 `calamine` 将 `.xlsx` / `.xlsm` / `.xls` / `.ods` 文件读入内存中的 [`Workbook`]。
//! 日期单元格转换为 `YYYY-MM-DD` 字符串，整数值去掉小数部分。
//! 文件中不是字符串的单元格会被标记，以便调用方区分。

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate};
use std::path::Path;

use crate::core::error::AggregateError;
use crate::infra::workbook::{Cell, Sheet, Workbook, WorkbookLoader};

/// Loader for every format `calamine` understands.
/// 支持 `calamine` 所能识别的全部格式的加载器。
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxLoader;

impl WorkbookLoader for XlsxLoader {
    fn load(&self, path: &Path) -> Result<Workbook, AggregateError> {
        let load_error = |message: String| AggregateError::Load {
            path: path.to_path_buf(),
            message,
        };

        let mut source = open_workbook_auto(path).map_err(|e| load_error(e.to_string()))?;
        let mut workbook = Workbook::default();

        for name in source.sheet_names() {
            let range = source
                .worksheet_range(&name)
                .map_err(|e| load_error(format!("sheet '{name}': {e}")))?;

            // Ranges start at the first used cell; pad so that indices stay absolute.
            let (row_offset, col_offset) = range
                .start()
                .map(|(r, c)| (r as usize, c as usize))
                .unwrap_or((0, 0));

            let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
            let mut non_text = Vec::new();
            for data_row in range.rows() {
                let row = rows.len() + 1;
                let mut cells: Vec<Cell> = vec![None; col_offset];
                for data in data_row {
                    if !matches!(data, Data::String(_) | Data::Empty) {
                        non_text.push((cells.len() + 1, row));
                    }
                    cells.push(cell_text(data));
                }
                rows.push(cells);
            }

            let mut sheet = Sheet::from_rows(name, rows);
            for (col, row) in non_text {
                sheet.mark_non_text(col, row);
            }
            workbook.push(sheet);
        }

        Ok(workbook)
    }
}

/// Converts one `calamine` cell into the text the aggregation engine compares on.
/// 将一个 `calamine` 单元格转换为聚合引擎用于比较的文本。
pub fn cell_text(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(serial) => Some(serial_to_date(serial.as_f64())),
        Data::DateTimeIso(s) => Some(s.get(..10).unwrap_or(s).to_string()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("#ERROR:{e:?}")),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Excel serial day number (1900 system) to `YYYY-MM-DD`.
///
/// Serials before 61 sit before the phantom 1900-02-29 and need one extra day.
pub fn serial_to_date(serial: f64) -> String {
    let days = serial.floor().max(0.0) as u64;
    let base = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };
    base.and_then(|base| base.checked_add_days(Days::new(days)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| serial.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_map_to_iso_days() {
        assert_eq!(serial_to_date(1.0), "1900-01-01");
        assert_eq!(serial_to_date(61.0), "1900-03-01");
        assert_eq!(serial_to_date(45292.0), "2024-01-01");
        assert_eq!(serial_to_date(45292.75), "2024-01-01");
    }

    #[test]
    fn numbers_drop_integral_fraction() {
        assert_eq!(cell_text(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(
            cell_text(&Data::DateTimeIso("2024-02-03T00:00:00".to_string())),
            Some("2024-02-03".to_string())
        );
    }
}
