// Shared test helpers for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ExcelDateTime, Format};
use test_stat::core::config::{Config, DEFAULT_CONFIG};
use test_stat::core::error::AggregateError;
use test_stat::infra::workbook::{Sheet, Workbook, WorkbookLoader};

/// The default configuration written by `test-stat init`.
pub fn default_config() -> Config {
    Config::from_toml_str(DEFAULT_CONFIG).expect("default config must parse")
}

/// One data row of a set: result, tester, date, plan. Empty strings are blank cells.
pub type Case<'a> = [&'a str; 4];

/// One environment column set: its name in row 1 and its data rows.
pub struct EnvColumns<'a> {
    pub name: &'a str,
    pub cases: &'a [Case<'a>],
}

/// Lays out a test specification sheet as a grid of strings:
///
/// - row 1: environment names above each result column
/// - row 2: header, `No.` in column A and `期待結果` in column B
/// - row 3+: one test case per row, with an expected result in column B
///
/// Each environment takes three columns (結果, 担当者, 実施日), plus 予定日 when `with_plan`.
pub fn spec_grid(envs: &[EnvColumns<'_>], with_plan: bool) -> Vec<Vec<String>> {
    let width = if with_plan { 4 } else { 3 };
    let cases = envs.iter().map(|env| env.cases.len()).max().unwrap_or(0);
    let columns = 2 + envs.len() * width;
    let mut grid = vec![vec![String::new(); columns]; cases + 2];

    grid[1][0] = "No.".to_string();
    grid[1][1] = "期待結果".to_string();
    for case in 0..cases {
        grid[case + 2][0] = (case + 1).to_string();
        grid[case + 2][1] = "動作すること".to_string();
    }

    let headers = ["結果", "担当者", "実施日", "予定日"];
    for (index, env) in envs.iter().enumerate() {
        let first = 2 + index * width;
        grid[0][first] = env.name.to_string();
        for (offset, header) in headers.iter().take(width).enumerate() {
            grid[1][first + offset] = header.to_string();
        }
        for (row, case) in env.cases.iter().enumerate() {
            for (offset, value) in case.iter().take(width).enumerate() {
                grid[row + 2][first + offset] = value.to_string();
            }
        }
    }
    grid
}

pub fn sheet_from_grid(name: &str, grid: &[Vec<String>]) -> Sheet {
    Sheet::from_rows(
        name,
        grid.iter()
            .map(|row| row.iter().map(|cell| Some(cell.clone())).collect())
            .collect(),
    )
}

/// A single-environment sheet with plan columns.
pub fn simple_sheet(name: &str, env: &str, cases: &[Case<'_>]) -> Sheet {
    sheet_from_grid(name, &spec_grid(&[EnvColumns { name: env, cases }], true))
}

/// Loader serving in-memory workbooks by path.
#[derive(Default)]
pub struct MemoryLoader {
    books: HashMap<PathBuf, Workbook>,
}

impl MemoryLoader {
    pub fn with(mut self, path: &str, book: Workbook) -> Self {
        self.books.insert(PathBuf::from(path), book);
        self
    }
}

impl WorkbookLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Workbook, AggregateError> {
        self.books
            .get(path)
            .cloned()
            .ok_or_else(|| AggregateError::Load {
                path: path.to_path_buf(),
                message: "no such workbook".to_string(),
            })
    }
}

fn parse_iso_date(value: &str) -> Option<ExcelDateTime> {
    let mut parts = value.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    ExcelDateTime::from_ymd(year, month, day).ok()
}

/// Writes grids to a real `.xlsx` file. Cells that look like `YYYY-MM-DD` in
/// rows below the header are written as Excel dates.
pub fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<String>>)]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (name, grid) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("valid sheet name");
        for (row, cells) in grid.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (row, col) = (row as u32, col as u16);
                match parse_iso_date(value).filter(|_| row >= 2) {
                    Some(date) => {
                        worksheet
                            .write_datetime_with_format(row, col, &date, &date_format)
                            .expect("write date");
                    }
                    None => {
                        worksheet.write_string(row, col, value).expect("write cell");
                    }
                }
            }
        }
    }
    workbook.save(path).expect("save workbook");
}

/// Writes the default configuration into `dir` and returns its path.
pub fn write_default_config(dir: &Path) -> PathBuf {
    let path = dir.join("TestStat.toml");
    std::fs::write(&path, DEFAULT_CONFIG).expect("write config");
    path
}
