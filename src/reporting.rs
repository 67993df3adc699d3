//! # Reporting Module / 报告模块
//!
//! Turns file reports and batch summaries into output: colored console tables,
//! JSON, CSV, a tab-separated export summary, an Excel workbook and a
//! self-contained HTML page, with internationalization support.
//!
//! 将文件报告和批处理汇总转换为输出：彩色控制台表格、JSON、CSV、制表符分隔的导出摘要、
//! Excel 工作簿以及独立的 HTML 页面，支持国际化。

pub mod console;
pub mod csv;
pub mod excel;
pub mod export;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_batch_summary, print_file_report};
pub use excel::generate_excel_report;
pub use html::generate_html_report;
pub use json::to_json_string;
