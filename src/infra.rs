//! # Infrastructure Module / 基础设施模块
//!
//! Spreadsheet access, the file loader, logging setup and i18n support.
//!
//! 电子表格访问、文件加载器、日志初始化以及国际化支持。

pub mod logging;
pub mod workbook;
pub mod xlsx;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
