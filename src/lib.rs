//! # Test Stat Library / Test Stat 库
//!
//! Aggregates spreadsheet test specifications into daily, per-tester and
//! per-environment execution status, driven by a declarative configuration.
//!
//! 根据声明式配置，将电子表格测试规格汇总为按日、按担当者和按环境的实施状况。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, aggregation engine and report models
//! - `infra` - Workbook access, file loading, logging and i18n
//! - `reporting` - Console, JSON, CSV and HTML output
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、聚合引擎和报告模型
//! - `infra` - 工作簿访问、文件加载、日志和国际化
//! - `reporting` - 控制台、JSON、CSV 和 HTML 输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::pipeline::Aggregator;

/// Picks the best available locale for `requested` (e.g. "ja-JP" → "ja"), falling back to "en".
/// 为 `requested` 选择最合适的可用语言（例如 "ja-JP" → "ja"），否则回退到 "en"。
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();
    let requested = requested.replace('_', "-");

    if available_locales.contains(&requested.as_str()) {
        return requested;
    }
    requested
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
