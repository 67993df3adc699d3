//! # Error Types / 错误类型
//!
//! Typed errors of the aggregation library. Every variant maps to a stable
//! machine-readable `kind()` that is carried into serialized error records.
//!
//! 聚合库的类型化错误。每个变体都映射到稳定的机器可读 `kind()`，
//! 并写入序列化后的错误记录中。

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while aggregating one workbook. Each one aborts that workbook.
/// 聚合单个工作簿时产生的错误。任何一个都会中止该工作簿的处理。
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no sheet matched the configured sheet search keys")]
    SheetNotFound,

    #[error("header row not found in sheet '{sheet}'")]
    HeaderNotFound { sheet: String },

    #[error(
        "result/tester/date columns do not line up in sheet '{sheet}' (result: {results:?}, tester: {testers:?}, date: {dates:?})"
    )]
    InconsistentResultSet {
        sheet: String,
        results: Vec<usize>,
        testers: Vec<usize>,
        dates: Vec<usize>,
    },

    #[error(
        "plan columns do not line up with result columns in sheet '{sheet}' (result: {results:?}, plan: {plans:?})"
    )]
    InconsistentPlanSet {
        sheet: String,
        results: Vec<usize>,
        plans: Vec<usize>,
    },

    #[error("no expected-result column matching {keys:?} in sheet '{sheet}'")]
    NoTobeRow { sheet: String, keys: Vec<String> },

    #[error("no test cases found in sheet '{sheet}' (checked columns {columns:?})")]
    NoTestcases { sheet: String, columns: Vec<usize> },

    #[error("failed to load workbook '{}': {message}", path.display())]
    Load { path: PathBuf, message: String },
}

impl AggregateError {
    /// Stable identifier used in error records.
    /// 错误记录中使用的稳定标识符。
    pub fn kind(&self) -> &'static str {
        match self {
            AggregateError::SheetNotFound => "sheet_not_found",
            AggregateError::HeaderNotFound { .. } => "header_not_found",
            AggregateError::InconsistentResultSet { .. } => "inconsistent_result_set",
            AggregateError::InconsistentPlanSet { .. } => "inconsistent_plan_set",
            AggregateError::NoTobeRow { .. } => "no_tobe_row",
            AggregateError::NoTestcases { .. } => "no_testcases",
            AggregateError::Load { .. } => "processing_error",
        }
    }
}

/// Errors raised while loading the configuration.
/// 加载配置时产生的错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config{}: {message}", path.as_ref().map(|p| format!(" '{}'", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        "config_invalid"
    }
}

/// Errors raised while validating user supplied filter criteria.
/// 校验用户提供的过滤条件时产生的错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("unknown result types: {} (valid: {})", invalid.join(", "), valid.join(", "))]
    UnknownResultType {
        invalid: Vec<String>,
        valid: Vec<String>,
    },
}

impl FilterError {
    pub fn kind(&self) -> &'static str {
        "filter_validation_error"
    }
}

/// Errors raised while reading or updating a project list file.
/// 读取或更新项目列表文件时产生的错误。
#[derive(Debug, Error)]
pub enum ProjectListError {
    #[error("failed to read project list '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write project list '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported project list format '{extension}' (expected .json, .yaml, .yml or .txt)")]
    UnsupportedFormat { extension: String },

    #[error("invalid project list '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("project list '{}' contains no files", path.display())]
    Empty { path: PathBuf },
}

impl ProjectListError {
    pub fn kind(&self) -> &'static str {
        "project_list_error"
    }
}
