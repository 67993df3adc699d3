//! # Core Module / 核心模块
//!
//! The aggregation engine: configuration, column resolution, row extraction,
//! filtering, daily and cross-axis rollups, metrics, project lists and batch
//! summaries.
//!
//! 聚合引擎：配置、列解析、行提取、过滤、按日与跨维度汇总、指标、项目列表以及批处理汇总。

pub mod columns;
pub mod config;
pub mod cross_axis;
pub mod daily;
pub mod error;
pub mod extract;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod pipeline;
pub mod project;
pub mod summary;

// Re-exports
pub use config::Config;
pub use error::{AggregateError, ConfigError, FilterError, ProjectListError};
pub use filter::{FilterSpec, RawFilter};
pub use models::{AggregateReport, FileOutcome, FileReport};
pub use pipeline::Aggregator;
pub use project::ProjectList;
pub use summary::{BatchSummary, FileInput};
