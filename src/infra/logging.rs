//! # Logging / 日志
//!
//! Installs the global `tracing` subscriber for the binary. Library code emits
//! events only through [`crate::core::observer::TracingObserver`].
//!
//! 为二进制程序安装全局 `tracing` 订阅器。库代码只通过
//! [`crate::core::observer::TracingObserver`] 发出事件。
//!
//! `RUST_LOG` overrides the level picked from the command line.

use std::io;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log settings derived from the command line.
/// 根据命令行得到的日志设置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// `-v` raises the level to debug; otherwise only warnings and errors are shown.
    #[must_use]
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::WARN },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Builds the filter: `RUST_LOG` when set, else `config.level` for this crate and
/// warnings for dependencies.
pub fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,test_stat={level}")))
}

/// Installs the subscriber, writing to stderr so reports on stdout stay clean.
/// Calling it twice is harmless.
///
/// 安装订阅器并写入 stderr，使 stdout 上的报告保持干净。重复调用无副作用。
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}
