//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which aggregates the given
//! workbooks with the configured column keywords and writes the report.
//!
//! 此模块实现了 `run` 命令，按配置的列关键字聚合给定的工作簿并输出报告。

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use colored::*;
use std::fs;
use std::io::{IsTerminal, stderr};
use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::filter::{FilterSpec, RawFilter};
use crate::core::models::FileReport;
use crate::core::observer::TracingObserver;
use crate::core::pipeline::Aggregator;
use crate::core::project::{self, LAST_LOADED_FORMAT, ProjectList};
use crate::core::summary::{BatchSummary, FileInput, aggregate_files};
use crate::infra::logging::{LogConfig, init_logging};
use crate::infra::t;
use crate::infra::xlsx::XlsxLoader;
use crate::reporting::excel::{self, ExcelMetadata};
use crate::reporting::{console, csv, export, html, json};
use crate::resolve_locale;

/// Output format of the `run` command.
/// `run` 命令的输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    /// Tab-separated export summary, one row per file.
    Tsv,
    /// `.xlsx` workbook; needs `--output`.
    Excel,
    Html,
}

/// Everything the `run` command needs, as parsed from the command line.
/// `run` 命令所需的全部参数（从命令行解析）。
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub files: Vec<PathBuf>,
    /// Project list file used instead of `files`.
    pub list: Option<PathBuf>,
    pub config: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub filter: RawFilter,
    pub identifier: Option<String>,
    pub verbose: bool,
    /// `--lang`; overrides the configured language.
    pub lang: Option<String>,
}

/// Executes the run command with the provided options.
///
/// Per-file failures are reported but never fail the command; configuration,
/// filter and output errors do.
///
/// 使用给定选项执行 run 命令。单个文件的失败只会被报告，不会使命令失败；
/// 配置、过滤条件和输出错误会使命令失败。
pub fn execute(options: RunOptions) -> Result<()> {
    init_logging(&LogConfig::from_verbose(options.verbose).with_ansi(stderr().is_terminal()));

    let config = Config::load(&options.config).with_context(|| {
        t!("run.config_failed", path = options.config.display()).to_string()
    })?;
    let locale = resolve_locale(options.lang.as_deref().unwrap_or(&config.language));
    rust_i18n::set_locale(&locale);

    let filter = FilterSpec::parse(&options.filter, &config.test_status).map_err(|e| {
        anyhow!(t!("run.filter_invalid", message = e.to_string(), locale = &locale).to_string())
    })?;

    if options.format == OutputFormat::Excel && options.output.is_none() {
        bail!(t!("run.excel_needs_output", locale = &locale).to_string());
    }

    let project = options
        .list
        .as_deref()
        .map(|path| {
            ProjectList::load(path)
                .with_context(|| t!("run.list_failed", path = path.display(), locale = &locale).to_string())
        })
        .transpose()?;
    let inputs = match &project {
        Some(project) => {
            tracing::info!(project = %project.project_name, files = project.files.len(), "project list loaded");
            list_inputs(project, &options, &locale)?
        }
        None => build_inputs(&options, &locale),
    };

    let observer = TracingObserver;
    let aggregator = Aggregator::new(&config).with_observer(&observer);
    let reports = aggregate_files(&inputs, &XlsxLoader, &aggregator, &filter);
    let summary = (reports.len() > 1).then(|| BatchSummary::from_reports(&reports, &config));

    if reports.iter().all(|r| r.report().is_none()) {
        tracing::warn!("{}", t!("run.no_success", locale = &locale));
    }

    match &options.output {
        Some(path) => {
            let path = PathBuf::from(filter.output_file_name(&path.to_string_lossy()));
            write_output(&options, &config, &filter, &reports, summary.as_ref(), &path, &locale)?;
            println!(
                "{}",
                t!("run.output_written", path = path.display(), locale = &locale).green()
            );
        }
        None => {
            if let Some(project) = &project
                && options.format == OutputFormat::Table
            {
                println!("{}", t!("run.project", name = &project.project_name, locale = &locale).bold());
            }
            print_output(&options, &config, &filter, &reports, summary.as_ref(), &locale)?
        }
    }

    if let Some(path) = &options.list {
        touch_project_list(path, &locale);
    }

    Ok(())
}

/// Inputs of a project list. Paths that do not exist are skipped with a warning;
/// a list where nothing remains fails the run.
fn list_inputs(project: &ProjectList, options: &RunOptions, locale: &str) -> Result<Vec<FileInput>> {
    if options.identifier.is_some() {
        eprintln!("{}", t!("run.identifier_ignored", locale = locale).yellow());
    }
    let inputs: Vec<FileInput> = project
        .inputs()
        .into_iter()
        .filter(|input| {
            let exists = input.path.exists();
            if !exists {
                eprintln!(
                    "{}",
                    t!("run.list_path_missing", path = input.path.display(), locale = locale).yellow()
                );
            }
            exists
        })
        .collect();
    if inputs.is_empty() {
        bail!(t!("run.list_no_files", locale = locale).to_string());
    }
    Ok(inputs)
}

fn touch_project_list(path: &Path, locale: &str) {
    let now = Local::now().format(LAST_LOADED_FORMAT).to_string();
    if let Err(err) = project::update_last_loaded(path, &now) {
        tracing::warn!(error = %err, "could not update last_loaded");
        eprintln!(
            "{}",
            t!("run.list_update_failed", path = path.display(), locale = locale).yellow()
        );
    }
}

fn build_inputs(options: &RunOptions, locale: &str) -> Vec<FileInput> {
    let single = options.files.len() == 1;
    if options.identifier.is_some() && !single {
        eprintln!("{}", t!("run.identifier_ignored", locale = locale).yellow());
    }
    options
        .files
        .iter()
        .map(|path| {
            let input = FileInput::new(path);
            match (&options.identifier, single) {
                (Some(id), true) => input.with_identifier(id),
                _ => input,
            }
        })
        .collect()
}

fn render_table(
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    filter: &FilterSpec,
    locale: &str,
) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&console::render_file_report(report, filter, locale));
    }
    if let Some(summary) = summary {
        out.push_str(&console::render_batch_summary(reports, summary, locale));
    }
    out
}

fn render(
    options: &RunOptions,
    config: &Config,
    filter: &FilterSpec,
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    locale: &str,
) -> Result<String> {
    match options.format {
        OutputFormat::Table => Ok(render_table(reports, summary, filter, locale)),
        OutputFormat::Json => json::to_json_string(reports, summary),
        OutputFormat::Csv => csv::to_csv_string(reports, &config.test_status),
        OutputFormat::Tsv => Ok(export::to_tsv_string(reports, &config.test_status)),
        OutputFormat::Html => Ok(html::render_html_report(reports, summary, locale)),
        OutputFormat::Excel => bail!(t!("run.excel_needs_output", locale = locale).to_string()),
    }
}

fn print_output(
    options: &RunOptions,
    config: &Config,
    filter: &FilterSpec,
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    locale: &str,
) -> Result<()> {
    if options.format == OutputFormat::Table {
        for report in reports {
            console::print_file_report(report, filter, locale);
        }
        if let Some(summary) = summary {
            console::print_batch_summary(reports, summary, locale);
        }
        return Ok(());
    }
    println!("{}", render(options, config, filter, reports, summary, locale)?);
    Ok(())
}

fn write_output(
    options: &RunOptions,
    config: &Config,
    filter: &FilterSpec,
    reports: &[FileReport],
    summary: Option<&BatchSummary>,
    path: &Path,
    locale: &str,
) -> Result<()> {
    let failed = || t!("run.output_failed", path = path.display(), locale = locale).to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(failed)?;
    }

    match options.format {
        OutputFormat::Csv => csv::write_csv_file(path, reports, &config.test_status).with_context(failed),
        OutputFormat::Excel => {
            let meta = ExcelMetadata {
                generated_at: Local::now().format(LAST_LOADED_FORMAT).to_string(),
                config_path: options.config.display().to_string(),
                filters: filter.describe(),
            };
            let sheets = excel::excel_sheets(reports, summary, &config.test_status, &meta, locale);
            excel::generate_excel_report(&sheets, &config.test_status, path).with_context(failed)
        }
        _ => {
            // Files never get ANSI escapes.
            colored::control::set_override(false);
            let content = render(options, config, filter, reports, summary, locale);
            colored::control::unset_override();
            fs::write(path, content?).with_context(failed)
        }
    }
}
