// src/cli.rs
//! # Command-Line Interface / 命令行接口
//!
//! Builds the clap command tree with localized help and dispatches to the
//! `run` and `init` commands.
//!
//! 构建带本地化帮助信息的 clap 命令树，并分派到 `run` 和 `init` 命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::filter::RawFilter;
use crate::infra::t;
use crate::resolve_locale;

pub mod commands;

use commands::run::{OutputFormat, RunOptions};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn system_language() -> String {
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

fn build_cli(locale: &str) -> Command {
    Command::new("test-stat")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("files")
                        .help(t!("arg_files", locale = locale).to_string())
                        .value_name("FILES")
                        .required_unless_present("list")
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("list")
                        .short('l')
                        .long("list")
                        .help(t!("arg_list", locale = locale).to_string())
                        .value_name("LIST")
                        .conflicts_with("files")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .default_value("TestStat.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help(t!("arg_format", locale = locale).to_string())
                        .value_name("FORMAT")
                        .default_value("table")
                        .value_parser(["table", "json", "csv", "tsv", "excel", "html"])
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg_output", locale = locale).to_string())
                        .value_name("OUTPUT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("date-range")
                        .long("date-range")
                        .help(t!("arg_date_range", locale = locale).to_string())
                        .value_names(["START", "END"])
                        .num_args(1..=2)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("tester")
                        .long("tester")
                        .help(t!("arg_tester", locale = locale).to_string())
                        .value_name("TESTER")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("exact-match")
                        .long("exact-match")
                        .help(t!("arg_exact_match", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("result-type")
                        .long("result-type")
                        .help(t!("arg_result_type", locale = locale).to_string())
                        .value_name("RESULT")
                        .num_args(1..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("environment")
                        .long("environment")
                        .help(t!("arg_environment", locale = locale).to_string())
                        .value_name("ENVIRONMENT")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("identifier")
                        .long("identifier")
                        .help(t!("arg_identifier", locale = locale).to_string())
                        .value_name("IDENTIFIER")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help(t!("arg_verbose", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg_init_output", locale = locale).to_string())
                        .value_name("OUTPUT")
                        .default_value("TestStat.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn run_options(matches: &ArgMatches, lang: Option<String>) -> RunOptions {
    let mut date_range = strings(matches, "date-range").into_iter();
    let filter = RawFilter {
        start_date: date_range.next(),
        end_date: date_range.next(),
        tester: matches.get_one::<String>("tester").cloned(),
        environment: matches.get_one::<String>("environment").cloned(),
        exact_match: matches.get_flag("exact-match"),
        result_types: strings(matches, "result-type"),
    };
    let format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        Some("csv") => OutputFormat::Csv,
        Some("tsv") => OutputFormat::Tsv,
        Some("excel") => OutputFormat::Excel,
        Some("html") => OutputFormat::Html,
        _ => OutputFormat::Table,
    };

    RunOptions {
        files: matches
            .get_many::<PathBuf>("files")
            .map(|files| files.cloned().collect())
            .unwrap_or_default(),
        list: matches.get_one::<PathBuf>("list").cloned(),
        config: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("TestStat.toml")),
        format,
        output: matches.get_one::<PathBuf>("output").cloned(),
        filter,
        identifier: matches.get_one::<String>("identifier").cloned(),
        verbose: matches.get_flag("verbose"),
        lang,
    }
}

/// Parses the command line and runs the selected command.
/// 解析命令行并执行所选命令。
pub fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested = pre_parse_language();
    let locale = resolve_locale(&requested.clone().unwrap_or_else(system_language));
    rust_i18n::set_locale(&locale);

    let matches = build_cli(&locale).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let lang = run_matches
                .get_one::<String>("lang")
                .cloned()
                .or(requested);
            commands::run::execute(run_options(run_matches, lang))?;
        }
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("TestStat.toml"));
            commands::init::execute(
                &output,
                init_matches.get_flag("force"),
                init_matches.get_flag("non-interactive"),
                &locale,
            )?;
        }
        _ => {
            // Clap has already printed help for a missing subcommand.
        }
    }
    Ok(())
}
