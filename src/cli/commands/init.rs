//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a commented default
//! `TestStat.toml`. The interactive mode asks before overwriting and lets the
//! user pick the sheet keyword and the output language.
//!
//! 此模块实现了 `init` 命令，用于写出带注释的默认 `TestStat.toml`。
//! 交互模式会在覆盖前确认，并允许用户选择工作表关键字和输出语言。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::{fs, path::Path};

use crate::core::config::{Config, DEFAULT_CONFIG};
use crate::infra::t;

const DEFAULT_SHEET_KEY: &str = "テスト";

/// Answers collected by the wizard.
/// 向导收集到的回答。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAnswers {
    pub sheet_keyword: String,
    pub language: String,
}

impl Default for InitAnswers {
    fn default() -> Self {
        Self {
            sheet_keyword: DEFAULT_SHEET_KEY.to_string(),
            language: "en".to_string(),
        }
    }
}

/// Renders the default configuration with the wizard's answers applied,
/// keeping every comment of the template.
///
/// 在保留模板注释的前提下，将向导的回答应用到默认配置。
pub fn render_config(answers: &InitAnswers) -> Result<String> {
    let quote = |value: &str| toml::Value::String(value.to_string()).to_string();
    let content = DEFAULT_CONFIG
        .replacen("language = \"en\"", &format!("language = {}", quote(&answers.language)), 1)
        .replacen(
            &format!("sheet_search_keys = [\"{DEFAULT_SHEET_KEY}\"]"),
            &format!("sheet_search_keys = [{}]", quote(&answers.sheet_keyword)),
            1,
        );
    // The rendered file must load like any user-written one.
    Config::from_toml_str(&content).context("generated configuration is invalid")?;
    Ok(content)
}

fn ask(locale: &str) -> Result<InitAnswers> {
    let theme = ColorfulTheme::default();
    let sheet_keyword: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_sheet_keyword", locale = locale))
        .default(DEFAULT_SHEET_KEY.to_string())
        .interact_text()
        .context(t!("init.confirmation_failed", locale = locale).to_string())?;
    let language: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_language", locale = locale))
        .default(locale.to_string())
        .interact_text()
        .context(t!("init.confirmation_failed", locale = locale).to_string())?;
    Ok(InitAnswers {
        sheet_keyword,
        language,
    })
}

/// Executes the init command.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file without asking
/// * `non_interactive` - Write the defaults without prompting
/// * `locale` - Language for messages
pub fn execute(output: &Path, force: bool, non_interactive: bool, locale: &str) -> Result<()> {
    if output.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", path = output.display(), locale = locale).red());
            println!("{}", t!("init.use_force", locale = locale).yellow());
            anyhow::bail!(t!("init.file_exists", path = output.display(), locale = locale).to_string());
        }
        let confirmation = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("init.prompt_overwrite", path = output.display(), locale = locale))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed", locale = locale).to_string())?;
        if !confirmation {
            println!("{}", t!("init.cancelled", locale = locale));
            return Ok(());
        }
    }

    let answers = if non_interactive {
        InitAnswers::default()
    } else {
        println!("\n{}", t!("init.welcome", locale = locale).cyan().bold());
        ask(locale)?
    };
    let content = render_config(&answers)?;

    // Create parent directories if needed
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty())
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            t!("init.create_parent_dir_failed", path = parent.display(), locale = locale).to_string()
        })?;
    }

    fs::write(output, content).with_context(|| {
        t!("init.write_failed", path = output.display(), locale = locale).to_string()
    })?;

    println!("{}", t!("init.success", path = output.display(), locale = locale).green());
    println!("{}", t!("init.next_steps", locale = locale));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_written_into_the_template() {
        let content = render_config(&InitAnswers {
            sheet_keyword: "試験\"A\"".to_string(),
            language: "ja".to_string(),
        })
        .unwrap();
        let config = Config::from_toml_str(&content).unwrap();
        assert_eq!(config.language, "ja");
        assert_eq!(config.read_definition.sheet_search_keys, vec!["試験\"A\""]);
        assert!(content.contains("# Test Stat Configuration"));
    }

    #[test]
    fn defaults_reproduce_the_template() {
        let rendered = render_config(&InitAnswers::default()).unwrap();
        assert_eq!(
            Config::from_toml_str(&rendered).unwrap(),
            Config::from_toml_str(DEFAULT_CONFIG).unwrap()
        );
    }
}
