//! # Configuration Module / 配置模块
//!
//! Declarative description of how a test specification workbook is read and how
//! its result values are classified. Loaded once per run from a TOML (or legacy
//! JSON) file and never mutated afterwards.
//!
//! 描述如何读取测试规格工作簿以及如何对结果值进行分类的声明式配置。
//! 每次运行从 TOML（或旧版 JSON）文件加载一次，之后不再修改。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::ConfigError;

/// Keyword set for one semantic column role (result, tester, date, ...).
/// 单个语义列角色（结果、担当者、日期……）的关键字集合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnKeywords {
    /// A header matches if its text contains any of these substrings.
    /// 表头文本包含其中任意子串即视为匹配。
    #[serde(default)]
    pub keys: Vec<String>,
    /// Exact header texts that never match, even if they contain a key.
    /// 即使包含关键字也不匹配的完整表头文本。
    #[serde(default)]
    pub ignores: Vec<String>,
}

/// Where the header row lives: the first row whose `search_col` cell equals `search_key`.
/// 表头行的位置：`search_col` 列中值等于 `search_key` 的第一行。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderLocator {
    /// Column letter, e.g. "A" / 列字母，例如 "A"
    pub search_col: String,
    /// Exact cell text of the header marker / 表头标记单元格的完整文本
    pub search_key: String,
}

/// Everything needed to find sheets, the header row and the column roles.
/// 查找工作表、表头行及列角色所需的全部信息。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadDefinition {
    /// Sheets whose name contains any of these are processed; empty means all sheets.
    /// 名称包含其中任意关键字的工作表会被处理；为空表示全部工作表。
    pub sheet_search_keys: Vec<String>,
    #[serde(default)]
    pub sheet_search_ignores: Vec<String>,
    pub header: HeaderLocator,
    pub result_row: ColumnKeywords,
    pub person_row: ColumnKeywords,
    pub date_row: ColumnKeywords,
    #[serde(default)]
    pub plan_row: ColumnKeywords,
    pub tobe_row: ColumnKeywords,
    /// Result values that take a case out of the available count.
    /// 使用例不计入有效数的结果值。
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Display labels of the derived counters.
/// 派生计数器的显示标签。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusLabels {
    pub completed: String,
    pub executed: String,
    pub planned: String,
    #[serde(default = "default_not_run_label")]
    pub not_run: String,
    #[serde(default = "default_completion_rate_label")]
    pub completion_rate: String,
    #[serde(default = "default_execution_rate_label")]
    pub execution_rate: String,
}

/// Result categories and the subsets that count as completed / executed.
/// 结果类别，以及计为完成 / 消化的子集。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestStatus {
    /// Ordered list of valid result values. Order drives display and iteration.
    /// 有效结果值的有序列表，顺序决定显示与遍历顺序。
    pub results: Vec<String>,
    pub completed_results: Vec<String>,
    pub executed_results: Vec<String>,
    pub labels: StatusLabels,
}

impl TestStatus {
    /// Every key of a fully initialized bucket: the results, then the completed,
    /// executed and planned labels.
    ///
    /// 完整初始化的计数桶的全部键：结果值，然后是完成、消化和计划标签。
    pub fn bucket_labels(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .map(String::as_str)
            .chain(self.derived_labels())
    }

    /// The three labels that are derived from results rather than being results.
    pub fn derived_labels(&self) -> [&str; 3] {
        [
            self.labels.completed.as_str(),
            self.labels.executed.as_str(),
            self.labels.planned.as_str(),
        ]
    }

    pub fn is_result(&self, value: &str) -> bool {
        self.results.iter().any(|r| r == value)
    }

    pub fn is_completed(&self, value: &str) -> bool {
        self.completed_results.iter().any(|r| r == value)
    }

    pub fn is_executed(&self, value: &str) -> bool {
        self.executed_results.iter().any(|r| r == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateName {
    pub name: String,
}

/// Display names of the three run states.
/// 三种实施状态的显示名称。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunStateNames {
    pub not_started: StateName,
    pub in_progress: StateName,
    pub completed: StateName,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputDefinition {
    pub state: RunStateNames,
}

/// Root configuration, loaded from `TestStat.toml` (or a legacy `config.json`).
/// 根配置，从 `TestStat.toml`（或旧版 `config.json`）加载。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// The language for console output (e.g., "en", "ja"). Defaults to "en".
    /// 控制台输出的语言（例如 "en", "ja"）。默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,
    pub read_definition: ReadDefinition,
    pub test_status: TestStatus,
    pub output_definition: OutputDefinition,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_not_run_label() -> String {
    "未着手".to_string()
}

fn default_completion_rate_label() -> String {
    "完了率(%)".to_string()
}

fn default_execution_rate_label() -> String {
    "消化率(%)".to_string()
}

impl Config {
    /// Reads, parses and validates a configuration file.
    /// `.json` files are parsed as JSON, everything else as TOML.
    ///
    /// 读取、解析并校验配置文件。
    /// `.json` 文件按 JSON 解析，其余按 TOML 解析。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the semantic invariants that serde cannot express.
    /// 检查 serde 无法表达的语义约束。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let status = &self.test_status;
        if status.results.is_empty() {
            return Err(ConfigError::Invalid {
                message: "test_status.results must not be empty".to_string(),
            });
        }

        for (field, subset) in [
            ("completed_results", &status.completed_results),
            ("executed_results", &status.executed_results),
        ] {
            let unknown: Vec<&str> = subset
                .iter()
                .filter(|value| !status.is_result(value))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "test_status.{field} contains values missing from results: {}",
                        unknown.join(", ")
                    ),
                });
            }
        }

        if column_index(&self.read_definition.header.search_col).is_none() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "read_definition.header.search_col is not a column letter: '{}'",
                    self.read_definition.header.search_col
                ),
            });
        }

        Ok(())
    }

    /// 1-indexed column of the header marker.
    pub fn header_search_column(&self) -> usize {
        // `validate` guarantees the letter parses.
        column_index(&self.read_definition.header.search_col).unwrap_or(1)
    }
}

/// Converts a spreadsheet column letter ("A", "AB") into a 1-indexed column number.
/// 将列字母（"A"、"AB"）转换为从 1 开始的列号。
pub fn column_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        if c.is_ascii_alphabetic() {
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        } else {
            None
        }
    })
}

/// Converts a 1-indexed column number back into its letter form.
/// 将从 1 开始的列号转换回列字母。
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The configuration written by `test-stat init`.
/// `test-stat init` 写出的默认配置。
pub const DEFAULT_CONFIG: &str = r#"# Test Stat Configuration / テスト集計設定
# Language for console output: "en" or "ja" / コンソール出力の言語
language = "en"

[read_definition]
# Sheets whose name contains one of these keys are aggregated / 集計対象シートのキーワード
sheet_search_keys = ["テスト"]
sheet_search_ignores = ["サンプル"]
# Result values that remove a case from the available count / 対象外として扱う結果
excluded = ["N/A"]

[read_definition.header]
# The header row is the first row whose cell in `search_col` equals `search_key`
search_col = "A"
search_key = "No."

[read_definition.result_row]
keys = ["結果"]
ignores = ["期待結果"]

[read_definition.person_row]
keys = ["担当者"]

[read_definition.date_row]
keys = ["実施日"]

[read_definition.plan_row]
keys = ["予定日"]

[read_definition.tobe_row]
keys = ["期待結果"]

[test_status]
results = ["Pass", "Fixed", "Fail", "Blocked", "Suspend", "N/A"]
completed_results = ["Pass", "Fixed"]
executed_results = ["Pass", "Fixed", "Fail", "Blocked"]

[test_status.labels]
completed = "完了数"
executed = "消化数"
planned = "計画数"

[output_definition.state.not_started]
name = "未着手"

[output_definition.state.in_progress]
name = "進行中"

[output_definition.state.completed]
name = "完了"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_and_validates() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.language, "en");
        assert_eq!(config.test_status.results.len(), 6);
        assert_eq!(config.test_status.labels.not_run, "未着手");
        assert_eq!(config.header_search_column(), 1);
    }

    #[test]
    fn column_letters_round_trip() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index(""), None);
        assert_eq!(column_letter(28), "AB");
        assert_eq!(column_letter(1), "A");
    }

    #[test]
    fn bucket_labels_are_results_then_derived() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        let labels: Vec<&str> = config.test_status.bucket_labels().collect();
        assert_eq!(labels.first(), Some(&"Pass"));
        assert_eq!(&labels[6..], &["完了数", "消化数", "計画数"]);
    }
}
