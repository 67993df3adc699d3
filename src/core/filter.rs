//! # Filter Engine / 过滤引擎
//!
//! Validated row predicates (date range, tester, result type, environment)
//! applied before aggregation, plus the helpers that describe active filters.
//!
//! 聚合前应用的已校验行谓词（日期范围、担当者、结果类型、环境），
//! 以及描述当前过滤条件的辅助函数。

use chrono::NaiveDate;
use std::path::Path;

use crate::core::config::TestStatus;
use crate::core::error::FilterError;
use crate::core::models::{EnvBreakdown, Row};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter criteria as typed by the user, before validation.
/// 用户输入的、尚未校验的过滤条件。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tester: Option<String>,
    pub environment: Option<String>,
    /// Applies to both the tester and the environment match.
    pub exact_match: bool,
    pub result_types: Vec<String>,
}

/// Inclusive date range; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Empty or unparsable dates never fall inside a range.
    pub fn contains(&self, date: Option<&str>) -> bool {
        let Some(date) = date.and_then(|d| NaiveDate::parse_from_str(d.trim(), DATE_FORMAT).ok())
        else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Case-insensitive text predicate.
/// 不区分大小写的文本谓词。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub value: String,
    pub exact: bool,
}

impl TextMatch {
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_lowercase();
        let wanted = self.value.trim().to_lowercase();
        if self.exact {
            candidate == wanted
        } else {
            candidate.contains(&wanted)
        }
    }

    fn match_kind(&self) -> &'static str {
        if self.exact {
            "exact match"
        } else {
            "partial match"
        }
    }
}

/// Validated filter. A row must satisfy every active predicate.
/// 已校验的过滤器。一行必须满足所有启用的谓词。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub date_range: Option<DateRange>,
    pub tester: Option<TextMatch>,
    pub result_types: Option<Vec<String>>,
    /// Matched against the tester column, the only per-row name the sheets carry.
    /// 与担当者列进行匹配，这是工作表中唯一的逐行名称。
    pub environment: Option<TextMatch>,
}

fn parse_date(value: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FilterError::InvalidDate {
        value: value.to_string(),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FilterSpec {
    /// Validates raw criteria against the configured result categories.
    ///
    /// # Errors / 错误
    /// - `InvalidDate` for a bound that is not `YYYY-MM-DD`.
    /// - `InvertedRange` when the start date is after the end date.
    /// - `UnknownResultType` for result types missing from the configuration.
    pub fn parse(raw: &RawFilter, status: &TestStatus) -> Result<Self, FilterError> {
        let start = non_empty(&raw.start_date).map(parse_date).transpose()?;
        let end = non_empty(&raw.end_date).map(parse_date).transpose()?;
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(FilterError::InvertedRange {
                start: s.format(DATE_FORMAT).to_string(),
                end: e.format(DATE_FORMAT).to_string(),
            });
        }
        let date_range = (start.is_some() || end.is_some()).then_some(DateRange { start, end });

        let text_match = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| TextMatch {
                    value: v.to_string(),
                    exact: raw.exact_match,
                })
        };

        let result_types = if raw.result_types.is_empty() {
            None
        } else {
            let invalid: Vec<String> = raw
                .result_types
                .iter()
                .filter(|r| !status.is_result(r))
                .cloned()
                .collect();
            if !invalid.is_empty() {
                return Err(FilterError::UnknownResultType {
                    invalid,
                    valid: status.results.clone(),
                });
            }
            Some(raw.result_types.clone())
        };

        Ok(Self {
            date_range,
            tester: text_match(&raw.tester),
            result_types,
            environment: text_match(&raw.environment),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.tester.is_none()
            && self.result_types.is_none()
            && self.environment.is_none()
    }

    /// Whether `row` passes every active predicate.
    /// `row` 是否通过所有启用的谓词。
    pub fn matches(&self, row: &Row) -> bool {
        if let Some(range) = &self.date_range
            && !range.contains(row.date.as_deref())
        {
            return false;
        }

        let tester = row.tester_label().unwrap_or("");
        if let Some(tester_match) = &self.tester
            && !tester_match.matches(tester)
        {
            return false;
        }

        if let Some(allowed) = &self.result_types {
            let Some(result) = row.result.as_deref() else {
                return false;
            };
            if !allowed.iter().any(|a| a == result) {
                return false;
            }
        }

        if let Some(env_match) = &self.environment
            && !env_match.matches(tester)
        {
            return false;
        }

        true
    }

    /// Keeps the rows that pass. Each row keeps its own plan cell.
    pub fn apply(&self, mut rows: Vec<Row>) -> Vec<Row> {
        if !self.is_empty() {
            rows.retain(|row| self.matches(row));
        }
        rows
    }

    /// Prunes every environment bucket to the allowed result types.
    /// Other predicates do not touch the environment breakdown.
    ///
    /// 将每个环境计数桶裁剪为允许的结果类型。其他谓词不影响环境统计。
    pub fn prune_env(&self, by_env: &mut EnvBreakdown) {
        let Some(allowed) = &self.result_types else {
            return;
        };
        for daily in by_env.values_mut() {
            for bucket in daily.values_mut() {
                bucket.retain(|key| allowed.iter().any(|a| a == key));
            }
        }
    }

    /// One human readable line per active filter.
    /// 每个启用的过滤器对应一行可读描述。
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(range) = &self.date_range {
            match (range.start, range.end) {
                (Some(s), Some(e)) => lines.push(format!("Date Range: {s} to {e}")),
                (Some(s), None) => lines.push(format!("Date Range: {s} onwards")),
                (None, Some(e)) => lines.push(format!("Date Range: up to {e}")),
                (None, None) => {}
            }
        }
        if let Some(tester) = &self.tester {
            lines.push(format!("Tester: {} ({})", tester.value, tester.match_kind()));
        }
        if let Some(types) = &self.result_types {
            lines.push(format!("Result Type: {}", types.join(", ")));
        }
        if let Some(env) = &self.environment {
            lines.push(format!("Environment: {} ({})", env.value, env.match_kind()));
        }

        lines
    }

    /// Appends the active filters to an output file name:
    /// `report.csv` → `report_2024-01-01_to_2024-01-31_alice_Pass_Fail.csv`.
    pub fn output_file_name(&self, base: &str) -> String {
        if self.is_empty() {
            return base.to_string();
        }

        let path = Path::new(base);
        let extension = path.extension().and_then(|e| e.to_str());
        let stem = match extension {
            Some(ext) => &base[..base.len() - ext.len() - 1],
            None => base,
        };

        let mut parts = vec![stem.to_string()];
        if let Some(range) = &self.date_range {
            match (range.start, range.end) {
                (Some(s), Some(e)) => parts.push(format!("{s}_to_{e}")),
                (Some(s), None) => parts.push(format!("{s}_onwards")),
                (None, Some(e)) => parts.push(format!("up_to_{e}")),
                (None, None) => {}
            }
        }
        if let Some(tester) = &self.tester {
            parts.push(tester.value.clone());
        }
        if let Some(types) = &self.result_types {
            parts.push(types.join("_"));
        }
        if let Some(env) = &self.environment {
            parts.push(env.value.clone());
        }

        let name = parts.join("_");
        match extension {
            Some(ext) => format!("{name}.{ext}"),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, DEFAULT_CONFIG};
    use crate::core::models::Tally;
    use std::collections::BTreeMap;

    fn status() -> TestStatus {
        Config::from_toml_str(DEFAULT_CONFIG).unwrap().test_status
    }

    fn row(result: &str, tester: Option<&str>, date: Option<&str>) -> Row {
        Row {
            result: Some(result.to_string()),
            tester: tester.map(str::to_string),
            date: date.map(str::to_string),
            plan: None,
            sheet: "S".to_string(),
        }
    }

    fn raw() -> RawFilter {
        RawFilter::default()
    }

    #[test]
    fn validation_rejects_bad_input() {
        let bad_date = RawFilter {
            start_date: Some("2024/01/01".to_string()),
            ..raw()
        };
        assert!(matches!(
            FilterSpec::parse(&bad_date, &status()),
            Err(FilterError::InvalidDate { .. })
        ));

        let inverted = RawFilter {
            start_date: Some("2024-02-01".to_string()),
            end_date: Some("2024-01-01".to_string()),
            ..raw()
        };
        assert!(matches!(
            FilterSpec::parse(&inverted, &status()),
            Err(FilterError::InvertedRange { .. })
        ));

        let unknown = RawFilter {
            result_types: vec!["Pass".to_string(), "Maybe".to_string()],
            ..raw()
        };
        let err = FilterSpec::parse(&unknown, &status()).unwrap_err();
        assert_eq!(err.kind(), "filter_validation_error");
        assert!(err.to_string().contains("Maybe"));
    }

    #[test]
    fn date_range_is_inclusive_and_skips_undated() {
        let filter = FilterSpec::parse(
            &RawFilter {
                start_date: Some("2024-01-02".to_string()),
                end_date: Some("2024-01-03".to_string()),
                ..raw()
            },
            &status(),
        )
        .unwrap();
        assert!(!filter.matches(&row("Pass", Some("a"), Some("2024-01-01"))));
        assert!(filter.matches(&row("Pass", Some("a"), Some("2024-01-02"))));
        assert!(filter.matches(&row("Pass", Some("a"), Some("2024-01-03"))));
        assert!(!filter.matches(&row("Pass", Some("a"), None)));
        assert!(!filter.matches(&row("Pass", Some("a"), Some("soon"))));
    }

    #[test]
    fn tester_match_is_case_insensitive() {
        let partial = FilterSpec::parse(
            &RawFilter {
                tester: Some(" ali ".to_string()),
                ..raw()
            },
            &status(),
        )
        .unwrap();
        assert!(partial.matches(&row("Pass", Some("Alice"), Some("2024-01-01"))));

        let exact = FilterSpec::parse(
            &RawFilter {
                tester: Some("ALICE".to_string()),
                exact_match: true,
                ..raw()
            },
            &status(),
        )
        .unwrap();
        assert!(exact.matches(&row("Pass", Some(" alice "), Some("2024-01-01"))));
        assert!(!exact.matches(&row("Pass", Some("Alice B"), Some("2024-01-01"))));
    }

    #[test]
    fn environment_filter_reads_the_tester_column() {
        let filter = FilterSpec::parse(
            &RawFilter {
                environment: Some("no_name".to_string()),
                exact_match: true,
                ..raw()
            },
            &status(),
        )
        .unwrap();
        assert!(filter.matches(&row("Fail", None, Some("2024-01-02"))));
        assert!(!filter.matches(&row("Fail", Some("Bob"), Some("2024-01-02"))));
    }

    #[test]
    fn result_type_filter_prunes_env_buckets_only_by_key() {
        let filter = FilterSpec::parse(
            &RawFilter {
                result_types: vec!["Pass".to_string()],
                ..raw()
            },
            &status(),
        )
        .unwrap();
        let rows = vec![
            row("Pass", Some("a"), Some("2024-01-01")),
            row("Fail", Some("a"), Some("2024-01-01")),
            row("Blocked", Some("a"), Some("2024-01-01")),
        ];
        let kept = filter.apply(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].result.as_deref(), Some("Pass"));

        let mut by_env: EnvBreakdown = BTreeMap::new();
        by_env
            .entry("env".to_string())
            .or_default()
            .insert("2024-01-01".to_string(), Tally::for_status(&status()));
        filter.prune_env(&mut by_env);
        let keys: Vec<&str> = by_env["env"]["2024-01-01"].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Pass"]);
    }

    #[test]
    fn describe_and_file_name_follow_active_filters() {
        let filter = FilterSpec::parse(
            &RawFilter {
                start_date: Some("2024-01-01".to_string()),
                tester: Some("alice".to_string()),
                result_types: vec!["Pass".to_string(), "Fail".to_string()],
                ..raw()
            },
            &status(),
        )
        .unwrap();
        assert_eq!(
            filter.describe(),
            vec![
                "Date Range: 2024-01-01 onwards",
                "Tester: alice (partial match)",
                "Result Type: Pass, Fail",
            ]
        );
        assert_eq!(
            filter.output_file_name("out/report.csv"),
            "out/report_2024-01-01_onwards_alice_Pass_Fail.csv"
        );
        assert_eq!(FilterSpec::default().output_file_name("r.csv"), "r.csv");
    }
}
