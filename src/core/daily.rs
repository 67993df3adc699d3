//! # Daily Aggregator / 按日聚合器
//!
//! Turns a row stream into zero-initialized, date-keyed result counts.
//!
//! 将行流转换为零初始化、按日期索引的结果计数。

use crate::core::config::TestStatus;
use crate::core::models::{DailyTally, Row, Tally};

/// Counts `rows` per date.
///
/// For each row a plan date increments the planned label on that plan date. The row's
/// own result then goes to its date (or to the undated bucket) where it increments the
/// exact result label, the completed label and the executed label independently.
/// Every bucket touched is first filled with zeros for all configured labels.
///
/// 按日期统计 `rows`。
/// 每行的计划日期会在该计划日期上增加计划数。随后该行的结果计入其日期（或无日期桶），
/// 分别独立增加对应结果、完成数和消化数。任何被访问的计数桶都会先以全部标签的零值初始化。
pub fn aggregate_daily(rows: &[Row], status: &TestStatus) -> DailyTally {
    let mut daily = DailyTally::default();
    let planned_label = status.labels.planned.as_str();

    for row in rows {
        if let Some(plan_date) = row.plan.as_deref() {
            daily
                .dated
                .entry(plan_date.to_string())
                .or_insert_with(|| Tally::for_status(status))
                .increment(planned_label);
        }

        let bucket = match row.date.as_deref() {
            Some(date) => daily
                .dated
                .entry(date.to_string())
                .or_insert_with(|| Tally::for_status(status)),
            None => daily.undated.get_or_insert_with(|| Tally::for_status(status)),
        };

        let Some(result) = row.result.as_deref() else {
            continue;
        };
        if status.is_result(result) {
            bucket.increment(result);
        }
        if status.is_completed(result) {
            bucket.increment(&status.labels.completed);
        }
        if status.is_executed(result) {
            bucket.increment(&status.labels.executed);
        }
    }

    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, DEFAULT_CONFIG};

    fn status() -> TestStatus {
        Config::from_toml_str(DEFAULT_CONFIG).unwrap().test_status
    }

    fn row(result: Option<&str>, date: Option<&str>, plan: Option<&str>) -> Row {
        Row {
            result: result.map(str::to_string),
            tester: Some("Alice".to_string()),
            date: date.map(str::to_string),
            plan: plan.map(str::to_string),
            sheet: "S".to_string(),
        }
    }

    #[test]
    fn pass_increments_exactly_three_counters() {
        let status = status();
        let daily = aggregate_daily(&[row(Some("Pass"), Some("2024-01-01"), None)], &status);
        let bucket = &daily.dated["2024-01-01"];
        let non_zero: Vec<(&str, u64)> = bucket.iter().filter(|(_, c)| *c > 0).collect();
        assert_eq!(non_zero, vec![("Pass", 1), ("完了数", 1), ("消化数", 1)]);
    }

    #[test]
    fn buckets_are_fully_zero_initialized() {
        let status = status();
        let daily = aggregate_daily(&[row(Some("Fail"), Some("2024-01-01"), None)], &status);
        let bucket = &daily.dated["2024-01-01"];
        for label in status.bucket_labels() {
            assert!(bucket.contains(label), "missing {label}");
        }
        assert_eq!(bucket.get("Fail"), 1);
        assert_eq!(bucket.get("完了数"), 0);
        assert_eq!(bucket.get("消化数"), 1);
    }

    #[test]
    fn plan_dates_get_their_own_bucket() {
        let status = status();
        let rows = [
            row(Some("Pass"), Some("2024-01-02"), Some("2024-01-01")),
            row(None, None, Some("2024-01-03")),
        ];
        let daily = aggregate_daily(&rows, &status);
        let keys: Vec<&str> = daily.dated.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(daily.dated["2024-01-01"].get("計画数"), 1);
        assert_eq!(daily.dated["2024-01-01"].get("Pass"), 0);
        assert_eq!(daily.dated["2024-01-02"].get("Pass"), 1);
        assert_eq!(daily.dated["2024-01-03"].get("計画数"), 1);
    }

    #[test]
    fn undated_rows_are_kept_apart() {
        let status = status();
        let rows = [
            row(Some("Blocked"), None, None),
            row(Some("Unknown"), Some("2024-01-05"), None),
        ];
        let daily = aggregate_daily(&rows, &status);
        let undated = daily.undated.as_ref().unwrap();
        assert_eq!(undated.get("Blocked"), 1);
        assert_eq!(daily.dated["2024-01-05"].sum(), 0);
        assert_eq!(daily.first_date(), Some("2024-01-05"));
    }
}
