//! # Cross-Axis Aggregator / 跨维度聚合器
//!
//! By-tester, by-environment and grand-total rollups.
//!
//! 按担当者、按环境以及总计的汇总。

use crate::core::config::TestStatus;
use crate::core::daily::aggregate_daily;
use crate::core::extract::RowSet;
use crate::core::models::{DailyTally, EnvBreakdown, NameBreakdown, Row, Tally};

/// Date → tester → number of rows with a result. Undated rows are skipped.
/// 日期 → 担当者 → 有结果的行数。跳过无日期的行。
pub fn by_name(rows: &[Row]) -> NameBreakdown {
    let mut breakdown = NameBreakdown::new();
    for row in rows {
        let (Some(date), Some(_)) = (row.date.as_deref(), row.result.as_deref()) else {
            continue;
        };
        let Some(tester) = row.tester_label() else {
            continue;
        };
        *breakdown
            .entry(date.to_string())
            .or_default()
            .entry(tester.to_string())
            .or_insert(0) += 1;
    }
    breakdown
}

/// Aggregates every set on its own. A later set with the same name replaces an earlier one.
/// 独立聚合每个集合。同名的后续集合会替换之前的集合。
pub fn by_env(sets: &[RowSet], status: &TestStatus) -> EnvBreakdown {
    let mut breakdown = EnvBreakdown::new();
    for set in sets {
        breakdown.insert(set.name.clone(), aggregate_daily(&set.rows, status).dated);
    }
    breakdown
}

/// Sum of every dated and undated bucket, restricted to the configured results.
/// 所有带日期和无日期计数桶之和，仅包含配置的结果类别。
pub fn grand_total(daily: &DailyTally, status: &TestStatus) -> Tally {
    let mut total = Tally::zeroed(status.results.iter().map(String::as_str));
    for bucket in daily.buckets() {
        for result in &status.results {
            total.add(result, bucket.get(result));
        }
    }
    total
}
