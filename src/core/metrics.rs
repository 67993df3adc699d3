//! # Metrics & Status / 指标与状态
//!
//! Derives case counts, rates, run status and warnings from aggregated data.
//!
//! 从聚合数据推导用例计数、比率、实施状态和警告。

use crate::core::config::{Config, RunStateNames, TestStatus};
use crate::core::models::{
    DailyTally, GrandTotal, Notice, Row, RunInfo, RunState, Stats, Tally, TotalLabels,
};

/// Status string reported for the unreachable run state.
pub const UNKNOWN_STATUS: &str = "???";

/// Builds the case counts of one file.
///
/// `all` is the number of test cases over every sheet (sets × cases), `rows` the
/// (possibly filtered) row stream and `total` the grand total over results.
///
/// 构建单个文件的用例计数。`all` 为所有工作表的用例数（集合数 × 用例数），
/// `rows` 为（可能已过滤的）行流，`total` 为各结果的总计。
pub fn compute_stats(all: u64, rows: &[Row], total: &Tally, config: &Config) -> Stats {
    let excluded_values = &config.read_definition.excluded;
    let excluded = rows
        .iter()
        .filter(|row| {
            row.result
                .as_deref()
                .is_some_and(|r| excluded_values.iter().any(|e| e == r))
        })
        .count() as u64;

    let available = all as i64 - excluded as i64;
    let executed = total.sum();
    let completed = completed_count(total, &config.test_status);
    let incompleted = (available - executed as i64).max(0) as u64;
    let planned = rows.iter().filter(|row| row.plan.is_some()).count() as u64;

    Stats {
        all,
        excluded,
        available,
        executed,
        completed,
        incompleted,
        planned,
    }
}

/// Sum of `total` over the completed results.
pub fn completed_count(total: &Tally, status: &TestStatus) -> u64 {
    status.completed_results.iter().map(|r| total.get(r)).sum()
}

/// Run state machine, evaluated once per report.
/// 实施状态机，每份报告评估一次。
pub fn run_state(stats: &Stats) -> RunState {
    if stats.executed == 0 {
        RunState::NotStarted
    } else if stats.completed as i64 == stats.available && stats.incompleted == 0 {
        RunState::Completed
    } else if stats.executed > 0 {
        RunState::InProgress
    } else {
        RunState::Unknown
    }
}

/// Configured display name of a run state.
pub fn state_name(state: RunState, names: &RunStateNames) -> String {
    match state {
        RunState::NotStarted => names.not_started.name.clone(),
        RunState::InProgress => names.in_progress.name.clone(),
        RunState::Completed => names.completed.name.clone(),
        RunState::Unknown => UNKNOWN_STATUS.to_string(),
    }
}

/// Start date is the earliest dated key. The last update is only reported
/// once work has begun.
///
/// 开始日期为最早的日期键。只有在工作开始后才报告最后更新日期。
pub fn run_info(state: RunState, daily: &DailyTally, names: &RunStateNames) -> RunInfo {
    let last_update = match state {
        RunState::Completed | RunState::InProgress => daily.last_date().map(str::to_string),
        RunState::NotStarted | RunState::Unknown => None,
    };
    RunInfo {
        state,
        status: state_name(state, names),
        start_date: daily.first_date().map(str::to_string),
        last_update,
    }
}

/// `numerator / denominator × 100` rounded to two decimals; 0 when the denominator is not positive.
/// 按百分比计算并保留两位小数；分母不为正时返回 0。
pub fn rate(numerator: u64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    let percent = numerator as f64 / denominator as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

/// Wraps the per-result totals with the derived counters and rates.
pub fn total_record(
    results: Tally,
    completed: u64,
    executed: u64,
    available: i64,
    status: &TestStatus,
) -> GrandTotal {
    GrandTotal {
        total: results.sum(),
        results,
        completed,
        executed,
        completion_rate: rate(completed, available),
        execution_rate: rate(executed, available),
        labels: TotalLabels::from_status(status),
    }
}

/// At most one warning: `no_data` takes precedence over `inconsistent_count`.
/// 最多一个警告：`no_data` 优先于 `inconsistent_count`。
pub fn warning(stats: &Stats) -> Option<Notice> {
    if stats.all == 0 {
        Some(Notice::new("no_data", "no test cases could be counted"))
    } else if stats.executed as i64 > stats.available {
        Some(Notice::new(
            "inconsistent_count",
            format!(
                "executed count ({}) exceeds available count ({})",
                stats.executed, stats.available
            ),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_CONFIG;

    fn config() -> Config {
        Config::from_toml_str(DEFAULT_CONFIG).unwrap()
    }

    fn stats(available: i64, executed: u64, completed: u64) -> Stats {
        Stats {
            all: available.max(0) as u64,
            excluded: 0,
            available,
            executed,
            completed,
            incompleted: (available - executed as i64).max(0) as u64,
            planned: 0,
        }
    }

    #[test]
    fn state_machine_covers_each_branch() {
        assert_eq!(run_state(&stats(10, 0, 0)), RunState::NotStarted);
        assert_eq!(run_state(&stats(10, 10, 10)), RunState::Completed);
        assert_eq!(run_state(&stats(10, 10, 9)), RunState::InProgress);
        assert_eq!(run_state(&stats(10, 4, 4)), RunState::InProgress);
    }

    #[test]
    fn not_started_withholds_last_update() {
        let config = config();
        let names = &config.output_definition.state;
        let mut daily = DailyTally::default();
        daily
            .dated
            .insert("2024-01-03".to_string(), Tally::for_status(&config.test_status));

        let info = run_info(RunState::NotStarted, &daily, names);
        assert_eq!(info.status, "未着手");
        assert_eq!(info.start_date.as_deref(), Some("2024-01-03"));
        assert_eq!(info.last_update, None);

        let empty = run_info(RunState::NotStarted, &DailyTally::default(), names);
        assert_eq!(empty.start_date, None);

        let done = run_info(RunState::Completed, &daily, names);
        assert_eq!(done.last_update.as_deref(), Some("2024-01-03"));
        assert_eq!(state_name(RunState::Unknown, names), "???");
    }

    #[test]
    fn rates_round_to_two_decimals() {
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(2, 3), 66.67);
        assert_eq!(rate(5, 0), 0.0);
        assert_eq!(rate(5, -2), 0.0);
    }

    #[test]
    fn incompleted_never_goes_negative() {
        let config = config();
        let mut total = Tally::zeroed(["Pass"]);
        total.add("Pass", 7);
        let stats = compute_stats(5, &[], &total, &config);
        assert_eq!(stats.incompleted, 0);
        assert_eq!(warning(&stats).map(|w| w.kind), Some("inconsistent_count".to_string()));
    }

    #[test]
    fn no_data_wins_over_inconsistent_count() {
        let stats = stats(0, 3, 0);
        assert_eq!(warning(&stats).map(|w| w.kind), Some("no_data".to_string()));
    }
}
