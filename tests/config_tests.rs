//! Configuration loading and validation.

use std::fs;
use tempfile::tempdir;
use test_stat::core::config::{Config, DEFAULT_CONFIG};
use test_stat::core::error::ConfigError;

#[test]
fn loads_toml_and_json_by_extension() {
    let dir = tempdir().unwrap();
    let toml_path = dir.path().join("TestStat.toml");
    fs::write(&toml_path, DEFAULT_CONFIG).unwrap();
    let from_toml = Config::load(&toml_path).unwrap();

    let json_path = dir.path().join("config.json");
    fs::write(&json_path, serde_json::to_string(&from_toml).unwrap()).unwrap();
    let from_json = Config::load(&json_path).unwrap();

    assert_eq!(from_toml, from_json);
}

#[test]
fn optional_sections_take_defaults() {
    let content = r#"
[read_definition]
sheet_search_keys = []

[read_definition.header]
search_col = "B"
search_key = "ID"

[read_definition.result_row]
keys = ["Result"]

[read_definition.person_row]
keys = ["Tester"]

[read_definition.date_row]
keys = ["Date"]

[read_definition.tobe_row]
keys = ["Expected"]

[test_status]
results = ["OK", "NG"]
completed_results = ["OK"]
executed_results = ["OK", "NG"]

[test_status.labels]
completed = "done"
executed = "run"
planned = "plan"

[output_definition.state.not_started]
name = "todo"

[output_definition.state.in_progress]
name = "doing"

[output_definition.state.completed]
name = "done"
"#;
    let config = Config::from_toml_str(content).unwrap();
    assert_eq!(config.language, "en");
    assert!(config.read_definition.sheet_search_ignores.is_empty());
    assert!(config.read_definition.excluded.is_empty());
    assert!(config.read_definition.plan_row.keys.is_empty());
    assert!(config.read_definition.result_row.ignores.is_empty());
    assert_eq!(config.test_status.labels.completion_rate, "完了率(%)");
    assert_eq!(config.header_search_column(), 2);
}

#[test]
fn subsets_must_be_declared_results() {
    let content = DEFAULT_CONFIG.replace(
        r#"completed_results = ["Pass", "Fixed"]"#,
        r#"completed_results = ["Pass", "Done"]"#,
    );
    let err = Config::from_toml_str(&content).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert_eq!(err.kind(), "config_invalid");
    assert!(err.to_string().contains("Done"));
}

#[test]
fn missing_sections_and_bad_files_are_reported() {
    assert!(matches!(
        Config::from_toml_str("language = \"en\""),
        Err(ConfigError::Parse { .. })
    ));

    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(Config::load(&missing), Err(ConfigError::Read { .. })));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[read_definition").unwrap();
    match Config::load(&broken) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path.as_deref(), Some(broken.as_path())),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn header_column_must_be_a_letter() {
    let content = DEFAULT_CONFIG.replace(r#"search_col = "A""#, r#"search_col = "1""#);
    assert!(matches!(
        Config::from_toml_str(&content),
        Err(ConfigError::Invalid { .. })
    ));
}
