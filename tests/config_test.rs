//! Integration tests for Settings loading from a config file
//!
//! These tests pass an explicit file to `load_from`, so the user's global
//! config never takes part. The env override test uses a key no other test
//! asserts on, since env vars are shared by tests running in parallel.

use std::env;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use orgchart::application::EditPolicy;
use orgchart::config::Settings;

#[test]
fn given_config_file_when_loading_then_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("orgchart.toml");
    fs::write(
        &file,
        r#"
base_dir = "/srv/orgchart"
root_name = "Director"
strict_node_ids = true
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Some(&file)).expect("load settings");

    assert_eq!(settings.base_dir, PathBuf::from("/srv/orgchart"));
    assert_eq!(settings.root_name, "Director");
    assert!(settings.strict_node_ids);
    // untouched keys keep their defaults
    assert_eq!(settings.root_position, Settings::default().root_position);
    assert!(!settings.prune_groups_on_delete);
}

#[test]
fn given_missing_config_file_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();
    let settings = Settings::load_from(Some(&temp.path().join("absent.toml"))).unwrap();
    assert_eq!(settings.default_chart_name, Settings::default().default_chart_name);
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("orgchart.toml");
    fs::write(&file, "strict_node_ids = \"maybe\"").unwrap();

    let err = Settings::load_from(Some(&file)).unwrap_err();

    assert!(err.to_string().starts_with("config error"));
}

#[test]
fn given_base_dir_override_when_applied_then_derived_dirs_follow() {
    let settings = Settings::default().with_base_dir(PathBuf::from("/data/charts-home"));

    assert_eq!(settings.charts_dir(), PathBuf::from("/data/charts-home/charts"));
    assert_eq!(settings.exports_dir(), PathBuf::from("/data/charts-home/exports"));
}

#[test]
fn given_settings_when_deriving_policy_then_copies_edit_rules() {
    let settings = Settings {
        prune_groups_on_delete: true,
        new_node_name: "TBD".into(),
        ..Settings::default()
    };

    let policy = EditPolicy::from(&settings);

    assert!(policy.prune_groups_on_delete);
    assert!(!policy.strict_node_ids);
    assert_eq!(policy.new_node_name, "TBD");
}

#[test]
fn given_env_var_with_single_underscore_prefix_when_loading_then_overrides_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("orgchart.toml");
    fs::write(&file, "new_node_position = \"From File\"\n").unwrap();
    env::set_var("ORGCHART_NEW_NODE_POSITION", "From Env");

    let result = Settings::load_from(Some(&file));
    env::remove_var("ORGCHART_NEW_NODE_POSITION");

    let settings = result.expect("load settings");
    assert_eq!(settings.new_node_position, "From Env");
}
