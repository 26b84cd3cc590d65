//! Integration tests for Settings loading from a local `.giftcircle.toml`.
//!
//! Note: these tests only assert values the local file sets, so a global
//! config on the test machine does not change their outcome.

use std::fs;

use tempfile::TempDir;

use giftcircle::application::ApplicationError;
use giftcircle::config::{local_config_path, Settings};
use giftcircle::domain::NonLargestPick;

#[test]
fn given_local_config_when_load_then_overrides_pick_and_output() {
    // Arrange
    let roster_dir = TempDir::new().unwrap();
    fs::write(
        roster_dir.path().join(".giftcircle.toml"),
        r#"
pick = "first-available"

[output]
show_empty = false
tree = true
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(roster_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.pick, NonLargestPick::FirstAvailable);
    assert!(!settings.output.show_empty);
    assert!(settings.output.tree);
}

#[test]
fn given_partial_output_section_when_load_then_keeps_other_field() {
    let roster_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(roster_dir.path()),
        "[output]\nshow_empty = false\n",
    )
    .unwrap();

    let settings = Settings::load(Some(roster_dir.path())).expect("load settings");

    assert!(!settings.output.show_empty);
}

#[test]
fn given_roster_with_tilde_when_load_then_path_is_expanded() {
    let roster_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(roster_dir.path()),
        "roster = \"~/gifts/roster.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(roster_dir.path())).expect("load settings");

    let roster = settings.roster.expect("roster configured");
    assert!(!roster.to_string_lossy().starts_with('~'));
    assert!(roster.ends_with("gifts/roster.toml"));
}

#[test]
fn given_unknown_pick_policy_when_load_then_config_error() {
    let roster_dir = TempDir::new().unwrap();
    fs::write(local_config_path(roster_dir.path()), "pick = \"random\"\n").unwrap();

    let err = Settings::load(Some(roster_dir.path())).unwrap_err();

    match err {
        ApplicationError::Config { message } => {
            assert!(message.contains(".giftcircle.toml"), "message: {message}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let roster_dir = TempDir::new().unwrap();
    fs::write(local_config_path(roster_dir.path()), "[output\n").unwrap();

    let result = Settings::load(Some(roster_dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_local_config_when_shown_then_serializes_effective_values() {
    let roster_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(roster_dir.path()),
        "pick = \"first-available\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(roster_dir.path())).expect("load settings");
    let shown = settings.to_toml().expect("serialize");

    assert!(shown.contains("pick = \"first-available\""));
    assert!(shown.contains("[output]"));
}
