//! Tests for RosterService

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use giftcircle::application::services::{AllocationService, RosterService};
use giftcircle::application::ApplicationError;
use giftcircle::domain::DomainError;
use giftcircle::infrastructure::di::ServiceContainer;
use giftcircle::infrastructure::traits::RealFileSystem;
use giftcircle::config::Settings;

/// Helper to create roster files for testing
fn create_roster(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write roster");
    path
}

fn service() -> RosterService {
    RosterService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_toml_roster_when_loading_then_returns_participants_in_file_order() {
    // Arrange - ids may be numbers or strings
    let temp = TempDir::new().unwrap();
    let roster = create_roster(
        &temp,
        "roster.toml",
        r#"
[[participants]]
id = 1
country = "usa"
international = true

[[participants]]
id = "anna"
country = "ch"
"#,
    );

    // Act
    let participants = service().load(&roster).unwrap();

    // Assert
    assert_eq!(participants.len(), 2);
    assert_eq!(participants[0].id.as_str(), "1");
    assert!(participants[0].eligible_international);
    assert_eq!(participants[1].id.as_str(), "anna");
    assert_eq!(participants[1].country, "ch");
    assert!(!participants[1].eligible_international);
    assert!(participants.iter().all(|p| !p.is_reject()));
}

#[test]
fn given_text_roster_when_loading_then_parses_each_line() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let roster = create_roster(
        &temp,
        "roster.txt",
        "# id, country, flag\n16, ch, D\n17, ch, no\n18 ch 0\n19, ch, yes\n",
    );

    // Act
    let participants = service().load(&roster).unwrap();

    // Assert
    let flags: Vec<bool> = participants.iter().map(|p| p.eligible_international).collect();
    assert_eq!(flags, vec![false, false, false, true]);
}

#[test]
fn given_missing_roster_when_loading_then_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let err = service().load(&missing).unwrap_err();

    assert!(matches!(err, ApplicationError::RosterNotFound(path) if path == missing));
}

#[test]
fn given_directory_when_loading_then_not_found() {
    let temp = TempDir::new().unwrap();

    let err = service().load(temp.path()).unwrap_err();

    assert!(matches!(err, ApplicationError::RosterNotFound(_)));
}

#[test]
fn given_malformed_toml_when_loading_then_invalid_roster() {
    let temp = TempDir::new().unwrap();
    let roster = create_roster(&temp, "roster.toml", "[[participants]]\nid = 1\n");

    let err = service().load(&roster).unwrap_err();

    match err {
        ApplicationError::InvalidRoster { path, message } => {
            assert_eq!(path, roster);
            assert!(message.contains("country"), "message: {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_duplicate_ids_in_toml_when_loading_then_domain_error() {
    let temp = TempDir::new().unwrap();
    let roster = create_roster(
        &temp,
        "roster.toml",
        r#"
[[participants]]
id = 7
country = "de"

[[participants]]
id = "7"
country = "ca"
"#,
    );

    let err = service().load(&roster).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateId(id)) if id == "7"
    ));
}

#[test]
fn given_bad_text_line_when_loading_then_reports_line_number() {
    let temp = TempDir::new().unwrap();
    let roster = create_roster(&temp, "roster.txt", "1, usa, I\n\n3, de\n");

    let err = service().load(&roster).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidRecord { line: 3, .. })
    ));
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn given_roster_file_when_allocating_through_container_then_everyone_is_linked() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let roster = create_roster(
        &temp,
        "roster.txt",
        "1, usa, I\n2, usa, I\n3, ca, I\n4, de, D\n5, de, D\n",
    );
    let container = ServiceContainer::new(Settings::default());

    // Act
    let participants = container.roster_service().load(&roster).unwrap();
    let allocation = container.allocation_service().allocate(participants);

    // Assert
    assert_eq!(allocation.link_count(), 5);
    assert_eq!(allocation.international().len(), 3);
    assert_eq!(allocation.domestic_circle("de").map(|c| c.len()), Some(2));
    assert_eq!(
        allocation.summary(),
        AllocationService::default()
            .allocate(service().load(&roster).unwrap())
            .summary()
    );
}
