use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;
use slackdb::{SlackDb, SlackDbError, DEFAULT_LIMIT};
use tempfile::TempDir;

fn write_export(dir: &Path) {
    let channels = json!([
        {
            "id": "C01", "name": "general", "created": 1_500_000_000,
            "is_general": true,
            "topic": { "value": "Company-wide", "creator": "U01", "last_set": 0 },
            "purpose": { "value": "Announcements" }
        },
        { "id": "C02", "name": "old-threads", "created": 1_500_000_100, "is_archived": true },
        { "id": "C03", "name": "thursday-lunch", "created": 1_500_000_200 }
    ]);
    let users = json!([
        {
            "id": "U01", "name": "maria.l", "real_name": "Maria Lopez",
            "profile": { "display_name": "", "email": "maria@example.com" }
        },
        { "id": "U02", "name": "slackbot", "is_bot": true, "profile": { "display_name": "Slackbot" } },
        { "id": "U03", "name": "gone", "real_name": "Maria Gone", "deleted": true }
    ]);

    fs::write(dir.join("channels.json"), channels.to_string()).unwrap();
    fs::write(dir.join("users.json"), users.to_string()).unwrap();
}

#[test]
fn loads_nested_export_fields() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path());

    let db = SlackDb::open(dir.path()).expect("open export");

    let general = db.channel_by_id("C01").expect("general exists");
    assert!(general.is_general);
    assert!(!general.is_archived);
    assert_eq!(general.topic, "Company-wide");
    assert_eq!(general.purpose, "Announcements");

    let archived = db.channel_by_id("C02").unwrap();
    assert!(archived.is_archived);
    assert_eq!(archived.topic, "");

    let maria = db.user_by_id("U01").unwrap();
    assert_eq!(maria.email, "maria@example.com");
    assert_eq!(maria.resolved_name(), "Maria Lopez");
    assert!(db.user_by_id("U02").unwrap().is_bot);
    assert!(db.user_by_id("U03").unwrap().is_deleted);
}

#[test]
fn queries_over_loaded_export() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path());
    let db = SlackDb::open(dir.path()).unwrap();

    let channels: Vec<String> = db.all_channels().into_iter().map(|e| e.name).collect();
    assert_eq!(channels, vec!["general", "thursday-lunch"]);

    let users: Vec<String> = db.all_users().into_iter().map(|e| e.name).collect();
    assert_eq!(users, vec!["Maria Lopez", "Slackbot"]);

    let marias: Vec<&str> = db
        .find_users_like("maria", DEFAULT_LIMIT)
        .into_iter()
        .map(|u| u.id.as_str())
        .collect();
    assert_eq!(marias, vec!["U01"]);

    let th: Vec<&str> = db
        .find_channels_like("TH", DEFAULT_LIMIT)
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(th, vec!["C03"]);
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("channels.json"), "[]").unwrap();

    let err = SlackDb::open(dir.path()).unwrap_err();
    assert!(matches!(err, SlackDbError::Read { .. }));
    assert!(err.to_string().contains("users.json"));
}

#[test]
fn missing_required_field_is_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("channels.json"), r#"[{"id": "C1", "name": "x"}]"#).unwrap();
    fs::write(dir.path().join("users.json"), "[]").unwrap();

    let err = SlackDb::open(dir.path()).unwrap_err();
    assert!(matches!(err, SlackDbError::Parse { .. }));
    assert!(err.to_string().contains("channels.json"));
}

#[test]
fn cli_prints_sections() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path());

    Command::cargo_bin("slackdb")
        .unwrap()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("Channels:"))
        .stdout(contains("C01 general"))
        .stdout(contains("old-threads").not())
        .stdout(contains("One User:"))
        .stdout(contains("\"email\": \"maria@example.com\""))
        .stdout(contains("One Group:"))
        .stdout(contains("Find Users:"))
        .stdout(contains("(ID: U01)"))
        .stdout(contains("thursday-lunch       (ID: C03)"));
}

#[test]
fn cli_fails_without_export() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("slackdb")
        .unwrap()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("channels.json"));
}
