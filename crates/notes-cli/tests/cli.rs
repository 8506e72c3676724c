use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `notes` isolated from the user's config, data and log settings
fn notes(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("notes");
    cmd.env("NOTES_CONFIG", temp.path().join("config.toml"))
        .env("NOTES_DATA_FILE", temp.path().join("notes.json"))
        .env_remove("NOTES_HOST")
        .env_remove("NOTES_PORT")
        .env_remove("NOTES_CORS_ORIGINS")
        .env_remove("NOTES_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn create(temp: &TempDir, title: &str, content: &str) {
    notes(temp)
        .args(["create", title, "-c", content])
        .assert()
        .success();
}

#[test]
fn test_create_and_show() {
    let temp = TempDir::new().unwrap();

    notes(&temp)
        .args(["--json", "create", "First", "-c", "Hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"))
        .stdout(predicate::str::contains("\"title\": \"First\""));

    notes(&temp)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:    First"))
        .stdout(predicate::str::contains("Hello world"));

    assert!(temp.path().join("notes.json").exists());
}

#[test]
fn test_quiet_create_prints_id() {
    let temp = TempDir::new().unwrap();
    create(&temp, "First", "");

    notes(&temp)
        .args(["-q", "create", "Second", "-c", ""])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_create_rejects_empty_title() {
    let temp = TempDir::new().unwrap();

    notes(&temp)
        .args(["create", "", "-c", "body"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create note"));
}

#[test]
fn test_list_pages_newest_first() {
    let temp = TempDir::new().unwrap();
    for title in ["A", "B", "C"] {
        create(&temp, title, "");
    }

    notes(&temp)
        .args(["-q", "list"])
        .assert()
        .success()
        .stdout("3\n2\n1\n");

    notes(&temp)
        .args(["--json", "list", "--page", "2", "--per-page", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 3"))
        .stdout(predicate::str::contains("\"title\": \"A\""))
        .stdout(predicate::str::contains("\"title\": \"C\"").not());
}

#[test]
fn test_list_rejects_bad_paging() {
    let temp = TempDir::new().unwrap();

    notes(&temp).args(["list", "--page", "0"]).assert().failure();
    notes(&temp)
        .args(["list", "--per-page", "101"])
        .assert()
        .failure();
}

#[test]
fn test_edit_changes_only_given_fields() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Old", "Body");

    notes(&temp)
        .args(["--json", "edit", "1", "-T", "New"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"New\""))
        .stdout(predicate::str::contains("\"content\": \"Body\""));

    notes(&temp)
        .args(["edit", "7", "-T", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found: 7"));
}

#[test]
fn test_delete() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Doomed", "");

    notes(&temp)
        .args(["delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted note: 1"));

    notes(&temp)
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found: 1"));

    // Ids are not reused after a delete
    notes(&temp)
        .args(["-q", "create", "Next", "-c", ""])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_search() {
    let temp = TempDir::new().unwrap();
    create(&temp, "first", "Hello world");
    create(&temp, "second", "goodbye");

    notes(&temp)
        .args(["-q", "search", "HELLO"])
        .assert()
        .success()
        .stdout("1\n");

    notes(&temp)
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn test_status_counts_notes() {
    let temp = TempDir::new().unwrap();
    create(&temp, "A", "");
    create(&temp, "B", "");

    notes(&temp)
        .args(["--json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"notes\":2"))
        .stdout(predicate::str::contains("\"next_id\":3"));
}

#[test]
fn test_config_set_and_show() {
    let temp = TempDir::new().unwrap();

    notes(&temp)
        .args(["config", "set", "port", "9090"])
        .assert()
        .success();

    notes(&temp)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\":9090"));

    notes(&temp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
