//! Integration tests for the Shelf CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// A command pointed at `dir` as `user`, isolated from the caller's env
fn shelf(dir: &TempDir, user: &str) -> Command {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env_remove("SHELF_USER")
        .env_remove("SHELF_DATA_DIR")
        .args(["--data-dir", dir.path().to_str().unwrap(), "--user", user]);
    cmd
}

fn add_book(dir: &TempDir, user: &str, id: &str, title: &str) {
    shelf(dir, user)
        .args([
            "add",
            "--id",
            id,
            "--title",
            title,
            "--author",
            "Anon",
            "--year",
            "1999",
            "--cover",
            "file:///cover.jpg",
            "--summary",
            "Short summary.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("with id {}", id)));
}

fn list_json(dir: &TempDir, user: &str, command: &str) -> Vec<Value> {
    let output = shelf(dir, user)
        .args([command, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    value.as_array().unwrap().clone()
}

fn ids(books: &[Value]) -> Vec<&str> {
    books.iter().map(|b| b["id"].as_str().unwrap()).collect()
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelf"));
}

#[test]
fn test_add_help() {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Add a book"))
        .stdout(predicate::str::contains("--title"))
        .stdout(predicate::str::contains("--cover"));
}

#[test]
fn test_missing_user_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env_remove("SHELF_USER")
        .args(["--data-dir", temp_dir.path().to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active user"));
}

#[test]
fn test_blank_user_fails() {
    let temp_dir = TempDir::new().unwrap();
    shelf(&temp_dir, "  ")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active user"));
}

#[test]
fn test_user_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "env@example.com", "1", "From Env");

    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env("SHELF_USER", "env@example.com")
        .env("SHELF_DATA_DIR", temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("From Env"));
}

#[test]
fn test_empty_library() {
    let temp_dir = TempDir::new().unwrap();
    shelf(&temp_dir, "u1")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No books in library"));

    assert!(list_json(&temp_dir, "u1", "list").is_empty());
    assert!(list_json(&temp_dir, "u1", "favorites").is_empty());
}

#[test]
fn test_library_is_newest_first_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "u1", "1", "First");
    add_book(&temp_dir, "u1", "2", "Second");

    let books = list_json(&temp_dir, "u1", "list");
    assert_eq!(ids(&books), vec!["2", "1"]);
    assert_eq!(books[1]["title"], "First");
    assert_eq!(books[1]["author"], "Anon");
    assert_eq!(books[1]["year"], "1999");
    assert_eq!(books[1]["cover"], "file:///cover.jpg");
    assert_eq!(books[1]["summary"], "Short summary.");
}

#[test]
fn test_add_uses_draft_defaults() {
    let temp_dir = TempDir::new().unwrap();
    shelf(&temp_dir, "u1")
        .args(["add", "--cover", "file:///c.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added \"Untitled\""));

    let books = list_json(&temp_dir, "u1", "list");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["author"], "Unknown");
    assert!(books[0]["id"]
        .as_str()
        .unwrap()
        .chars()
        .all(|c| c.is_ascii_digit()));
}

#[test]
fn test_favorite_toggle() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "u1", "1", "Gatsby");

    shelf(&temp_dir, "u1")
        .args(["favorite", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added to favorites: Gatsby"));
    assert_eq!(ids(&list_json(&temp_dir, "u1", "favorites")), vec!["1"]);

    shelf(&temp_dir, "u1")
        .args(["favorite", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed from favorites: Gatsby"));
    assert!(list_json(&temp_dir, "u1", "favorites").is_empty());
}

#[test]
fn test_favorite_unknown_book_fails() {
    let temp_dir = TempDir::new().unwrap();
    shelf(&temp_dir, "u1")
        .args(["favorite", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No book with id missing"));
}

#[test]
fn test_remove_cascades_to_favorites() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "u1", "1", "Gone");
    add_book(&temp_dir, "u1", "2", "Kept");
    shelf(&temp_dir, "u1")
        .args(["favorite", "1"])
        .assert()
        .success();

    shelf(&temp_dir, "u1")
        .args(["remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1"));

    assert_eq!(ids(&list_json(&temp_dir, "u1", "list")), vec!["2"]);
    assert!(list_json(&temp_dir, "u1", "favorites").is_empty());

    shelf(&temp_dir, "u1")
        .args(["remove", "1"])
        .assert()
        .failure();
}

#[test]
fn test_users_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "alice@example.com", "1", "Alice's Book");

    assert!(list_json(&temp_dir, "bob@example.com", "list").is_empty());
    assert_eq!(
        ids(&list_json(&temp_dir, "alice@example.com", "list")),
        vec!["1"]
    );
}

#[test]
fn test_corrupt_data_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    add_book(&temp_dir, "u1", "1", "Soon Corrupt");

    // Every stored record becomes garbage
    for entry in std::fs::read_dir(temp_dir.path()).unwrap() {
        std::fs::write(entry.unwrap().path(), "{{{").unwrap();
    }

    assert!(list_json(&temp_dir, "u1", "list").is_empty());
    add_book(&temp_dir, "u1", "2", "Fresh");
    assert_eq!(ids(&list_json(&temp_dir, "u1", "list")), vec!["2"]);
}
