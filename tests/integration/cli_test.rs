//! Integration tests for the wikiextract binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{articles, dump, page, read_jsonl, write_archive};

fn wikiextract() -> Command {
    Command::cargo_bin("wikiextract").unwrap()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    wikiextract()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn extract_help_shows_usage() {
    wikiextract()
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<ARCHIVE>"))
        .stdout(predicate::str::contains("--max-articles"))
        .stdout(predicate::str::contains("--exclude-prefix"));
}

#[test]
fn extract_without_archive_is_usage_error() {
    wikiextract()
        .arg("extract")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<ARCHIVE>"));
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn extract_writes_jsonl_and_creates_parent_dir() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(dir.path(), "wiki.xml.bz2", &dump(&articles(5)));
    let output = dir.path().join("data").join("articles.jsonl");

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .args(["--max-articles", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 3 articles"))
        .stdout(predicate::str::contains("stopped at the article limit"));

    let records = read_jsonl(&output);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].0, "Article 1");
    assert!(records[0].1.starts_with("Article 1 is a subject of some note."));
    assert!(!records[0].1.contains("Source"));
}

#[test]
fn extract_applies_flag_overrides() {
    let dir = TempDir::new().unwrap();
    let xml = dump(&[
        page("Help:Editing", 0, "How to edit pages on the wiki."),
        page("Short", 0, "Tiny."),
        page("Kept", 0, "A body that is long enough for the lowered gate."),
    ]);
    let archive = write_archive(dir.path(), "wiki.xml.bz2", &xml);
    let output = dir.path().join("out.jsonl");

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .args(["--min-length", "10", "--max-length", "20"])
        .args(["--exclude-prefix", "Help:"])
        .arg("--stats-json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"accepted\": 1"))
        .stdout(predicate::str::contains("\"excluded_title_prefix\": 1"))
        .stdout(predicate::str::contains("\"too_short\": 1"));

    let records = read_jsonl(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "Kept");
    assert_eq!(records[0].1.chars().count(), 20);
}

#[test]
fn extract_with_thai_preset() {
    let dir = TempDir::new().unwrap();
    let xml = dump(&[
        page("หมวดหมู่:เมือง", 0, "รายชื่อเมืองในประเทศไทย"),
        page("กรุงเทพมหานคร", 0, "'''กรุงเทพมหานคร''' เป็นเมืองหลวง © 2024"),
    ]);
    let archive = write_archive(dir.path(), "thwiki.xml.bz2", &xml);
    let output = dir.path().join("out.jsonl");

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .args(["--preset", "thai", "--min-length", "5"])
        .assert()
        .success();

    let records = read_jsonl(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "กรุงเทพมหานคร");
    assert_eq!(records[0].1, "กรุงเทพมหานคร เป็นเมืองหลวง 2024");
}

#[test]
fn extract_reads_plain_xml() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dump.xml");
    std::fs::write(&input, dump(&articles(2))).unwrap();
    let output = dir.path().join("out.jsonl");

    wikiextract()
        .arg("extract")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(read_jsonl(&output).len(), 2);
}

#[test]
fn extract_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "max_articles = 1\nmin_content_length = 5\n").unwrap();
    let archive = write_archive(dir.path(), "wiki.xml.bz2", &dump(&articles(3)));
    let output = dir.path().join("out.jsonl");

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    assert_eq!(read_jsonl(&output).len(), 1);
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn missing_archive_fails() {
    let dir = TempDir::new().unwrap();
    wikiextract()
        .arg("extract")
        .arg(dir.path().join("nope.xml.bz2"))
        .arg("-o")
        .arg(dir.path().join("out.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dump not found"));
}

#[test]
fn corrupt_archive_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("broken.xml.bz2");
    std::fs::write(&archive, b"BZh9 definitely not bzip2").unwrap();

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(dir.path().join("out.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt archive"));
}

#[test]
fn invalid_settings_are_rejected() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(dir.path(), "wiki.xml.bz2", &dump(&articles(1)));

    wikiextract()
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(dir.path().join("out.jsonl"))
        .args(["--max-articles", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_articles"));
}

// ============================================================================
// Config and Completions
// ============================================================================

#[test]
fn config_show_prints_toml() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "max_articles = 42\n").unwrap();

    wikiextract()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_articles = 42"))
        .stdout(predicate::str::contains("min_content_length = 100"));
}

#[test]
fn config_path_names_config_toml() {
    wikiextract()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn completions_for_bash() {
    wikiextract()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wikiextract"));
}
