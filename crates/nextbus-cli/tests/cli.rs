//! End-to-end tests for the `nextbus` binary. None of these touch the network.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A config file whose cache lives inside the temp dir.
fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let body = serde_json::json!({ "cache": { "dir": dir.path().join("cache") } });
    fs::write(&config, body.to_string()).unwrap();
    (dir, config)
}

fn nextbus(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nextbus").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn write_fake_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut data = b"%PDF-1.4\n".to_vec();
    data.extend(std::iter::repeat_n(b'x', 200));
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn routes_lists_seed_table() {
    let (_dir, config) = setup();
    nextbus(&config)
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Bus Routes:"))
        .stdout(predicate::str::contains("Route SH1"))
        .stdout(predicate::str::contains("Route E411"));
}

#[test]
fn empty_cache_status() {
    let (_dir, config) = setup();
    nextbus(&config)
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached PDFs found."));
}

#[test]
fn import_then_status_lists_route() {
    let (dir, config) = setup();
    let pdf = write_fake_pdf(dir.path(), "d03.pdf");

    nextbus(&config)
        .args(["cache", "import", "d03"])
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Successfully imported PDF timetable for route D03 (209 bytes)",
        ));

    nextbus(&config)
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cached Routes (1):"))
        .stdout(predicate::str::contains("D03: 209 bytes"));
}

#[test]
fn import_rejects_non_pdf() {
    let (dir, config) = setup();
    let html = dir.path().join("page.html");
    fs::write(&html, "<html>not a timetable</html>").unwrap();

    nextbus(&config)
        .args(["cache", "import", "D03"])
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::contains("does not appear to be a valid PDF"));
}

#[test]
fn imported_unknown_route_is_remembered() {
    let (dir, config) = setup();
    let pdf = write_fake_pdf(dir.path(), "x28.pdf");

    nextbus(&config)
        .args(["cache", "import", "X28"])
        .arg(&pdf)
        .assert()
        .success();

    nextbus(&config)
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Route X28"));
}

#[test]
fn next_reports_unreadable_cached_pdf() {
    let (dir, config) = setup();
    let pdf = write_fake_pdf(dir.path(), "D03.pdf");

    nextbus(&config)
        .args(["cache", "import", "D03"])
        .arg(&pdf)
        .assert()
        .success();

    nextbus(&config)
        .args(["next", "D03", "08:00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error:"));
}

#[test]
fn next_unknown_route_lists_alternatives() {
    let (_dir, config) = setup();
    nextbus(&config)
        .args(["next", "ZZ9", "08:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ZZ9"))
        .stdout(predicate::str::contains("SH1"));
}

#[test]
fn clear_single_route() {
    let (dir, config) = setup();
    let pdf = write_fake_pdf(dir.path(), "SH1.pdf");

    nextbus(&config)
        .args(["cache", "import", "SH1"])
        .arg(&pdf)
        .assert()
        .success();

    nextbus(&config)
        .args(["cache", "clear", "SH1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully cleared cache for route SH1"));

    nextbus(&config)
        .args(["cache", "clear", "SH1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached PDF found for route SH1"));
}

#[test]
fn register_persists_route() {
    let (_dir, config) = setup();

    nextbus(&config)
        .args(["register", "x28", "dub:01X28:%20:H:y08", "bus%20X28"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully added route X28"));

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("dub:01X28:%20:H:y08"));

    nextbus(&config)
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Route X28"));
}

#[test]
fn register_rejects_bad_code() {
    let (_dir, config) = setup();
    nextbus(&config)
        .args(["register", "bad code!", "id", "name"])
        .assert()
        .failure();
}

#[test]
fn config_path_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.json");

    nextbus(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_set_then_get() {
    let (_dir, config) = setup();

    nextbus(&config)
        .args(["config", "set", "query.max_results", "3"])
        .assert()
        .success();

    nextbus(&config)
        .args(["config", "get", "query.max_results"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}
