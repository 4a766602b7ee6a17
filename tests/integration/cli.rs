use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with its cache kept in `dir`.
fn updraft(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("updraft").unwrap();
    cmd.env("UPDRAFT_CONFIG_PATH", dir.path().join("config.json"))
        .env_remove("UPDRAFT_SKIP_UPDATE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_subcommand() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .args(["--no-update", "version"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("updraft {}\n", env!("CARGO_PKG_VERSION"))));

    assert!(!dir.path().join("update.json").exists());
}

/// `version` answers before any update check, so an unreachable release
/// server leaves no trace even with checks enabled.
#[test]
fn test_version_skips_startup_update_check() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .env_remove("UPDRAFT_NO_UPDATE")
        .env("HTTPS_PROXY", "http://127.0.0.1:9")
        .env("https_proxy", "http://127.0.0.1:9")
        .env_remove("NO_PROXY")
        .env_remove("no_proxy")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("updraft {}\n", env!("CARGO_PKG_VERSION"))))
        .stderr(predicate::str::contains("Update check failed").not())
        .stderr(predicate::str::is_empty());

    assert!(!dir.path().join("update.json").exists());
}

#[test]
fn test_status_reports_disabled_check() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .args(["status", "--no-update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("update check skipped: disabled"));
}

#[test]
fn test_env_var_disables_update_check() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .env("UPDRAFT_NO_UPDATE", "1")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("update check skipped: disabled"))
        .stderr(predicate::str::contains("Update available").not());
}

#[test]
fn test_skip_marker_from_restart_disables_update_check() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .env("UPDRAFT_SKIP_UPDATE", "1")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("update check skipped: disabled"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .args(["--no-update", "--verbose", "--quiet", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let dir = TempDir::new().unwrap();
    updraft(&dir)
        .arg("--no-update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}
