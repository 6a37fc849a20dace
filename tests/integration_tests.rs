//! Integration tests for the starsync CLI
//! These tests run the actual binary and verify its behavior

mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::{mount_listing, write_checkout, MockRepository};
use predicates::prelude::*;
use wiremock::MockServer;

fn starsync() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("starsync"));
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("STARSYNC_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    starsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("star"))
        .stdout(predicate::str::contains("repo"))
        .stdout(predicate::str::contains("org"))
        .stdout(predicate::str::contains("maintenance"))
        .stdout(predicate::str::contains("list-cloned"));
}

#[test]
fn test_cli_version() {
    starsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("starsync"));
}

#[test]
fn test_invalid_command() {
    starsync().arg("invalid-command").assert().failure();
}

#[test]
fn test_star_requires_username() {
    starsync().arg("star").assert().failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_star_dry_run_reports_planned_actions() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "/users/octocat/starred",
        vec![vec![
            MockRepository::new("octocat", "hello").with_stars(80),
            MockRepository::new("someone", "tiny").with_stars(1),
        ]],
    )
    .await;

    let temp = TempDir::new().unwrap();
    write_checkout(
        temp.child("octocat").child("hello").path(),
        "https://github.com/octocat/hello.git",
    );

    starsync()
        .env("STARSYNC_API_URL", server.uri())
        .args(["star", "octocat", "--dry-run", "--yes", "--output-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No authentication token found. Proceeding without authentication.",
        ))
        .stdout(predicate::str::contains(
            "Repositories to process (total 2), sorted alphabetically:",
        ))
        .stdout(predicate::str::contains("  octocat/hello (Stars: 80, Owner: octocat)"))
        .stdout(predicate::str::contains(
            "'--yes' specified; skipping confirmation prompt.",
        ))
        .stdout(predicate::str::contains("Dry-run: Would pull in"))
        .stdout(predicate::str::contains(
            "Dry-run: Would clone https://github.com/someone/tiny.git into",
        ));

    temp.child("someone").assert(predicate::path::missing());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_star_filters_leave_nothing() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "/users/octocat/starred",
        vec![vec![MockRepository::new("octocat", "hello").with_stars(5)]],
    )
    .await;

    starsync()
        .env("STARSYNC_API_URL", server.uri())
        .args(["star", "octocat", "--min-stars", "100", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No repositories match the specified criteria.",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_listing_exits_early() {
    let server = MockServer::start().await;
    mount_listing(&server, "/orgs/empty-org/repos", vec![]).await;

    starsync()
        .env("STARSYNC_API_URL", server.uri())
        .args(["org", "empty-org", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No repositories found or an error occurred.",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_declined_without_terminal() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "/users/octocat/repos",
        vec![vec![MockRepository::new("octocat", "hello")]],
    )
    .await;

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");

    starsync()
        .env("STARSYNC_API_URL", server.uri())
        .args(["repo", "octocat", "--output-dir"])
        .arg(out.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "You are about to process 1 repository(ies) with actual clone/pull.",
        ))
        .stdout(predicate::str::contains("Process canceled."));

    out.assert(predicate::path::missing());
}

#[test]
fn test_list_cloned() {
    let temp = TempDir::new().unwrap();
    temp.child("octocat/hello/README.md").write_str("hi").unwrap();
    temp.child("Rust-Lang/rust/README.md").write_str("hi").unwrap();
    temp.child("stray.txt").write_str("not a checkout").unwrap();

    starsync()
        .args(["list-cloned", "--output-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Repositories to process (total 2), sorted alphabetically:",
        ))
        .stdout(predicate::str::contains("  octocat/hello (Stars: 0, Owner: octocat)"))
        .stdout(predicate::str::contains(
            "  Rust-Lang/rust (Stars: 0, Owner: Rust-Lang)",
        ));
}

#[test]
fn test_list_cloned_missing_directory() {
    let temp = TempDir::new().unwrap();

    starsync()
        .args(["list-cloned", "-o"])
        .arg(temp.child("nowhere").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(total 0)"));
}

#[test]
fn test_move_temp_files_dry_run_then_live() {
    let temp = TempDir::new().unwrap();
    write_checkout(
        temp.child("checkout-1").path(),
        "git@github.com:octocat/hello.git",
    );
    write_checkout(
        temp.child("elsewhere").path(),
        "https://gitlab.com/someone/thing.git",
    );

    starsync()
        .args(["maintenance", "move-temp-files", "--dry-run"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]"))
        .stdout(predicate::str::contains("[SKIP] elsewhere"));

    temp.child("checkout-1").assert(predicate::path::is_dir());
    temp.child("octocat").assert(predicate::path::missing());

    starsync()
        .args(["maintenance", "move-temp-files"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[MOVE]"));

    temp.child("checkout-1").assert(predicate::path::missing());
    temp.child("octocat/hello/.git/config")
        .assert(predicate::str::contains("octocat/hello.git"));
    temp.child("elsewhere").assert(predicate::path::is_dir());
}

#[test]
fn test_move_temp_files_rejects_plain_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("file.txt");
    file.write_str("x").unwrap();

    starsync()
        .args(["maintenance", "move-temp-files"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The specified path is not a directory:",
        ));
}
