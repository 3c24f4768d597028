use crate::common::command::{offline_repository_dir, run_sos_command, sos_stdout};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn commit_without_changes_fails(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();

    run_sos_command(dir, &["commit", "nothing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Nothing to commit"));

    // the failed commit left no revision behind
    let log = sos_stdout(dir, &["log"])?;
    assert!(!log.contains("r01"));

    run_sos_command(dir, &["commit", "--force", "nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created new revision r01 'nothing'"));

    Ok(())
}

#[rstest]
fn commit_tag_must_be_unique(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();

    run_sos_command(dir, &["commit", "--force", "--tag", "v1"])
        .assert()
        .success();
    run_sos_command(dir, &["commit", "--force", "v1"])
        .assert()
        .code(1);
    run_sos_command(dir, &["commit", "--force", "--tag"])
        .assert()
        .code(1);

    run_sos_command(dir, &["ls", "--tags"])
        .assert()
        .success()
        .stdout("v1\n");

    Ok(())
}
