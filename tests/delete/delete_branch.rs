use crate::common::command::{offline_repository_dir, run_sos_command, sos_stdout};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn delete_current_branch(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    run_sos_command(dir, &["branch", "feature"]).assert().success();

    run_sos_command(dir, &["delete", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch b1 'feature' removed"))
        .stdout(predicate::str::contains("Continuing on b0 'trunk'"));

    assert!(dir.join(".sos").join("b1.bak").exists());
    assert!(!dir.join(".sos").join("b1").exists());
    let status = sos_stdout(dir, &["status"])?;
    assert!(status.contains("* b00 'trunk'"));
    assert!(!status.contains("feature"));

    Ok(())
}

#[rstest]
fn delete_only_branch_fails(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["delete", "trunk"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("only remaining branch"));

    Ok(())
}
