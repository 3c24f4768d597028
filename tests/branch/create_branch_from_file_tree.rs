use crate::common::command::{offline_repository_dir, run_sos_command, sos_stdout};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn create_branch_from_file_tree(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, uncommitted".to_string()));

    run_sos_command(dir, &["branch", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to new b1 'feature'"));

    // the uncommitted edit became the new branch's first revision
    run_sos_command(dir, &["changes"])
        .assert()
        .success()
        .stdout("No changes against b1/r00\n");

    let status = sos_stdout(dir, &["status"])?;
    assert!(status.contains("  b00 'trunk'"));
    assert!(status.contains("* b01 'feature'"));

    Ok(())
}

#[rstest]
fn create_branch_from_last_revision_and_stay(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, uncommitted".to_string()));

    run_sos_command(dir, &["branch", "--last", "--stay", "-m", "copy", "backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Continue work after branching to b1 'backup'"));

    // the new branch holds the committed state, not the edit
    run_sos_command(dir, &["changes", "backup/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOD 1.txt"));

    run_sos_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* b00 'trunk'"))
        .stdout(predicate::str::contains("  b01 'backup'").and(predicate::str::contains("dirty")));

    Ok(())
}
