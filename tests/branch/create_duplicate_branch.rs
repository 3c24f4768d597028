use crate::common::command::{offline_repository_dir, run_sos_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn create_duplicate_branch(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["branch", "trunk"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("trunk"));

    Ok(())
}
