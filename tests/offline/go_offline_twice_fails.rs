use crate::common::command::{offline_repository_dir, run_sos_command};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn go_offline_twice_fails(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["offline"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already offline"));

    Ok(())
}

#[rstest]
fn go_offline_again_with_force_wipes_metadata(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["commit", "--force", "kept?"])
        .assert()
        .success();

    run_sos_command(offline_repository_dir.path(), &["offline", "--force", "fresh"])
        .assert()
        .success();

    run_sos_command(offline_repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b0 'fresh'"))
        .stdout(predicate::str::contains("kept?").not());

    Ok(())
}
