use crate::common::command::{offline_repository_dir, run_sos_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn go_online_from_clean_repository(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();

    run_sos_command(dir, &["online"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exited offline mode"));

    assert!(!dir.join(".sos").exists());
    assert!(dir.join("1.txt").exists());

    Ok(())
}

#[rstest]
fn go_online_with_dirty_branch_needs_force(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, committed".to_string()));
    run_sos_command(dir, &["commit"]).assert().success();

    run_sos_command(dir, &["online"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsynchronized (dirty) branches: b0 'trunk'"));
    assert!(dir.join(".sos").exists());

    run_sos_command(dir, &["online", "--force"])
        .assert()
        .success();
    assert!(!dir.join(".sos").exists());

    Ok(())
}

#[rstest]
fn go_online_with_modified_tree_needs_double_force(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, not committed".to_string()));

    run_sos_command(dir, &["online", "--force"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File tree is modified"));

    run_sos_command(dir, &["online", "--force", "--force"])
        .assert()
        .success();

    Ok(())
}
