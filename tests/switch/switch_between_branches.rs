use crate::common::command::{offline_repository_dir, run_sos_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn switch_between_branches(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    run_sos_command(dir, &["branch", "feature"]).assert().success();

    write_file(FileSpec::new(dir.join("1.txt"), "one on feature".to_string()));
    write_file(FileSpec::new(dir.join("f.txt"), "feature only".to_string()));
    run_sos_command(dir, &["commit", "feature work"])
        .assert()
        .success();

    run_sos_command(dir, &["switch", "trunk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOD 1.txt"))
        .stdout(predicate::str::contains("DEL f.txt"))
        .stdout(predicate::str::contains("Switched to b0 'trunk' at revision r00"));
    assert_eq!(read_file(&dir.join("1.txt")), "one");
    assert!(!dir.join("f.txt").exists());

    run_sos_command(dir, &["switch", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD f.txt"));
    assert_eq!(read_file(&dir.join("1.txt")), "one on feature");
    assert_eq!(read_file(&dir.join("f.txt")), "feature only");

    Ok(())
}

#[rstest]
fn switch_refuses_uncommitted_changes(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    run_sos_command(dir, &["branch", "--stay", "other"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("1.txt"), "unsaved work".to_string()));

    run_sos_command(dir, &["switch", "other"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("uncommitted changes: 1.txt"));
    assert_eq!(read_file(&dir.join("1.txt")), "unsaved work");

    run_sos_command(dir, &["switch", "--force", "other"])
        .assert()
        .success();
    assert_eq!(read_file(&dir.join("1.txt")), "one");

    Ok(())
}
