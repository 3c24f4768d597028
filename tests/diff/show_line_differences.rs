use crate::common::command::{offline_repository_dir, run_sos_command, sos_stdout};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn show_line_differences(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one\ntwo\n".to_string()));

    let stdout = sos_stdout(dir, &["diff"])?;

    assert!(stdout.contains("DIF 1.txt  <"));
    assert!(stdout.contains("+ | 0002 |two|"));
    assert!(!stdout.contains("- |"));

    Ok(())
}

#[rstest]
fn show_binary_files_without_lines(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    std::fs::write(dir.join("1.txt"), [0u8, 159, 146, 150, 0, 1])?;

    run_sos_command(dir, &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BIN 1.txt"));

    Ok(())
}
