use crate::common::command::{run_sos_command, sos_stdout, tracking_repository_dir};
use crate::common::file::read_file;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn switch_tracking_patterns_only(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();
    run_sos_command(dir, &["branch", "--stay", "feature"])
        .assert()
        .success();
    run_sos_command(dir, &["add", "*.log"]).assert().success();

    run_sos_command(dir, &["switch", "feature", "--meta"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Switched to b1 'feature' with tracking patterns only",
        ));

    let stdout = sos_stdout(dir, &["status"])?;
    assert!(stdout.contains("* b01 'feature'"));
    assert!(stdout.contains("Tracked patterns: *.txt\n"));
    assert_eq!(read_file(&dir.join("notes.txt")), "tracked");
    assert!(dir.join("build.log").exists());

    // trunk took over feature's patterns, dropping *.log
    run_sos_command(dir, &["switch", "trunk", "--meta"])
        .assert()
        .success();
    let stdout = sos_stdout(dir, &["status"])?;
    assert!(stdout.contains("* b00 'trunk'"));
    assert!(stdout.contains("Tracked patterns: *.txt\n"));

    Ok(())
}
