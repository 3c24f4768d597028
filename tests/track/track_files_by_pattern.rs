use crate::common::command::{
    offline_repository_dir, run_sos_command, sos_stdout, tracking_repository_dir,
};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn commit_only_tracked_files(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();

    run_sos_command(dir, &["commit", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(+01/-00/~00/#00)"));

    run_sos_command(dir, &["cat-file", "notes.txt"])
        .assert()
        .success()
        .stdout("tracked");
    run_sos_command(dir, &["cat-file", "build.log"])
        .assert()
        .code(1);

    Ok(())
}

#[rstest]
fn list_files_with_tracking_markers(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();

    let stdout = sos_stdout(dir, &["ls"])?;
    assert!(stdout.contains("TRK notes.txt\n"));
    assert!(stdout.contains("    build.log\n"));

    run_sos_command(dir, &["ls", "--patterns"])
        .assert()
        .success()
        .stdout("*.txt\n");

    Ok(())
}

#[rstest]
fn add_pattern_matching_nothing_needs_force(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();

    run_sos_command(dir, &["add", "*.rs"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));
    run_sos_command(dir, &["add", "--force", "*.rs"])
        .assert()
        .success()
        .stdout("Added tracking pattern '*.rs'\n");
    run_sos_command(dir, &["add", "*.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already tracked"));

    Ok(())
}

#[rstest]
fn untrack_and_remove_patterns(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();

    run_sos_command(dir, &["add", "--untrack", "notes.txt"])
        .assert()
        .success();
    run_sos_command(dir, &["commit", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(+00/-00/~00/#00)"));

    run_sos_command(dir, &["rm", "--untrack", "notes.txt"])
        .assert()
        .success()
        .stdout("Removed untracking pattern 'notes.txt'\n");
    run_sos_command(dir, &["rm", "*.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not tracked"));

    Ok(())
}

#[rstest]
fn patterns_need_tracking_mode(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["add", "*.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("simple mode"));

    Ok(())
}
