use crate::common::command::{repository_dir, run_sos_command, sos_stdout, tracking_repository_dir};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::{fixture, rstest};

const TWO_LINES: &str = "line one\nline two\n";
const THREE_LINES: &str = "line one\nline two\nline three\n";

/// `trunk` holds two lines in `a.txt`, `feature` adds a third one and `b.txt`;
/// the tree is back on `trunk`
#[fixture]
fn diverged_repository_dir(repository_dir: TempDir) -> TempDir {
    let dir = repository_dir.path();
    write_file(FileSpec::new(dir.join("a.txt"), TWO_LINES.to_string()));
    run_sos_command(dir, &["offline"]).assert().success();
    run_sos_command(dir, &["branch", "feature"]).assert().success();

    write_file(FileSpec::new(dir.join("a.txt"), THREE_LINES.to_string()));
    write_file(FileSpec::new(dir.join("b.txt"), "only on feature".to_string()));
    run_sos_command(dir, &["commit", "third line"])
        .assert()
        .success();
    run_sos_command(dir, &["switch", "trunk"]).assert().success();

    repository_dir
}

#[rstest]
fn update_merges_lines_and_adds_files(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();

    run_sos_command(dir, &["update", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD b.txt"))
        .stdout(predicate::str::contains("MRG a.txt"))
        .stdout(predicate::str::contains(
            "Integrated changes from b1 'feature' at revision r01",
        ));

    assert_eq!(read_file(&dir.join("a.txt")), THREE_LINES);
    assert_eq!(read_file(&dir.join("b.txt")), "only on feature");

    Ok(())
}

#[rstest]
fn update_with_remove_only_policies_skips_insertions(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();

    run_sos_command(dir, &["update", "feature", "--rm", "--rm-lines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(A) b.txt"));

    assert_eq!(read_file(&dir.join("a.txt")), TWO_LINES);
    assert!(!dir.join("b.txt").exists());

    Ok(())
}

#[rstest]
#[case::theirs("t\n", "THR a.txt", THREE_LINES)]
#[case::mine("m\n", "MNE a.txt", TWO_LINES)]
#[case::end_of_input("", "MNE a.txt", TWO_LINES)]
fn update_asks_per_file(
    diverged_repository_dir: TempDir,
    #[case] answer: &str,
    #[case] expected_line: &str,
    #[case] expected_content: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();

    run_sos_command(dir, &["update", "feature", "--ask"])
        .write_stdin(answer)
        .assert()
        .success()
        .stdout(predicate::str::contains(expected_line));

    assert_eq!(read_file(&dir.join("a.txt")), expected_content);

    Ok(())
}

#[rstest]
fn update_refuses_uncommitted_changes(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    write_file(FileSpec::new(dir.join("a.txt"), "local edit".to_string()));

    run_sos_command(dir, &["update", "feature"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("uncommitted change"));

    Ok(())
}

#[rstest]
fn update_in_tracking_mode_joins_tracked_patterns(
    tracking_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tracking_repository_dir.path();
    run_sos_command(dir, &["branch", "feature"]).assert().success();
    run_sos_command(dir, &["add", "*.log"]).assert().success();
    run_sos_command(dir, &["switch", "trunk", "--force"])
        .assert()
        .success();

    run_sos_command(dir, &["update", "feature", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Integrated changes from b1 'feature'"));

    let stdout = sos_stdout(dir, &["status"])?;
    assert!(stdout.contains("* b00 'trunk'"));
    assert!(stdout.contains("Tracked patterns: *.txt, *.log\n"));

    Ok(())
}
