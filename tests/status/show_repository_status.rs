use crate::common::command::{offline_repository_dir, sos_stdout};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use rstest::rstest;

#[rstest]
fn show_repository_status(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();

    let stdout = sos_stdout(dir, &["status"])?;

    assert!(stdout.contains("in simple mode\n"));
    assert!(stdout.contains("File tree is unchanged vs. b0/r00"));
    assert!(stdout.contains("* b00 'trunk' @"));
    assert!(stdout.contains("(in sync) with 1 commit\n"));
    assert!(!stdout.contains("Tracked patterns"));

    Ok(())
}

#[rstest]
fn show_dirty_branch_and_modified_tree(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, committed".to_string()));
    sos_stdout(dir, &["commit"])?;
    write_file(FileSpec::new(dir.join("z.txt"), "pending".to_string()));

    let stdout = sos_stdout(dir, &["status"])?;

    assert!(stdout.contains("File tree has changes vs. b0/r01 (+01/-00/~00)"));
    assert!(stdout.contains("(dirty) with 2 commits\n"));

    Ok(())
}
