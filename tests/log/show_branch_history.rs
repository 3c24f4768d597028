use crate::common::command::{offline_repository_dir, sos_stdout};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use rstest::rstest;

#[rstest]
fn show_branch_history(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one, first edit".to_string()));
    sos_stdout(dir, &["commit", "first"])?;
    write_file(FileSpec::new(
        dir.join("c.txt"),
        "added in the second commit".to_string(),
    ));
    sos_stdout(dir, &["commit", "--tag", "v2"])?;

    let stdout = sos_stdout(dir, &["log"])?;
    let lines = stdout.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "Offline commits of branch b0 'trunk':");
    assert!(lines[1].starts_with("  r00 @"));
    assert!(lines[1].contains("(+03/-00/~00/#00) |Offline repository created on"));
    assert!(lines[2].starts_with("  r01 @"));
    assert!(lines[2].ends_with("(+00/-00/~01/#00) |first|"));
    assert!(lines[3].starts_with("* r02 @"));
    assert!(lines[3].ends_with("(+01/-00/~00/#00) |v2| [tag]"));
    assert_eq!(lines.len(), 4);

    Ok(())
}

#[rstest]
fn show_changed_paths_per_commit(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    std::fs::remove_file(dir.join("1.txt"))?;
    sos_stdout(dir, &["commit", "drop one"])?;

    let stdout = sos_stdout(dir, &["log", "--changes"])?;

    assert!(stdout.contains("    ADD a/b/3.txt\n"));
    assert!(stdout.contains("|drop one|\n    DEL 1.txt\n"));

    Ok(())
}
