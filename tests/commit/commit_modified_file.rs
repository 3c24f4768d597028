use crate::common::command::{offline_repository_dir, run_sos_command};
use crate::common::file::{FileSpec, delete_path, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn commit_modified_file(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one more".to_string()));

    run_sos_command(dir, &["commit", "grow one"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created new revision r01 'grow one' (+00/-00/~01/#00)",
        ));

    Ok(())
}

#[rstest]
fn commit_added_and_deleted_files(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(
        dir.join("c").join("4.txt"),
        "a much longer fourth file".to_string(),
    ));
    delete_path(&dir.join("a").join("b"));

    run_sos_command(dir, &["commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created new revision r01 (+01/-01/~00/#00)",
        ));

    Ok(())
}

#[rstest]
fn commit_only_filtered_paths(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one changed".to_string()));
    write_file(FileSpec::new(dir.join("a").join("2.txt"), "two changed".to_string()));

    run_sos_command(dir, &["commit", "--only", "a/*.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(+00/-00/~01/#00)"));

    // 1.txt is still pending
    run_sos_command(dir, &["changes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOD 1.txt"))
        .stdout(predicate::str::contains("a/2.txt").not());

    Ok(())
}
