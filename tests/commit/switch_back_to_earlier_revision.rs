use crate::common::command::{repository_dir, run_sos_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn switch_back_to_earlier_revision(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    let file = dir.join("a.txt");

    run_sos_command(dir, &["offline"]).assert().success();

    write_file(FileSpec::new(file.clone(), "hello".to_string()));
    run_sos_command(dir, &["commit", "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r01 'first' (+01/-00/~00/#00)"));

    write_file(FileSpec::new(file.clone(), "hello world".to_string()));
    run_sos_command(dir, &["commit", "second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r02 'second' (+00/-00/~01/#00)"));

    run_sos_command(dir, &["switch", "/1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOD a.txt"))
        .stdout(predicate::str::contains("Switched to b0 'trunk' at revision r01"));
    assert_eq!(read_file(&file), "hello");

    // the tree now differs from the branch head
    run_sos_command(dir, &["switch", "/0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("uncommitted changes"));
    assert_eq!(read_file(&file), "hello");

    run_sos_command(dir, &["switch", "/0", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEL a.txt"));
    assert!(!file.exists());

    Ok(())
}

#[rstest]
fn switch_back_to_offline_snapshot(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    let file = dir.join("a");
    write_file(FileSpec::new(file.clone(), "hello".to_string()));

    run_sos_command(dir, &["offline", "trunk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD a"));

    write_file(FileSpec::new(file.clone(), "hello world".to_string()));
    run_sos_command(dir, &["commit", "grow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r01 'grow' (+00/-00/~01/#00)"));

    let revision_one = std::fs::read_to_string(
        dir.join(".sos").join("b0").join("r1").join("metadata.json"),
    )?;
    assert!(revision_one.contains("\"a\""));
    assert!(revision_one.contains("11"));

    run_sos_command(dir, &["cat-file", "a", "/0"])
        .assert()
        .success()
        .stdout("hello");

    run_sos_command(dir, &["switch", "/0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOD a"));
    assert_eq!(read_file(&file), "hello");

    Ok(())
}
