use crate::common::command::{repository_dir, run_sos_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn go_offline_in_simple_mode(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));

    run_sos_command(repository_dir.path(), &["offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD 1.txt"))
        .stdout(predicate::str::contains("ADD a/2.txt"))
        .stdout(predicate::str::contains(
            "Offline repository prepared in simple mode",
        ));

    assert!(repository_dir.path().join(".sos").join("metadata.json").exists());
    assert!(
        repository_dir
            .path()
            .join(".sos")
            .join("b0")
            .join("metadata.json")
            .exists()
    );

    Ok(())
}
