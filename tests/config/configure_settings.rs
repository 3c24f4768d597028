use crate::common::command::{
    offline_repository_dir, repository_dir, run_sos_command, sos_stdout,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn global_default_branch_names_first_branch(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one".to_string()));

    run_sos_command(dir, &["config", "set", "defaultbranch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated configuration in"));
    run_sos_command(dir, &["offline"]).assert().success();

    let status = sos_stdout(dir, &["status"])?;
    assert!(status.contains("* b00 'main'"));

    let config = sos_stdout(dir, &["config", "show"])?;
    assert!(
        config
            .lines()
            .any(|line| line.starts_with("defaultbranch") && line.contains("[global]") && line.ends_with("main"))
    );

    Ok(())
}

#[rstest]
fn local_ignores_apply_to_repository(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();

    run_sos_command(dir, &["config", "add", "ignores", "*.tmp", "--local"])
        .assert()
        .success()
        .stdout("Updated repository configuration\n");
    write_file(FileSpec::new(dir.join("scratch.tmp"), "scratch".to_string()));

    run_sos_command(dir, &["changes"])
        .assert()
        .success()
        .stdout("No changes against b0/r00\n");

    Ok(())
}

#[rstest]
fn local_flags_are_refused(offline_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(offline_repository_dir.path(), &["config", "set", "strict", "on", "--local"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be configured locally"));

    Ok(())
}

#[rstest]
fn unknown_key_is_a_user_error(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sos_command(repository_dir.path(), &["config", "set", "colour", "blue"])
        .assert()
        .code(1);

    Ok(())
}
