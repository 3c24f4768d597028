use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// Simple-mode repository holding `1.txt`, `a/2.txt` and `a/b/3.txt` in b0/r0
#[fixture]
pub fn offline_repository_dir(repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_sos_command(repository_dir.path(), &["offline"])
        .assert()
        .success();

    repository_dir
}

/// Track-mode repository with an empty first branch and `*.txt` tracked
#[fixture]
pub fn tracking_repository_dir(repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        repository_dir.path().join("notes.txt"),
        "tracked".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("build.log"),
        "not tracked".to_string(),
    ));

    run_sos_command(repository_dir.path(), &["offline", "--track"])
        .assert()
        .success();
    run_sos_command(repository_dir.path(), &["add", "*.txt"])
        .assert()
        .success();

    repository_dir
}

pub fn run_sos_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("sos").expect("Failed to find sos binary");
    // keep the user's global configuration out of the way
    let global_config = dir
        .canonicalize()
        .unwrap_or_else(|_| dir.to_path_buf())
        .with_extension("json");
    cmd.envs(vec![("NO_PAGER", "1")]);
    cmd.env("SOS_CONFIG", global_config);
    cmd.env_remove("SOS_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Run a command expected to succeed and return its stdout
pub fn sos_stdout(dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_sos_command(dir, args).assert().success();
    let stdout = output.get_output().stdout.clone();

    Ok(String::from_utf8(stdout)?)
}
