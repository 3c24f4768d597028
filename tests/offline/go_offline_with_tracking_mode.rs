use crate::common::command::{repository_dir, sos_stdout};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use rstest::rstest;

#[rstest]
#[case::track("--track", "track")]
#[case::picky("--picky", "picky")]
fn go_offline_with_tracking_mode(
    repository_dir: TempDir,
    #[case] flag: &str,
    #[case] mode: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));

    let stdout = sos_stdout(repository_dir.path(), &["offline", flag, "--strict"])?;

    // tracking modes start with an empty first revision
    assert!(!stdout.contains("ADD 1.txt"));
    assert!(stdout.contains(&format!("prepared in {} mode", mode)));

    let status = sos_stdout(repository_dir.path(), &["status"])?;
    assert!(status.contains(&format!("in {} mode (strict)", mode)));
    assert!(status.contains("Tracked patterns: "));

    Ok(())
}
