use crate::common::command::{offline_repository_dir, run_sos_command, sos_stdout};
use crate::common::file::{FileSpec, write_file, write_generated_files};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn hash_file_prints_content_and_name_hashes(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    // sha1("one") and sha1("1.txt")
    run_sos_command(offline_repository_dir.path(), &["hash-file", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{40} [0-9a-f]{40}\n$")?)
        .stdout(predicate::str::starts_with(
            "fe05bcdcdc4928012781a5f1a2a77cbb5398e106 ",
        ));

    Ok(())
}

#[rstest]
fn cat_file_reads_older_revisions(
    offline_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = offline_repository_dir.path();
    let generated = write_generated_files(&dir.join("gen"), 3);
    write_file(FileSpec::new(dir.join("1.txt"), "one, later".to_string()));
    sos_stdout(dir, &["commit", "generated"])?;

    run_sos_command(dir, &["cat-file", "1.txt", "/0"])
        .assert()
        .success()
        .stdout("one");
    run_sos_command(dir, &["cat-file", "1.txt"])
        .assert()
        .success()
        .stdout("one, later");

    for file in generated {
        let name = file.path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        run_sos_command(dir, &["cat-file", &format!("gen/{}", name)])
            .assert()
            .success()
            .stdout(file.content);
    }

    Ok(())
}
