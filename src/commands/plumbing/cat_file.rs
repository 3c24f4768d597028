use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::config::patterns::normalize_pattern;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

impl Repository {
    /// Print a file as stored in a revision, the current branch's last one by default
    pub fn cat_file(&self, path: &str, revision: Option<&str>) -> RepoResult<()> {
        self.require_offline()?;

        let (branch, revision) =
            Revision::try_parse(revision.unwrap_or_default())?.resolve(self)?;
        let path = normalize_pattern(path);
        let paths = self.path_set(branch, revision)?;
        let info = paths.get(&path).ok_or_else(|| {
            RepoError::user(format!(
                "File '{}' is not versioned in b{}/r{:02}",
                path, branch, revision
            ))
        })?;

        let content = self.read_versioned(branch, revision, info)?.ok_or_else(|| {
            RepoError::integrity(format!("Unable to read the stored content of '{}'", path))
        })?;
        self.writer().write_all(&content)?;

        Ok(())
    }
}
