use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::config::patterns::normalize_pattern;
use crate::errors::RepoResult;
use std::io::Write;

impl Repository {
    pub fn hash_file(&self, path: &str) -> RepoResult<(String, String)> {
        let relative = normalize_pattern(path);
        let (hash, _) = self
            .store()
            .hash_file(&self.workspace().absolute(&relative), false, None)?;
        let name_hash = Store::hash_str(&relative);

        writeln!(self.writer(), "{} {}", hash, name_hash)?;

        Ok((hash, name_hash))
    }
}
