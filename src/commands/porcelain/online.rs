use crate::areas::repository::Repository;
use crate::artifacts::changes::detector::FindOptions;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

impl Repository {
    /// Leave offline mode by removing the metadata folder.
    ///
    /// `force` counts how often `--force` was given: once skips the dirty branch
    /// check, twice also skips the modified tree check.
    pub fn online(&self, force: u8) -> RepoResult<()> {
        self.require_offline()?;

        let dirty = self
            .state()
            .branches
            .values()
            .filter(|branch| !branch.in_sync)
            .map(|branch| branch.display_name())
            .collect::<Vec<_>>();
        if !dirty.is_empty() && force == 0 {
            return Err(RepoError::user(format!(
                "There are still unsynchronized (dirty) branches: {}.\n\
                 Use 'sos log' to list them, and 'sos commit' and 'sos switch' to hand them to your VCS.\n\
                 Use 'sos online --force' to erase all aggregated offline revisions",
                dirty.join(", ")
            )));
        }

        if force < 2 {
            let branch = self.current_branch();
            let known = self.path_set(branch, self.last_revision(branch)?)?;
            let rules = self.ignore_rules()?;
            let scope = self.scan_scope(&[branch], &[], &[])?;
            let options = FindOptions {
                check_content: self.state().flags.strict,
                ..scope.find_options()
            };
            let (changes, _) = self.detector(&rules).find_changes(&known, &options)?;
            if !changes.is_empty() {
                return Err(RepoError::user(
                    "File tree is modified vs. current branch.\n\
                     Use 'sos online --force --force' to continue with removing the offline repository",
                ));
            }
        }

        self.metadata().wipe()?;
        writeln!(
            self.writer(),
            "Exited offline mode. Continue working with your traditional VCS"
        )?;

        Ok(())
    }
}
