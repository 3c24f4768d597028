use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::changes::ChangeSet;
use crate::artifacts::changes::detector::FindOptions;
use crate::commands::porcelain::PathFilters;
use crate::errors::RepoResult;
use std::io::Write;

impl Repository {
    /// List changes of the working tree against a revision, the current
    /// branch's last one by default
    pub fn changes(
        &self,
        revision: Option<&str>,
        filters: &PathFilters,
    ) -> RepoResult<ChangeSet> {
        self.require_offline()?;

        let (branch, revision) =
            Revision::try_parse(revision.unwrap_or_default())?.resolve(self)?;
        let changes = self.scan_against(branch, revision, filters, false)?;

        if changes.is_empty() {
            writeln!(self.writer(), "No changes against b{}/r{:02}", branch, revision)?;
        }
        for (kind, path, moved_from) in changes.entries() {
            match moved_from {
                Some(old_path) => {
                    writeln!(self.writer(), "{} {}  <-  {}", kind, path, old_path)?
                }
                None => writeln!(self.writer(), "{} {}", kind, path)?,
            }
        }

        Ok(changes)
    }

    /// Changes of the working tree against `branch`/`revision`, scoped by the
    /// patterns of the current branch and `branch`
    pub(crate) fn scan_against(
        &self,
        branch: usize,
        revision: usize,
        filters: &PathFilters,
        inverse: bool,
    ) -> RepoResult<ChangeSet> {
        let known = self.path_set(branch, revision)?;
        let rules = self.ignore_rules()?;
        let mut branches = vec![self.current_branch()];
        if branch != branches[0] {
            branches.push(branch);
        }
        let scope = self.scan_scope(&branches, &filters.only, &filters.except)?;
        let options = FindOptions {
            check_content: self.state().flags.strict,
            inverse,
            ..scope.find_options()
        };

        let (changes, _) = self.detector(&rules).find_changes(&known, &options)?;

        Ok(changes)
    }
}
