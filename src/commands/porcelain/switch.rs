use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::changes::{ChangeKind, ChangeSet, PathInfo, PathMap};
use crate::commands::porcelain::PathFilters;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct SwitchOptions {
    /// Overwrite uncommitted changes
    pub force: bool,
    /// Only take over the target branch's tracking patterns
    pub meta: bool,
    pub filters: PathFilters,
}

impl Repository {
    pub fn switch(&self, target: &str, options: &SwitchOptions) -> RepoResult<(usize, usize)> {
        self.require_offline()?;

        let (branch, revision) = Revision::try_parse(target)?.resolve(self)?;
        let current = self.current_branch();

        if options.meta {
            let target_info = self.branch_info(branch)?;
            let display_name = target_info.display_name();
            self.update_branch(current, |info| {
                info.tracked = target_info.tracked;
                info.untracked = target_info.untracked;
            })?;
            self.state_mut().flags.branch = branch;
            self.save_state()?;
            writeln!(
                self.writer(),
                "Switched to {} with tracking patterns only, file tree kept",
                display_name
            )?;
            return Ok((branch, self.last_revision(branch)?));
        }

        let target_paths = self.path_set(branch, revision)?;
        if !options.force {
            self.refuse_local_changes(&target_paths, &options.filters)?;
        }

        let todo = self.scan_against(branch, revision, &options.filters, true)?;
        self.apply_switch(branch, revision, &todo)?;

        self.state_mut().flags.branch = branch;
        self.save_state()?;
        writeln!(
            self.writer(),
            "Switched to {} at revision r{:02}",
            self.branch_info(branch)?.display_name(),
            revision
        )?;

        Ok((branch, revision))
    }

    /// Fail when the tree holds changes against the current branch that the
    /// switch would lose: modifications, and additions that differ from the
    /// target's file at the same path
    pub(crate) fn refuse_local_changes(
        &self,
        target_paths: &PathMap,
        filters: &PathFilters,
    ) -> RepoResult<()> {
        let current = self.current_branch();
        let local = self.scan_against(current, self.last_revision(current)?, filters, false)?;
        let strict = self.state().flags.strict;

        let same_as_target = |path: &str, info: &PathInfo| match target_paths.get(path) {
            Some(target) if strict => target.size == info.size && target.hash == info.hash,
            Some(target) => target.size == info.size && target.mtime == info.mtime,
            None => false,
        };
        let conflicting = local
            .modifications
            .keys()
            .chain(
                local
                    .additions
                    .iter()
                    .filter(|(path, info)| !same_as_target(path, info))
                    .map(|(path, _)| path),
            )
            .cloned()
            .collect::<Vec<_>>();
        if conflicting.is_empty() {
            return Ok(());
        }

        Err(RepoError::user(format!(
            "File tree contains uncommitted changes: {}.\nUse --force to proceed anyway",
            conflicting.join(", ")
        )))
    }

    /// Make the tree equal to the target: restore what it lacks or changed,
    /// remove what it does not know
    fn apply_switch(
        &self,
        branch: usize,
        revision: usize,
        todo: &ChangeSet,
    ) -> RepoResult<()> {
        for (path, info) in &todo.deletions {
            self.restore_file(branch, revision, path, info)?;
            writeln!(self.writer(), "{} {}", ChangeKind::Added, path)?;
        }
        for path in todo.additions.keys() {
            self.workspace().remove_file(path)?;
            writeln!(self.writer(), "{} {}", ChangeKind::Deleted, path)?;
        }
        for (path, info) in &todo.modifications {
            self.restore_file(branch, revision, path, info)?;
            writeln!(self.writer(), "{} {}", ChangeKind::Modified, path)?;
        }

        Ok(())
    }
}
