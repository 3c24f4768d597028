use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::changes::PathInfo;
use crate::artifacts::config::patterns::{IgnoreRules, split_path};
use crate::artifacts::merge::engine::merge;
use crate::artifacts::merge::{FileChoice, MergeDecider, MergeOperation, MergeOptions};
use crate::commands::porcelain::PathFilters;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Whether files only the target has are added and files only the tree
    /// has are removed; `ASK` hands modified files to the decider
    pub file_operation: MergeOperation,
    pub merge: MergeOptions,
    /// Proceed with uncommitted changes in the tree
    pub force: bool,
    pub filters: PathFilters,
}

impl Repository {
    /// Merge a branch or revision into the working tree without committing
    pub fn update(
        &self,
        target: &str,
        options: &UpdateOptions,
        decider: &mut dyn MergeDecider,
    ) -> RepoResult<(usize, usize)> {
        self.require_offline()?;

        let (branch, revision) = Revision::try_parse(target)?.resolve(self)?;
        let current = self.current_branch();
        if !options.force {
            let local =
                self.scan_against(current, self.last_revision(current)?, &options.filters, false)?;
            if !local.is_empty() {
                return Err(RepoError::user(format!(
                    "File tree contains {} uncommitted change(s). Commit first or use --force",
                    local.len()
                )));
            }
        }

        let todo = self.scan_against(branch, revision, &options.filters, true)?;
        let rules = self.ignore_rules()?;
        let file_operation = options.file_operation;

        for (path, info) in &todo.deletions {
            if file_operation.contains(MergeOperation::INSERT) {
                self.restore_file(branch, revision, path, info)?;
                writeln!(self.writer(), "ADD {}", path)?;
            } else {
                writeln!(self.writer(), "(A) {}", path)?;
            }
        }
        for path in todo.additions.keys() {
            if file_operation.contains(MergeOperation::REMOVE) {
                self.workspace().remove_file(path)?;
                writeln!(self.writer(), "DEL {}", path)?;
            } else {
                writeln!(self.writer(), "(D) {}", path)?;
            }
        }
        for (path, info) in &todo.modifications {
            self.update_file((branch, revision), path, info, &rules, options, decider)?;
        }

        let target_info = self.branch_info(branch)?;
        if self.state().flags.track {
            self.update_branch(current, |info| {
                for pattern in &target_info.tracked {
                    if !info.tracked.contains(pattern) {
                        info.tracked.push(pattern.clone());
                    }
                }
            })?;
            self.save_state()?;
        }
        writeln!(
            self.writer(),
            "Integrated changes from {} at revision r{:02}",
            target_info.display_name(),
            revision
        )?;

        Ok((branch, revision))
    }

    fn update_file(
        &self,
        (branch, revision): (usize, usize),
        path: &str,
        info: &PathInfo,
        rules: &IgnoreRules,
        options: &UpdateOptions,
        decider: &mut dyn MergeDecider,
    ) -> RepoResult<()> {
        let Some(theirs) = self.read_versioned(branch, revision, info)? else {
            writeln!(self.writer(), "(M) {} (content unavailable)", path)?;
            return Ok(());
        };
        let mine = self.workspace().read_file(path)?;
        let (_, name) = split_path(path);
        let binary = !rules.is_text(name, &mine) || !rules.is_text(name, &theirs);

        let choice = if options.file_operation == MergeOperation::ASK || binary {
            decider.resolve_file(path, binary)
        } else {
            FileChoice::Merge
        };

        match choice {
            FileChoice::Mine => writeln!(self.writer(), "MNE {}", path)?,
            FileChoice::Theirs => {
                self.restore_file(branch, revision, path, info)?;
                writeln!(self.writer(), "THR {}", path)?;
            }
            FileChoice::Merge if binary => {
                tracing::warn!("Cannot merge binary file {}, keeping mine", path);
                writeln!(self.writer(), "MNE {}", path)?;
            }
            FileChoice::Merge => {
                let merged = merge(&mine, &theirs, &options.merge, decider);
                self.workspace().write_file(path, &merged)?;
                writeln!(self.writer(), "MRG {}", path)?;
            }
        }

        Ok(())
    }
}
