use crate::areas::repository::Repository;
use crate::artifacts::branch::{CommitInfo, now_millis};
use crate::artifacts::changes::detector::FindOptions;
use crate::artifacts::changes::{ChangeSet, PathMap};
use crate::commands::porcelain::PathFilters;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Record the message as a tag
    pub tag: bool,
    /// Create the revision even if nothing changed
    pub force: bool,
    pub filters: PathFilters,
}

impl Repository {
    pub fn commit(&self, message: Option<&str>, options: &CommitOptions) -> RepoResult<usize> {
        self.require_offline()?;

        if let Some(message) = message
            && self.state().flags.tags.iter().any(|tag| tag == message)
        {
            return Err(RepoError::user(format!(
                "Cannot commit with a message equal to the existing tag '{}'",
                message
            )));
        }
        if options.tag && message.is_none() {
            return Err(RepoError::user("Tagging a commit requires a message"));
        }

        let branch = self.current_branch();
        let (picky, strict) = {
            let state = self.state();
            (state.flags.picky, state.flags.strict)
        };
        if picky && self.branch_info(branch)?.tracked.is_empty() {
            return Err(RepoError::user(
                "No file patterns staged for commit in picky mode. Use 'sos add' first",
            ));
        }

        let mut commits = self.commits_of(branch)?;
        let last = commits.keys().next_back().copied().unwrap_or_default();
        let revision = last + 1;
        let known = self.path_set(branch, last)?;

        let rules = self.ignore_rules()?;
        let scope = self.scan_scope(&[branch], &options.filters.only, &options.filters.except)?;
        let find_options = FindOptions {
            write_target: Some((branch, revision)),
            check_content: strict,
            ..scope.find_options()
        };
        let (changes, _) = self.detector(&rules).find_changes(&known, &find_options)?;
        if changes.is_empty() && !options.force {
            return Err(RepoError::user("Nothing to commit"));
        }

        self.metadata()
            .save_paths(branch, revision, &Self::commit_delta(&changes))?;
        commits.insert(
            revision,
            CommitInfo::new(revision, now_millis(), message.map(str::to_string)),
        );
        self.metadata().save_commits(branch, &commits)?;

        self.update_branch(branch, |info| {
            info.in_sync = false;
            if picky {
                info.tracked.clear();
            }
        })?;
        if options.tag
            && let Some(message) = message
        {
            self.state_mut().flags.tags.push(message.to_string());
        }
        self.save_state()?;

        writeln!(
            self.writer(),
            "Created new revision r{:02}{} (+{:02}/-{:02}/~{:02}/#{:02})",
            revision,
            message.map(|message| format!(" '{}'", message)).unwrap_or_default(),
            changes.real_additions().count(),
            changes.real_deletions().count(),
            changes.modifications.len(),
            changes.moves.len()
        )?;

        Ok(revision)
    }

    /// Paths stored with a commit: new and changed files, plus tombstones
    fn commit_delta(changes: &ChangeSet) -> PathMap {
        let mut delta = changes.additions.clone();
        delta.extend(
            changes
                .modifications
                .iter()
                .map(|(path, info)| (path.clone(), info.clone())),
        );
        delta.extend(
            changes
                .deletions
                .iter()
                .map(|(path, info)| (path.clone(), info.tombstone())),
        );

        delta
    }
}
