use crate::areas::repository::Repository;
use crate::artifacts::branch::{BranchInfo, CommitInfo, format_millis, now_millis};
use crate::artifacts::changes::PathMap;
use crate::artifacts::changes::detector::FindOptions;
use crate::errors::{RepoError, RepoResult};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct BranchOptions {
    /// Branch from the last revision instead of the working tree
    pub last: bool,
    /// Keep working on the current branch
    pub stay: bool,
}

impl Repository {
    pub fn branch(
        &self,
        name: Option<&str>,
        message: Option<&str>,
        options: &BranchOptions,
    ) -> RepoResult<usize> {
        self.require_offline()?;

        if let Some(name) = name
            && self
                .state()
                .branches
                .values()
                .any(|branch| branch.name.as_deref() == Some(name))
        {
            return Err(RepoError::user(format!(
                "Branch '{}' already exists. Cannot proceed",
                name
            )));
        }

        let current = self.current_branch();
        let last = self.last_revision(current)?;
        let number = self
            .state()
            .branches
            .keys()
            .next_back()
            .map_or(0, |number| number + 1);
        tracing::debug!("Branching b{} to b{}", current, number);

        if options.last {
            let message = match message {
                Some(message) => format!("{} (Branched from b{}/r{:02})", message, current, last),
                None => format!("Branched from b{}/r{:02}", current, last),
            };
            self.duplicate_branch(number, name, message)?;
        } else {
            let message = message.map(str::to_string).unwrap_or_else(|| {
                format!("Branched from file tree after b{}/r{:02}", current, last)
            });
            self.create_branch(number, name, message)?;
        }

        if !options.stay {
            self.state_mut().flags.branch = number;
        }
        self.save_state()?;

        let label = match name {
            Some(name) => format!("b{} '{}'", number, name),
            None => format!("unnamed branch b{}", number),
        };
        if options.stay {
            writeln!(self.writer(), "Continue work after branching to {}", label)?;
        } else {
            writeln!(self.writer(), "Switched to new {}", label)?;
        }

        Ok(number)
    }

    /// Create branch `number` with revision 0 holding the working tree, or in
    /// tracking modes the current branch's last revision.
    pub(crate) fn create_branch(
        &self,
        number: usize,
        name: Option<&str>,
        message: String,
    ) -> RepoResult<()> {
        let (simple, current) = {
            let state = self.state();
            let current = state.branches.get(&state.flags.branch).cloned();
            (state.is_simple_mode(), current)
        };

        self.metadata().create_branch_dir(number)?;
        let paths = match &current {
            _ if simple => self.snapshot_tree(number)?,
            Some(current) => {
                let last = self.last_revision(current.number)?;
                let paths = self.path_set(current.number, last)?;
                self.copy_paths((current.number, last), number, &paths)?;
                paths
            }
            None => PathMap::new(),
        };
        self.metadata().save_paths(number, 0, &paths)?;
        self.save_initial_commit(number, message)?;

        let first = current.is_none();
        let mut branch = BranchInfo::new(number, now_millis(), name.map(str::to_string), first);
        if let Some(current) = current
            && self.state().flags.track
        {
            branch.tracked = current.tracked;
            branch.untracked = current.untracked;
        }
        self.state_mut().branches.insert(number, branch);

        Ok(())
    }

    /// Create branch `number` from the current branch's last revision,
    /// copying the blobs of every file into its revision 0
    pub(crate) fn duplicate_branch(
        &self,
        number: usize,
        name: Option<&str>,
        message: String,
    ) -> RepoResult<()> {
        let current = self.branch_info(self.current_branch())?;
        let last = self.last_revision(current.number)?;
        let paths = self.path_set(current.number, last)?;

        self.metadata().create_branch_dir(number)?;
        self.copy_paths((current.number, last), number, &paths)?;
        self.metadata().save_paths(number, 0, &paths)?;
        self.save_initial_commit(number, message)?;

        let mut branch = BranchInfo::new(number, now_millis(), name.map(str::to_string), false);
        branch.tracked = current.tracked;
        branch.untracked = current.untracked;
        self.state_mut().branches.insert(number, branch);

        Ok(())
    }

    fn snapshot_tree(&self, number: usize) -> RepoResult<PathMap> {
        let rules = self.ignore_rules()?;
        let options = FindOptions {
            write_target: Some((number, 0)),
            ..FindOptions::default()
        };

        let (changes, _) = self
            .detector(&rules)
            .find_changes(&PathMap::new(), &options)?;
        for path in changes.additions.keys() {
            writeln!(self.writer(), "ADD {}", path)?;
        }

        Ok(changes.additions)
    }

    fn copy_paths(
        &self,
        source: (usize, usize),
        number: usize,
        paths: &PathMap,
    ) -> RepoResult<()> {
        self.metadata().create_revision_dir(number, 0)?;
        for (path, info) in paths {
            if info.size.unwrap_or_default() == 0 {
                continue;
            }
            tracing::trace!("copying {} into b{}/r0", path, number);
            self.store()
                .copy_versioned(source, (number, 0), &info.name_hash)?;
        }

        Ok(())
    }

    fn save_initial_commit(&self, number: usize, message: String) -> RepoResult<()> {
        let commit = CommitInfo::new(0, now_millis(), Some(message));
        self.metadata()
            .save_commits(number, &BTreeMap::from([(0, commit)]))?;

        Ok(())
    }

    /// Default first commit message of an offline repository
    pub(crate) fn offline_message() -> String {
        format!("Offline repository created on {}", format_millis(now_millis()))
    }
}
