use crate::areas::repository::Repository;
use crate::artifacts::branch::format_millis;
use crate::artifacts::changes::sequence::SequentialPathSets;
use crate::artifacts::changes::{ChangeSet, PathMap};
use crate::errors::RepoResult;
use colored::Colorize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// List the changed paths of every commit
    pub changes: bool,
}

impl Repository {
    pub fn log(&self, options: &LogOptions) -> RepoResult<()> {
        self.require_offline()?;

        let branch = self.current_branch();
        let info = self.branch_info(branch)?;
        let commits = self.commits_of(branch)?;
        let last = self.last_revision(branch)?;
        let tags = self.state().flags.tags.clone();

        writeln!(
            self.writer(),
            "{}",
            format!("Offline commits of branch {}:", info.display_name()).bold()
        )?;

        let mut previous = PathMap::new();
        for step in SequentialPathSets::try_new(self.metadata(), branch, last)? {
            let (revision, paths) = step?;
            let changes = diff_path_maps(&previous, &paths);
            let Some(commit) = commits.get(&revision) else {
                previous = paths;
                continue;
            };

            let message = commit.message.as_deref().unwrap_or_default();
            let tag = if tags.iter().any(|tag| tag == message) {
                " [tag]"
            } else {
                ""
            };
            writeln!(
                self.writer(),
                "{} r{:02} @{} (+{:02}/-{:02}/~{:02}/#{:02}) |{}|{}",
                if revision == last { "*" } else { " " },
                revision,
                format_millis(commit.ctime),
                changes.real_additions().count(),
                changes.real_deletions().count(),
                changes.modifications.len(),
                changes.moves.len(),
                message,
                tag
            )?;
            if options.changes {
                for (kind, path, moved_from) in changes.entries() {
                    match moved_from {
                        Some(old_path) => {
                            writeln!(self.writer(), "    {} {}  <-  {}", kind, path, old_path)?
                        }
                        None => writeln!(self.writer(), "    {} {}", kind, path)?,
                    }
                }
            }
            previous = paths;
        }

        Ok(())
    }
}

/// Changes between two replayed path maps
fn diff_path_maps(before: &PathMap, after: &PathMap) -> ChangeSet {
    let mut changes = ChangeSet::default();
    for (path, info) in after {
        match before.get(path) {
            None => {
                changes.additions.insert(path.clone(), info.clone());
            }
            Some(old) if old != info => {
                changes.modifications.insert(path.clone(), info.clone());
            }
            Some(_) => {}
        }
    }
    for (path, info) in before {
        if !after.contains_key(path) {
            changes.deletions.insert(path.clone(), info.clone());
        }
    }
    changes.detect_moves();

    changes
}
