use crate::areas::repository::Repository;
use crate::artifacts::config::patterns::{TrackingPatterns, join_path, normalize_pattern};
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct LsOptions {
    pub recursive: bool,
    /// Only list the current branch's tracking patterns
    pub patterns: bool,
    /// Only list the repository's tags
    pub tags: bool,
}

impl Repository {
    pub fn ls(&self, folder: Option<&str>, options: &LsOptions) -> RepoResult<()> {
        if options.tags {
            self.require_offline()?;
            let tags = self.state().flags.tags.clone();
            for tag in tags {
                writeln!(self.writer(), "{}", tag)?;
            }
            return Ok(());
        }

        let tracked = if self.is_offline() {
            self.require_offline()?;
            self.tracking_patterns(self.current_branch(), false)?
        } else {
            None
        };
        if options.patterns {
            let Some(tracked) = tracked else {
                return Err(RepoError::user("Repository is in simple mode, no patterns to list"));
            };
            for pattern in tracked {
                writeln!(self.writer(), "{}", pattern)?;
            }
            return Ok(());
        }

        let tracked = tracked
            .map(|patterns| TrackingPatterns::try_parse(&patterns))
            .transpose()?;
        let rules = self.ignore_rules()?;
        let folder = normalize_pattern(folder.unwrap_or_default());
        let folder = folder.trim_end_matches('/');

        let mut pending = vec![folder.to_string()];
        while let Some(dir) = pending.pop() {
            let (dirs, files) = self.workspace().list_dir(&dir)?;
            for name in files {
                let marker = if rules.ignores_file(&name) {
                    "IGN"
                } else if tracked
                    .as_ref()
                    .is_some_and(|patterns| patterns.matches_in_dir(&dir, &name))
                {
                    "TRK"
                } else {
                    "   "
                };
                writeln!(self.writer(), "{} {}", marker, join_path(&dir, &name))?;
            }
            if options.recursive {
                pending.extend(
                    dirs.iter()
                        .rev()
                        .filter(|name| !rules.ignores_dir(name))
                        .map(|name| join_path(&dir, name)),
                );
            }
        }

        Ok(())
    }
}
