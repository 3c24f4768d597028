use crate::areas::repository::Repository;
use crate::artifacts::config::patterns::{TrackingPattern, normalize_pattern};
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

impl Repository {
    /// Add a tracking pattern to the current branch, or an untracking pattern
    /// when `negative` is set
    pub fn add_pattern(&self, pattern: &str, negative: bool, force: bool) -> RepoResult<()> {
        self.require_tracking_mode()?;

        let pattern = TrackingPattern::try_parse(pattern)
            .map_err(|error| RepoError::user(format!("{:#}", error)))?;
        let branch = self.branch_info(self.current_branch())?;
        let patterns = if negative { &branch.untracked } else { &branch.tracked };
        if patterns.iter().any(|known| known == pattern.as_str()) {
            return Err(RepoError::user(format!(
                "Pattern '{}' already {}",
                pattern.as_str(),
                if negative { "untracked" } else { "tracked" }
            )));
        }

        if !force {
            let dir = pattern.dir();
            if !dir.is_empty() && !self.workspace().absolute(dir).is_dir() {
                return Err(RepoError::user(
                    "The pattern folder doesn't exist. Use --force to add the pattern anyway",
                ));
            }
            let (_, files) = self.workspace().list_dir(dir)?;
            if !files.iter().any(|name| pattern.matches_name(name)) {
                return Err(RepoError::user(
                    "Pattern doesn't match any file in the specified folder. Use --force to add it anyway",
                ));
            }
        }

        let source = pattern.as_str().to_string();
        self.update_branch(branch.number, |info| {
            if negative {
                info.untracked.push(source.clone());
            } else {
                info.tracked.push(source.clone());
            }
        })?;
        self.save_state()?;
        writeln!(
            self.writer(),
            "Added {} pattern '{}'",
            if negative { "untracking" } else { "tracking" },
            source
        )?;

        Ok(())
    }

    pub fn remove_pattern(&self, pattern: &str, negative: bool) -> RepoResult<()> {
        self.require_tracking_mode()?;

        let pattern = normalize_pattern(pattern);
        let branch = self.branch_info(self.current_branch())?;
        let patterns = if negative { &branch.untracked } else { &branch.tracked };
        if !patterns.contains(&pattern) {
            return Err(RepoError::user(format!(
                "Pattern '{}' is not {}. Known patterns: {}",
                pattern,
                if negative { "untracked" } else { "tracked" },
                patterns.join(", ")
            )));
        }

        self.update_branch(branch.number, |info| {
            let list = if negative { &mut info.untracked } else { &mut info.tracked };
            list.retain(|known| *known != pattern);
        })?;
        self.save_state()?;
        writeln!(
            self.writer(),
            "Removed {} pattern '{}'",
            if negative { "untracking" } else { "tracking" },
            pattern
        )?;

        Ok(())
    }

    fn require_tracking_mode(&self) -> RepoResult<()> {
        self.require_offline()?;
        if self.state().is_simple_mode() {
            return Err(RepoError::user(
                "Repository is in simple mode. Create offline repositories via 'sos offline --track' or 'sos offline --picky'",
            ));
        }

        Ok(())
    }
}
