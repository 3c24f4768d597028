use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

impl Repository {
    /// Remove a branch. Its folder is moved aside rather than erased.
    pub fn delete(&self, target: &str) -> RepoResult<usize> {
        self.require_offline()?;

        if self.state().branches.len() < 2 {
            return Err(RepoError::user(
                "Cannot remove the only remaining branch. Use 'sos online' to leave offline mode",
            ));
        }
        let branch = {
            let state = self.state();
            Revision::try_parse(target)?.resolve_branch(&state.branches, state.flags.branch)?
        };

        let backup = self.metadata().remove_branch(branch)?;
        tracing::info!("Moved branch folder to {}", backup.display());

        let was_current = self.current_branch() == branch;
        let removed = {
            let mut state = self.state_mut();
            let removed = state.branches.remove(&branch);
            if was_current
                && let Some(fallback) = state.branches.keys().next_back().copied()
            {
                state.flags.branch = fallback;
            }
            removed
        };
        self.save_state()?;

        let name = removed
            .map(|info| info.display_name())
            .unwrap_or_else(|| format!("b{}", branch));
        writeln!(self.writer(), "Branch {} removed", name)?;
        if was_current {
            writeln!(
                self.writer(),
                "Continuing on {}",
                self.branch_info(self.current_branch())?.display_name()
            )?;
        }

        Ok(branch)
    }
}
