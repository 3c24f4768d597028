use crate::areas::repository::{Repository, RepositoryState};
use crate::artifacts::branch::RepoFlags;
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOptions {
    pub track: bool,
    pub picky: bool,
    pub strict: bool,
    pub compress: bool,
    /// Wipe metadata left over from an earlier offline session
    pub force: bool,
}

impl Repository {
    pub fn offline(&self, name: Option<&str>, options: &OfflineOptions) -> RepoResult<()> {
        if self.metadata().path().exists() {
            if !options.force {
                return Err(RepoError::user(
                    "Repository folder is either already offline or older branches and commits were left over.\n\
                     Use 'sos online' to check for out-of-sync branches, or wipe the metadata with 'sos offline --force'",
                ));
            }
            tracing::warn!(
                "Removing leftover metadata folder {}",
                self.metadata().path().display()
            );
            self.metadata().wipe()?;
        }

        *self.state_mut() = RepositoryState::default();
        let config = self.config();
        let picky = options.picky || config.picky;
        self.state_mut().flags = RepoFlags {
            track: !picky && (options.track || config.track),
            picky,
            strict: options.strict || config.strict,
            compress: options.compress || config.compress,
            ..RepoFlags::default()
        };

        let name = name.unwrap_or(config.default_branch.as_str());
        self.create_branch(0, Some(name), Self::offline_message())?;
        self.save_state()?;

        let mode = {
            let state = self.state();
            match (state.flags.track, state.flags.picky) {
                (true, _) => "track",
                (_, true) => "picky",
                _ => "simple",
            }
        };
        writeln!(
            self.writer(),
            "Offline repository prepared in {} mode. Use 'sos online' to finish offline work",
            mode
        )?;

        Ok(())
    }
}
