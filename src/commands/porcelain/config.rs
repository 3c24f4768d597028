use crate::areas::repository::Repository;
use crate::artifacts::config::{CONFIG_KEYS, ConfigKey, ConfigLayer};
use crate::errors::{RepoError, RepoResult};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
    Unset { key: String },
    Add { key: String, value: String },
    Remove { key: String, value: String },
}

impl Repository {
    /// Read or edit the user-global configuration, or the repository's own
    /// layer when `local` is set
    pub fn configure(&self, action: &ConfigAction, local: bool) -> RepoResult<()> {
        if local {
            self.require_offline()?;
        }
        let key = match action {
            ConfigAction::Show => return self.show_config(),
            ConfigAction::Set { key, .. }
            | ConfigAction::Unset { key }
            | ConfigAction::Add { key, .. }
            | ConfigAction::Remove { key, .. } => ConfigKey::try_parse(key)?,
        };

        let mut layer = if local {
            self.state().local_config.clone()
        } else {
            self.global_config().clone()
        };
        let resolved = self.config();

        if local && key.is_flag() {
            return Err(RepoError::user(
                "Repository flags are fixed when going offline and cannot be configured locally",
            ));
        }

        let fallback = match resolved.describe(key) {
            value if key.is_list() && !value.is_empty() => {
                value.split(';').map(str::to_string).collect::<Vec<_>>()
            }
            _ => Vec::new(),
        };
        match action {
            ConfigAction::Set { value, .. } => layer.set(key, value)?,
            ConfigAction::Unset { .. } => layer.unset(key)?,
            ConfigAction::Add { value, .. } => layer.add(key, value, &fallback)?,
            ConfigAction::Remove { value, .. } => layer.remove(key, value, &fallback)?,
            ConfigAction::Show => {}
        }

        if local {
            self.state_mut().local_config = layer;
            self.save_state()?;
            writeln!(self.writer(), "Updated repository configuration")?;
        } else {
            let path = layer.save_global()?;
            writeln!(self.writer(), "Updated configuration in {}", path.display())?;
        }

        Ok(())
    }

    fn show_config(&self) -> RepoResult<()> {
        let resolved = self.config();
        let local = self.state().local_config.clone();
        let global: &ConfigLayer = self.global_config();

        let mut keys = CONFIG_KEYS.entries().collect::<Vec<_>>();
        keys.sort_by_key(|(name, _)| **name);
        for (name, key) in keys {
            let source = if local.is_set(*key) {
                "local"
            } else if global.is_set(*key) {
                "global"
            } else {
                "default"
            };
            writeln!(
                self.writer(),
                "{:<20} {:<8} {}",
                name,
                format!("[{}]", source),
                resolved.describe(*key)
            )?;
        }

        Ok(())
    }
}
