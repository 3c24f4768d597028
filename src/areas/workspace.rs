use crate::areas::metadata::METADATA_FOLDER;
use crate::artifacts::config::patterns::{IgnoreRules, SLASH};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// A file seen while walking the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Repository-relative path with `/` separators
    pub path: String,
    pub size: u64,
    pub mtime: i64,
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn absolute(&self, relative: &str) -> PathBuf {
        relative
            .split(SLASH)
            .fold(self.path.to_path_buf(), |path, part| path.join(part))
    }

    /// Walk the tree depth-first in sorted order, skipping ignored folders and
    /// files; `select` decides per folder which of its file names to stat.
    /// Files that vanish or cannot be stat'ed are logged and skipped.
    pub fn walk(
        &self,
        rules: &IgnoreRules,
        mut select: impl FnMut(&str, &str) -> bool,
    ) -> anyhow::Result<Vec<WalkedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                name != METADATA_FOLDER && !rules.ignores_dir(&name)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!("Skipping unreadable entry: {}", error);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if rules.ignores_file(&name) {
                continue;
            }
            let Some(relative) = self.relative(entry.path()) else {
                continue;
            };
            let dir = match relative.rfind(SLASH) {
                Some(index) => &relative[..index],
                None => "",
            };
            if !select(dir, &name) {
                continue;
            }

            match Self::stat_path(entry.path()) {
                Ok((size, mtime)) => files.push(WalkedFile {
                    path: relative,
                    size,
                    mtime,
                }),
                Err(error) => tracing::warn!("Skipping {}: {:#}", relative, error),
            }
        }

        Ok(files)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.path).ok()?;
        let parts = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>();

        Some(parts.join("/"))
    }

    pub fn stat(&self, relative: &str) -> anyhow::Result<(u64, i64)> {
        Self::stat_path(&self.absolute(relative))
    }

    fn stat_path(path: &Path) -> anyhow::Result<(u64, i64)> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Unable to stat {}", path.display()))?;
        let mtime = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as i64)
            .unwrap_or_default();

        Ok((metadata.len(), mtime))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.absolute(relative).is_file()
    }

    pub fn read_file(&self, relative: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.absolute(relative);
        std::fs::read(&path).with_context(|| format!("Unable to read file {}", path.display()))
    }

    pub fn write_file(&self, relative: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.absolute(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Unable to write file {}", path.display()))
    }

    /// Reset a restored file's modification time to the recorded one
    pub fn set_mtime(&self, relative: &str, mtime: i64) -> anyhow::Result<()> {
        let path = self.absolute(relative);
        let time = filetime::FileTime::from_unix_time(
            mtime.div_euclid(1000),
            (mtime.rem_euclid(1000) * 1_000_000) as u32,
        );
        filetime::set_file_mtime(&path, time)
            .with_context(|| format!("Unable to set modification time of {}", path.display()))
    }

    /// Delete a file and any parent folders it leaves empty
    pub fn remove_file(&self, relative: &str) -> anyhow::Result<()> {
        let path = self.absolute(relative);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Unable to remove file {}", path.display()))?;
        }

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() {
                break;
            }
            let is_empty = std::fs::read_dir(dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                break;
            }
            std::fs::remove_dir(dir)
                .with_context(|| format!("Unable to remove directory {}", dir.display()))?;
            parent = dir.parent();
        }

        Ok(())
    }

    /// List the entries of one folder, split into folders and files, sorted
    pub fn list_dir(&self, relative: &str) -> anyhow::Result<(Vec<String>, Vec<String>)> {
        let path = if relative.is_empty() {
            self.path.to_path_buf()
        } else {
            self.absolute(relative)
        };
        if !path.is_dir() {
            anyhow::bail!("The specified path is not a directory: {}", path.display());
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() {
                if name != METADATA_FOLDER {
                    dirs.push(name);
                }
            } else {
                files.push(name);
            }
        }
        dirs.sort();
        files.sort();

        Ok((dirs, files))
    }
}
