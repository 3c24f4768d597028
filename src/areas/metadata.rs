//! Persistent repository metadata
//!
//! ## File layout
//!
//! ```text
//! .sos/metadata.json            [flags, [branch, ...], local config]
//! .sos/b<N>/metadata.json       [[number, ctime, message], ...]
//! .sos/b<N>/r<M>/metadata.json  {path: [nameHash, size, mtime, hash]}
//! ```
//!
//! Every write copies the previous version to a `.bak` sibling first and holds
//! an exclusive lock on the file while writing.

use crate::areas::store::METADATA_FILE;
use crate::artifacts::branch::{BranchInfo, CommitInfo, RepoFlags};
use crate::artifacts::changes::PathMap;
use crate::artifacts::config::ConfigLayer;
use crate::errors::RepoError;
use anyhow::Context;
use file_guard::Lock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

pub const METADATA_FOLDER: &str = ".sos";
pub const BACKUP_SUFFIX: &str = ".bak";

/// Contents of the repository metadata file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord(pub RepoFlags, pub Vec<BranchInfo>, pub ConfigLayer);

#[derive(Debug)]
pub struct Metadata {
    path: Box<Path>,
}

impl Metadata {
    pub fn new(path: Box<Path>) -> Self {
        Metadata { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.join(METADATA_FILE).exists()
    }

    /// Load the repository record, falling back to the default state when the
    /// file is missing or malformed
    pub fn load_repository(&self) -> RepositoryRecord {
        let path = self.path.join(METADATA_FILE);
        if !path.exists() {
            return RepositoryRecord::default();
        }

        match read_json::<RepositoryRecord>(&path) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!("{:#}; continuing with an empty repository state", error);
                RepositoryRecord::default()
            }
        }
    }

    pub fn save_repository(&self, record: &RepositoryRecord) -> anyhow::Result<()> {
        write_json(&self.path.join(METADATA_FILE), record)
    }

    /// Commits of a branch keyed by number. A malformed commit log is fatal.
    pub fn load_commits(&self, branch: usize) -> anyhow::Result<BTreeMap<usize, CommitInfo>> {
        let path = self.branch_path(branch).join(METADATA_FILE);
        let commits = read_json::<Vec<CommitInfo>>(&path).map_err(|error| {
            RepoError::integrity(format!("Unable to load commits of branch b{}: {:#}", branch, error))
        })?;

        Ok(commits
            .into_iter()
            .map(|commit| (commit.number, commit))
            .collect())
    }

    pub fn save_commits(
        &self,
        branch: usize,
        commits: &BTreeMap<usize, CommitInfo>,
    ) -> anyhow::Result<()> {
        let commits = commits.values().collect::<Vec<_>>();
        write_json(&self.branch_path(branch).join(METADATA_FILE), &commits)
    }

    /// Path map stored with a single revision. A malformed map is fatal.
    pub fn load_paths(&self, branch: usize, revision: usize) -> anyhow::Result<PathMap> {
        let path = self.revision_path(branch, revision).join(METADATA_FILE);
        read_json::<PathMap>(&path)
            .map_err(|error| {
                RepoError::integrity(format!(
                    "Unable to load revision b{}/r{}: {:#}",
                    branch, revision, error
                ))
            })
            .map_err(Into::into)
    }

    pub fn save_paths(&self, branch: usize, revision: usize, paths: &PathMap) -> anyhow::Result<()> {
        write_json(&self.revision_path(branch, revision).join(METADATA_FILE), paths)
    }

    pub fn branch_path(&self, branch: usize) -> PathBuf {
        self.path.join(format!("b{}", branch))
    }

    pub fn revision_path(&self, branch: usize, revision: usize) -> PathBuf {
        self.branch_path(branch).join(format!("r{}", revision))
    }

    pub fn create_revision_dir(&self, branch: usize, revision: usize) -> anyhow::Result<PathBuf> {
        let path = self.revision_path(branch, revision);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Unable to create revision folder {}", path.display()))?;

        Ok(path)
    }

    /// Create the folder of a new branch; an existing folder is an integrity error
    pub fn create_branch_dir(&self, branch: usize) -> anyhow::Result<PathBuf> {
        let path = self.branch_path(branch);
        if path.exists() {
            return Err(RepoError::integrity(format!(
                "Branch folder {} already exists",
                path.display()
            ))
            .into());
        }
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Unable to create branch folder {}", path.display()))?;

        Ok(path)
    }

    /// Move a branch folder aside so it can be recovered by hand
    pub fn remove_branch(&self, branch: usize) -> anyhow::Result<PathBuf> {
        let source = self.branch_path(branch);
        let mut target = self.path.join(format!("b{}{}", branch, BACKUP_SUFFIX));
        if target.exists() {
            target = self.path.join(format!(
                "b{}{}-{}",
                branch,
                BACKUP_SUFFIX,
                chrono::Utc::now().timestamp_millis()
            ));
        }
        std::fs::rename(&source, &target).with_context(|| {
            format!(
                "Unable to move branch folder {} to {}",
                source.display(),
                target.display()
            )
        })?;

        Ok(target)
    }

    /// Remove the whole metadata folder
    pub fn wipe(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_dir_all(&self.path)
                .with_context(|| format!("Unable to remove {}", self.path.display()))?;
        }

        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read metadata file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Malformed metadata file {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create folder {}", parent.display()))?;
    }

    if path.exists() {
        let mut backup = path.as_os_str().to_owned();
        backup.push(BACKUP_SUFFIX);
        std::fs::copy(path, &backup)
            .with_context(|| format!("Unable to back up metadata file {}", path.display()))?;
    }

    let content = serde_json::to_vec(value)
        .with_context(|| format!("Unable to serialize metadata for {}", path.display()))?;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Unable to open metadata file {}", path.display()))?;
    let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;

    lock.deref_mut()
        .write_all(&content)
        .with_context(|| format!("Unable to write metadata file {}", path.display()))?;

    Ok(())
}
