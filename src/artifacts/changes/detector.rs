use crate::areas::store::Store;
use crate::areas::workspace::{WalkedFile, Workspace};
use crate::artifacts::changes::{ChangeSet, PathInfo, PathMap, TransferStats};
use crate::artifacts::config::patterns::{IgnoreRules, TrackingPatterns, split_path};
use crate::errors::RepoError;
use derive_new::new;
use std::cell::Cell;
use std::collections::BTreeSet;

/// Knobs for a single scan of the working tree
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions<'o> {
    /// Store blobs of added and modified files into this `(branch, revision)`
    pub write_target: Option<(usize, usize)>,
    /// Compare content hashes instead of modification times
    pub check_content: bool,
    /// Record the known state instead of the working tree state
    pub inverse: bool,
    /// Only files matching one of these patterns are considered
    pub consider_only: Option<&'o TrackingPatterns>,
    /// Files matching one of these patterns are never considered
    pub dont_consider: Option<&'o TrackingPatterns>,
}

impl FindOptions<'_> {
    fn considers_in_dir(&self, dir: &str, name: &str) -> bool {
        self.consider_only
            .is_none_or(|patterns| patterns.matches_in_dir(dir, name))
            && !self
                .dont_consider
                .is_some_and(|patterns| patterns.matches_in_dir(dir, name))
    }

    fn considers(&self, path: &str) -> bool {
        let (dir, name) = split_path(path);
        self.considers_in_dir(dir, name)
    }
}

/// Compares a known path map against the live working tree
#[derive(new)]
pub struct ChangeDetector<'r> {
    workspace: &'r Workspace,
    store: &'r Store,
    rules: &'r IgnoreRules,
    compress: bool,
}

impl ChangeDetector<'_> {
    pub fn find_changes(
        &self,
        known: &PathMap,
        options: &FindOptions,
    ) -> anyhow::Result<(ChangeSet, TransferStats)> {
        let mut changes = ChangeSet::default();
        let mut stats = TransferStats::default();
        let revision_dir_ready = Cell::new(false);

        let mut unseen = known
            .iter()
            .filter(|(path, info)| !info.is_deleted() && options.considers(path))
            .map(|(path, _)| path.as_str())
            .collect::<BTreeSet<_>>();

        let walked = self
            .workspace
            .walk(self.rules, |dir, name| options.considers_in_dir(dir, name))?;

        for file in walked {
            tracing::trace!("checking {}", file.path);
            unseen.remove(file.path.as_str());

            let Some(last) = known.get(&file.path) else {
                let name_hash = Store::hash_str(&file.path);
                if let Some(info) =
                    self.snapshot(&file, name_hash, options, &revision_dir_ready, &mut stats)?
                {
                    changes.additions.insert(file.path.clone(), info);
                }
                continue;
            };

            if last.is_deleted() {
                if let Some(info) = self.snapshot(
                    &file,
                    last.name_hash.clone(),
                    options,
                    &revision_dir_ready,
                    &mut stats,
                )? {
                    changes.additions.insert(file.path.clone(), info);
                }
                continue;
            }

            if !self.is_modified(&file, last, options.check_content)? {
                continue;
            }

            if options.inverse {
                changes.modifications.insert(file.path.clone(), last.clone());
            } else if let Some(info) = self.snapshot(
                &file,
                last.name_hash.clone(),
                options,
                &revision_dir_ready,
                &mut stats,
            )? {
                changes.modifications.insert(file.path.clone(), info);
            }
        }

        for path in unseen {
            let (_, name) = split_path(path);
            if self.rules.ignores_file(name) {
                continue;
            }
            if let Some(last) = known.get(path) {
                changes.deletions.insert(path.to_string(), last.clone());
            }
        }

        changes.detect_moves();

        tracing::debug!(
            "Finished detecting changes: +{} -{} ~{} moved {}",
            changes.additions.len(),
            changes.deletions.len(),
            changes.modifications.len(),
            changes.moves.len()
        );
        if self.compress
            && options.write_target.is_some()
            && let Some(advantage) = stats.compression_advantage()
        {
            tracing::info!("Compression advantage is {:.1}%", advantage);
        }

        Ok((changes, stats))
    }

    fn is_modified(
        &self,
        file: &WalkedFile,
        last: &PathInfo,
        check_content: bool,
    ) -> anyhow::Result<bool> {
        if Some(file.size) != last.size {
            return Ok(true);
        }
        if !check_content {
            return Ok(file.mtime != last.mtime);
        }
        if file.size == 0 {
            return Ok(false);
        }

        match self
            .store
            .hash_file(&self.workspace.absolute(&file.path), self.compress, None)
        {
            Ok((hash, _)) => Ok(Some(hash) != last.hash),
            Err(error) => {
                tracing::warn!("Unable to hash {}: {:#}", file.path, error);
                Ok(false)
            }
        }
    }

    /// Describe a walked file, hashing it and storing its blob when writing.
    /// Read failures skip the file; integrity errors abort the scan.
    fn snapshot(
        &self,
        file: &WalkedFile,
        name_hash: String,
        options: &FindOptions,
        revision_dir_ready: &Cell<bool>,
        stats: &mut TransferStats,
    ) -> anyhow::Result<Option<PathInfo>> {
        if file.size == 0 {
            return Ok(Some(PathInfo::new(name_hash, Some(0), file.mtime, None)));
        }

        let save_to = match options.write_target {
            Some((branch, revision)) if !options.inverse => {
                if !revision_dir_ready.get() {
                    let dir = self.store.revision_path(branch, revision);
                    std::fs::create_dir_all(&dir)?;
                    revision_dir_ready.set(true);
                }
                Some(self.store.blob_path(branch, revision, &name_hash))
            }
            _ => None,
        };

        let source = self.workspace.absolute(&file.path);
        match self
            .store
            .hash_file(&source, self.compress, save_to.as_deref())
        {
            Ok((hash, written)) => {
                if save_to.is_some() {
                    stats.record(file.size, written);
                }
                Ok(Some(PathInfo::new(
                    name_hash,
                    Some(file.size),
                    file.mtime,
                    Some(hash),
                )))
            }
            Err(error) if error.downcast_ref::<RepoError>().is_some() => Err(error),
            Err(error) => {
                tracing::warn!("Skipping {}: {:#}", file.path, error);
                Ok(None)
            }
        }
    }
}
