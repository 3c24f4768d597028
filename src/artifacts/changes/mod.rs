//! Path state and computed deltas
//!
//! - `detector`: compares the working tree against a known path map
//! - `sequence`: replays a branch's commits into path maps

pub mod detector;
pub mod sequence;

use colored::Colorize;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One file's state at a commit. A `size` of `None` marks a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(from = "PathRecord", into = "PathRecord")]
pub struct PathInfo {
    pub name_hash: String,
    pub size: Option<u64>,
    /// Modification time in milliseconds since the epoch
    pub mtime: i64,
    pub hash: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct PathRecord(String, Option<u64>, i64, Option<String>);

impl From<PathRecord> for PathInfo {
    fn from(PathRecord(name_hash, size, mtime, hash): PathRecord) -> Self {
        PathInfo {
            name_hash,
            size,
            mtime,
            hash,
        }
    }
}

impl From<PathInfo> for PathRecord {
    fn from(info: PathInfo) -> Self {
        PathRecord(info.name_hash, info.size, info.mtime, info.hash)
    }
}

impl PathInfo {
    pub fn is_deleted(&self) -> bool {
        self.size.is_none()
    }

    pub fn tombstone(&self) -> Self {
        PathInfo {
            name_hash: self.name_hash.clone(),
            size: None,
            mtime: self.mtime,
            hash: None,
        }
    }

    /// Identity used for move detection
    fn fingerprint(&self) -> (Option<u64>, i64, Option<&str>) {
        (self.size, self.mtime, self.hash.as_deref())
    }
}

/// Relative path (with `/` separators) to file state, ordered by path
pub type PathMap = BTreeMap<String, PathInfo>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub additions: PathMap,
    pub deletions: PathMap,
    pub modifications: PathMap,
    /// New path to the old path and its state
    pub moves: BTreeMap<String, (String, PathInfo)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty() && self.modifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.additions.len() + self.deletions.len() + self.modifications.len()
    }

    /// Record an addition/deletion pair with an identical fingerprint as a move.
    /// Two unrelated files with coincidentally equal size, mtime and content hash
    /// are reported as a move as well.
    pub fn detect_moves(&mut self) {
        let mut moves = BTreeMap::new();

        for (path, info) in &self.additions {
            let source = self
                .deletions
                .iter()
                .find(|(_, deleted)| deleted.fingerprint() == info.fingerprint());

            if let Some((old_path, deleted)) = source {
                moves.insert(path.clone(), (old_path.clone(), deleted.clone()));
            }
        }

        self.moves = moves;
    }

    /// Additions that are not the target of a move
    pub fn real_additions(&self) -> impl Iterator<Item = (&String, &PathInfo)> {
        self.additions
            .iter()
            .filter(|(path, _)| !self.moves.contains_key(*path))
    }

    /// Deletions that are not the source of a move
    pub fn real_deletions(&self) -> impl Iterator<Item = (&String, &PathInfo)> {
        self.deletions.iter().filter(|(path, _)| {
            !self
                .moves
                .values()
                .any(|(old_path, _)| old_path == *path)
        })
    }

    /// Keep only changes whose path satisfies the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.additions.retain(|path, _| keep(path));
        self.deletions.retain(|path, _| keep(path));
        self.modifications.retain(|path, _| keep(path));
        self.moves.retain(|path, _| keep(path));
    }
}

/// Marker printed in front of a changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Moved,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "ADD",
            ChangeKind::Deleted => "DEL",
            ChangeKind::Modified => "MOD",
            ChangeKind::Moved => "MOV",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Added => self.label().green(),
            ChangeKind::Deleted => self.label().red(),
            ChangeKind::Modified => self.label().yellow(),
            ChangeKind::Moved => self.label().blue(),
        };
        write!(f, "{}", label)
    }
}

impl ChangeSet {
    /// Every change as `(kind, path, moved-from)` in path order, moves folded
    /// into a single entry
    pub fn entries(&self) -> Vec<(ChangeKind, &str, Option<&str>)> {
        let mut entries = self
            .real_additions()
            .map(|(path, _)| (ChangeKind::Added, path.as_str(), None))
            .chain(
                self.real_deletions()
                    .map(|(path, _)| (ChangeKind::Deleted, path.as_str(), None)),
            )
            .chain(
                self.modifications
                    .keys()
                    .map(|path| (ChangeKind::Modified, path.as_str(), None)),
            )
            .chain(self.moves.iter().map(|(path, (old_path, _))| {
                (ChangeKind::Moved, path.as_str(), Some(old_path.as_str()))
            }))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));

        entries
    }
}

/// Compressed against original bytes observed while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct TransferStats {
    pub original: u64,
    pub written: u64,
}

impl TransferStats {
    pub fn record(&mut self, original: u64, written: u64) {
        self.original += original;
        self.written += written;
    }

    /// Space saved by compression in percent, if anything was written
    pub fn compression_advantage(&self) -> Option<f64> {
        (self.written > 0).then(|| self.original as f64 * 100.0 / self.written as f64 - 100.0)
    }
}
