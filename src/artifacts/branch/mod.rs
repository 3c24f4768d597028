//! Branches, commits and revision addressing
//!
//! Branch and commit records are stored as positional JSON arrays; the
//! `*Record` tuple structs carry that layout through serde.
//!
//! - `revision`: parsing and resolving `branch/revision` strings

pub mod revision;

use derive_new::new;
use serde::{Deserialize, Serialize};

pub const BRANCH_REVISION_REGEX: &str = r"^([^/]*)/(.*)$";
pub const NUMBER_REGEX: &str = r"^-?\d+$";

/// Repository-wide flags, the first element of the repository metadata file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFlags {
    pub track: bool,
    pub picky: bool,
    pub strict: bool,
    pub compress: bool,
    pub branch: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    pub version: String,
}

impl Default for RepoFlags {
    fn default() -> Self {
        RepoFlags {
            track: false,
            picky: false,
            strict: false,
            compress: false,
            branch: 0,
            tags: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(from = "BranchRecord", into = "BranchRecord")]
pub struct BranchInfo {
    pub number: usize,
    /// Creation time in milliseconds since the epoch
    pub ctime: i64,
    pub name: Option<String>,
    /// False once the branch holds commits not yet handed to an upstream VCS
    pub in_sync: bool,
    #[new(default)]
    pub tracked: Vec<String>,
    #[new(default)]
    pub untracked: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct BranchRecord(usize, i64, Option<String>, bool, Vec<String>, Vec<String>);

impl From<BranchRecord> for BranchInfo {
    fn from(record: BranchRecord) -> Self {
        let BranchRecord(number, ctime, name, in_sync, tracked, untracked) = record;
        BranchInfo {
            number,
            ctime,
            name,
            in_sync,
            tracked,
            untracked,
        }
    }
}

impl From<BranchInfo> for BranchRecord {
    fn from(info: BranchInfo) -> Self {
        BranchRecord(
            info.number,
            info.ctime,
            info.name,
            info.in_sync,
            info.tracked,
            info.untracked,
        )
    }
}

impl BranchInfo {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("b{} '{}'", self.number, name),
            None => format!("b{}", self.number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(from = "CommitRecord", into = "CommitRecord")]
pub struct CommitInfo {
    pub number: usize,
    /// Commit time in milliseconds since the epoch
    pub ctime: i64,
    pub message: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct CommitRecord(usize, i64, Option<String>);

impl From<CommitRecord> for CommitInfo {
    fn from(CommitRecord(number, ctime, message): CommitRecord) -> Self {
        CommitInfo {
            number,
            ctime,
            message,
        }
    }
}

impl From<CommitInfo> for CommitRecord {
    fn from(info: CommitInfo) -> Self {
        CommitRecord(info.number, info.ctime, info.message)
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|time| {
            time.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
