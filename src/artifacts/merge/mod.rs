//! Two-way text merging
//!
//! Mine and theirs are aligned with a Myers diff and grouped into blocks. Each
//! non-trivial block is resolved by a [`MergeOperation`] policy, or handed to a
//! [`MergeDecider`] when the policy is `ASK`. Single-line replacements can be
//! merged a second time at character granularity with an independent policy.
//!
//! - `diff`: Myers' shortest edit script
//! - `eol`: line ending detection
//! - `engine`: block building and policy application
//!
//! ## Debug logging
//!
//! Building with the `debug_merge` feature logs every block and decision at
//! debug level.

pub mod diff;
pub mod engine;
pub mod eol;

use bitflags::bitflags;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            tracing::debug!($($arg)*);
        }
    };
}
pub(crate) use debug_log;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MergeOperation: u8 {
        /// Take lines only theirs has
        const INSERT = 0b001;
        /// Drop lines only mine has
        const REMOVE = 0b010;
        const BOTH = Self::INSERT.bits() | Self::REMOVE.bits();
        /// Let the decider choose per block
        const ASK = 0b100;
    }
}

impl Default for MergeOperation {
    fn default() -> Self {
        MergeOperation::BOTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeBlockType {
    Keep,
    /// Lines only theirs has
    Insert,
    /// Lines only mine has
    Remove,
    /// Mine's lines replaced by theirs
    Replace,
}

impl MergeBlockType {
    pub fn symbol(&self) -> char {
        match self {
            MergeBlockType::Keep => ' ',
            MergeBlockType::Insert => '+',
            MergeBlockType::Remove => '-',
            MergeBlockType::Replace => '~',
        }
    }
}

/// An aligned run of units; `mine` and `theirs` are equal for `Keep`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeBlock<T> {
    pub kind: MergeBlockType,
    pub mine: Vec<T>,
    pub theirs: Vec<T>,
    /// Index of the first unit in mine, or where theirs' units would go
    pub mine_start: usize,
    /// Index of the first unit in theirs
    pub theirs_start: usize,
}

/// What a decider is shown for a single block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPreview {
    pub kind: MergeBlockType,
    pub mine: String,
    pub theirs: String,
    pub mine_start: usize,
    /// Character-level blocks carry the enclosing line
    pub intra_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeChoice {
    Mine,
    Theirs,
    /// Mine followed by theirs
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChoice {
    Mine,
    Theirs,
    /// Merge the contents line by line
    Merge,
}

/// Answers merge questions the policies leave open
pub trait MergeDecider {
    fn resolve_block(&mut self, block: &BlockPreview) -> MergeChoice;

    /// Asked once per modified file when the file policy is `ASK` or the file is binary
    fn resolve_file(&mut self, path: &str, binary: bool) -> FileChoice;
}

/// Never changes anything the user has
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepMine;

impl MergeDecider for KeepMine {
    fn resolve_block(&mut self, _block: &BlockPreview) -> MergeChoice {
        MergeChoice::Mine
    }

    fn resolve_file(&mut self, _path: &str, _binary: bool) -> FileChoice {
        FileChoice::Mine
    }
}

/// Line and character policies plus line ending choice for one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub line_operation: MergeOperation,
    pub char_operation: MergeOperation,
    /// Use theirs' line ending instead of mine's when they differ
    pub use_remote_eol: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            line_operation: MergeOperation::BOTH,
            char_operation: MergeOperation::BOTH,
            use_remote_eol: false,
        }
    }
}
