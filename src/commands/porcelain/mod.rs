//! User-facing operations of the offline repository
//!
//! ## Commands
//!
//! - `offline`: start working offline, creating the first branch
//! - `online`: leave offline mode
//! - `branch`: create a branch from the working tree or the last revision
//! - `commit`: record the working tree as the next revision
//! - `changes`: list changes of the working tree against a revision
//! - `diff`: show line differences against a revision
//! - `switch`: replace the working tree with another branch or revision
//! - `update`: merge another branch or revision into the working tree
//! - `delete`: remove a branch
//! - `log`: list the commits of the current branch
//! - `status`: repository mode, branches and pending changes
//! - `track`: edit tracking patterns of the current branch
//! - `ls`: list files with their tracking state
//! - `config`: read and edit configuration layers

pub mod branch;
pub mod changes;
pub mod commit;
pub mod config;
pub mod delete;
pub mod diff;
pub mod log;
pub mod ls;
pub mod offline;
pub mod online;
pub mod status;
pub mod switch;
pub mod track;
pub mod update;

/// `--only` and `--except` options of the scanning commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilters {
    pub only: Vec<String>,
    pub except: Vec<String>,
}
