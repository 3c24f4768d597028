//! Command implementations on top of `Repository`
//!
//! - `plumbing`: direct access to stored content (hash-file, cat-file)
//! - `porcelain`: the offline workflow (offline, commit, switch, update, ...)

pub mod plumbing;
pub mod porcelain;
