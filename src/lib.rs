//! sos: an offline version-control engine
//!
//! - `areas`: on-disk areas of a repository (content store, metadata files, working tree)
//! - `artifacts`: data structures and algorithms (changes, merge, revisions, config)
//! - `commands`: user-facing operations implemented on top of `Repository`
//! - `errors`: the error taxonomy surfaced to the command-line boundary

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
