//! Data structures and algorithms of the versioning engine
//!
//! - `branch`: branch and commit records, revision strings
//! - `changes`: path state, change detection and commit replay
//! - `config`: layered configuration and file patterns
//! - `core`: shared utilities (pager wrapper)
//! - `merge`: line and character merging

pub mod branch;
pub mod changes;
pub mod config;
pub mod core;
pub mod merge;
