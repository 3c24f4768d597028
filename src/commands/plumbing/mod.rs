//! Low-level commands exposing the content store
//!
//! - `hash_file`: content and name hash of a working tree file
//! - `cat_file`: contents of a file as stored in a revision

pub mod cat_file;
pub mod hash_file;
