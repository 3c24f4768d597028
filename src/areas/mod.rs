//! Storage areas of an offline repository
//!
//! - `metadata`: JSON metadata files under `.sos`, with backups and locking
//! - `repository`: the repository handle tying the areas to the loaded state
//! - `store`: content-addressed blob storage per branch and revision
//! - `workspace`: working tree access

pub mod metadata;
pub mod repository;
pub mod store;
pub mod workspace;
