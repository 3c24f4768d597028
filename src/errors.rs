//! Error taxonomy
//!
//! Every operation returns a [`RepoResult`]. The lower areas work with `anyhow`
//! and attach context; a `RepoError` raised inside them survives the round trip
//! through `anyhow::Error` and is recovered on conversion.

use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Bad argument, unknown branch or revision, or a precondition the user can fix
    #[error("{0}")]
    User(String),
    /// Corrupted or inconsistent repository state; the operation must stop
    #[error("repository integrity error: {0}")]
    Integrity(String),
    #[error(transparent)]
    Io(anyhow::Error),
}

impl RepoError {
    pub fn user(message: impl Into<String>) -> Self {
        RepoError::User(message.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        RepoError::Integrity(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            RepoError::User(_) => 1,
            RepoError::Integrity(_) => 2,
            RepoError::Io(_) => 3,
        }
    }
}

impl From<anyhow::Error> for RepoError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<RepoError>() {
            Ok(repo_error) => repo_error,
            Err(error) => RepoError::Io(error),
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(error: std::io::Error) -> Self {
        RepoError::Io(error.into())
    }
}

impl From<std::fmt::Error> for RepoError {
    fn from(error: std::fmt::Error) -> Self {
        RepoError::Io(error.into())
    }
}
