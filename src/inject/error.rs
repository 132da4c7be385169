//! Injection errors.

/// Errors returned by injection operations.
///
/// All of them are reported to the caller synchronously; nothing is
/// retried or recovered internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// `inject` was given an id that is already present.
    #[error("injectable with id `{0}` already exists")]
    DuplicateId(String),

    /// `uninject` was given an id that is not present.
    #[error("injectable with id `{0}` does not exist")]
    NotFound(String),

    /// The handle outlived the provider that owned its store.
    #[error("inject provider is no longer mounted")]
    Detached,
}

pub type Result<T> = std::result::Result<T, InjectError>;
