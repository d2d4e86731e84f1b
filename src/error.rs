use thiserror::Error;

/// Errors returned by value-based tree queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No node in the tree holds the requested value.
    #[error("value cannot be found in tree")]
    NotFound,
}

/// Result alias for tree operations that can fail.
pub type Result<T, E = Error> = std::result::Result<T, E>;
