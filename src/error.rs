use std::error::Error;

use thiserror::Error;

/// Why a bookmark operation did not produce its result.
#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("ValidationError: {0}")]
    Validation(&'static str),
    #[error("MalformedBody: {0}")]
    MalformedBody(String),
    #[error("NotFoundError: bookmark {0} does not exist")]
    NotFound(String),
    #[error("AuthorizationError: {caller} does not own bookmark {id}")]
    Forbidden { id: String, caller: String },
    #[error("InternalError: {0}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for BookmarkError {
    fn from(error: anyhow::Error) -> Self {
        BookmarkError::Internal(error)
    }
}

/// Flattens an error and its `source()` chain into `outer: inner: root`.
pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

/// Same as [`unpack_error`] for `anyhow` errors, which keep context frames in their chain.
pub fn unpack_anyhow(err: &anyhow::Error) -> String {
    err.chain().map(|e| e.to_string()).collect::<Vec<_>>().join(": ")
}
