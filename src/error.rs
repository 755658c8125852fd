//! Error types for citeanchor.
//!
//! Resolution itself never fails: a citation that cannot be located yields
//! an empty [`ResolutionResult`](crate::model::ResolutionResult). These errors
//! only surface at the boundaries (fragment providers, file loading) and
//! internally when a matcher stage cannot compile its pattern.

use std::io;
use thiserror::Error;

/// Result type alias for citeanchor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for citeanchor.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading fragment data.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fragment data could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider has no fragments for the requested page.
    #[error("Page not found: {0}")]
    PageNotFound(u32),

    /// A rendered fragment carries unusable geometry.
    #[error("Invalid fragment: {0}")]
    InvalidFragment(String),

    /// A matcher pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(String),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}
