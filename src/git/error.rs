use thiserror::Error;

/// Raised when raw word-diff output does not follow the porcelain grammar.
///
/// A single malformed file block or hunk fails the whole parse; there is no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("malformed diff input: {0}")]
    MalformedInput(String),
}

impl DiffError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DiffError::MalformedInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, DiffError>;
