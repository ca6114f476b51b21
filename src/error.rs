//! Errors raised by prototype selectors.
use thiserror::Error;

/// Result type returned by every `fit()`/`transform()` call.
pub type LearningResult<T> = Result<T, Error>;

/// Failures of a prototype selector.
///
/// All of them are raised before any computation takes place: the
/// caller's data is only borrowed, and no partial selection is ever
/// recorded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed dataset or parameters (mismatched lengths, empty data,
    /// non-positive bucket width, unsupported metric, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A class has too few members to form a neighborhood.
    #[error("class {class} has {count} instances, at least {required} are needed")]
    InsufficientClassPopulation {
        class: String,
        count: usize,
        required: usize,
    },
    /// The selector was used before `fit()`.
    #[error("the selector must be fitted first")]
    Untrained,
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Error {
        Error::InvalidInput(msg.into())
    }
}
