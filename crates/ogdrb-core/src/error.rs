use thiserror::Error;

use crate::api::ApiError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the export pipeline.
///
/// Records with missing required data are not errors: they are left out of
/// results and logged at debug level.
#[derive(Error, Debug)]
pub enum Error {
    /// The selection cannot be exported as given; the user has to change it.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] ApiError),

    #[error("Repeater store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Error::InvalidSelection(message.into())
    }

    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Error::InvalidSelection(_))
    }

    /// Whether re-running the whole fetch may succeed. Re-fetching is safe:
    /// the store upserts by natural key.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NetworkFailure(e) => e.is_retryable(),
            _ => false,
        }
    }
}
