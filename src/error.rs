use thiserror::Error;

/// Errors surfaced by the profiling and plotting contracts.
///
/// Undefined computations (for example numeric statistics over a column with
/// no valid values) are not errors: the corresponding facts are omitted from
/// the summary instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RequestError::InvalidRequest(message.into())
    }
}
