use crate::wire::NormalizeError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by the ticket store.
///
/// `NotFound` is kept distinct because lifecycle transitions map it to a
/// user-visible conflict ("this ticket no longer exists") rather than a
/// generic backend error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not authenticated")]
    Unauthorized,
    #[error("not allowed by the backend")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("backend rejected the request: {message}")]
    Api { message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("malformed payload: {0}")]
    Malformed(#[from] NormalizeError),
    #[error("invalid base url `{0}`")]
    BadBaseUrl(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}
