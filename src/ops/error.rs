use crate::io::api::ApiError;
use crate::model::task::ValidationError;
use crate::ops::filter_codec::FilterError;

/// Error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The collaborator call failed; cached state was left as it was
    #[error("failed to fetch {what}: {source}")]
    FetchFailed {
        what: String,
        #[source]
        source: ApiError,
    },
    #[error("malformed filter: {0}")]
    DecodeFailed(#[from] FilterError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl DeckError {
    pub fn fetch(what: impl Into<String>) -> impl FnOnce(ApiError) -> DeckError {
        let what = what.into();
        move |source| DeckError::FetchFailed { what, source }
    }
}
