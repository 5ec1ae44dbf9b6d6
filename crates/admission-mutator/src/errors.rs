//! Errors of the admission review pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed admission review: {0}")]
    MalformedEnvelope(String),

    #[error("cannot encode admission review response: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("cannot compute patch, invalid {side} snapshot: {source}")]
    DiffComputationFailed {
        side: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot apply patch: {0}")]
    PatchApplication(String),
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("unsupported content type {0:?}, expected application/json")]
    UnsupportedContentKind(String),

    #[error(transparent)]
    MalformedEnvelope(CodecError),

    #[error(transparent)]
    DiffComputationFailed(#[from] DiffError),

    #[error("cannot serialize mutated object: {0}")]
    ObjectEncode(#[source] serde_json::Error),

    #[error(transparent)]
    Encode(CodecError),
}

impl From<CodecError> for ReviewError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::MalformedEnvelope(_) => ReviewError::MalformedEnvelope(error),
            CodecError::Encode(_) => ReviewError::Encode(error),
        }
    }
}
