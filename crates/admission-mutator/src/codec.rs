//! Conversions between the wire envelopes and the domain values.

use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde::{de::DeserializeOwned, Serialize};

use crate::admission_review::{AdmissionReviewRequest, AdmissionReviewResponse};
use crate::errors::CodecError;

/// Decode an `AdmissionReview` request.
///
/// Besides being valid JSON, the envelope must carry a non-empty request
/// uid and the object under review.
pub fn decode(bytes: &[u8]) -> Result<AdmissionReviewRequest, CodecError> {
    let review: AdmissionReviewRequest = serde_json::from_slice(bytes)
        .map_err(|e| CodecError::MalformedEnvelope(e.to_string()))?;

    if review.request.uid.is_empty() {
        return Err(CodecError::MalformedEnvelope(
            "request.uid is empty".to_owned(),
        ));
    }
    match &review.request.object {
        None | Some(RawExtension(serde_json::Value::Null)) => Err(CodecError::MalformedEnvelope(
            "request.object is missing".to_owned(),
        )),
        Some(_) => Ok(review),
    }
}

pub fn encode(response: &AdmissionReviewResponse) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(response).map_err(CodecError::Encode)
}

/// Serialized snapshot of the embedded object.
pub fn object_snapshot(object: &RawExtension) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&object.0)
}

pub fn decode_object<T: DeserializeOwned>(object: &RawExtension) -> Result<T, serde_json::Error> {
    serde_json::from_value(object.0.clone())
}

pub fn encode_object<T: Serialize>(object: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(object)
}
