use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// This models the admission/v1/AdmissionResponse object of Kubernetes
/// See https://pkg.go.dev/k8s.io/kubernetes/pkg/apis/admission#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// The patch body, base64 encoded. Only "JSONPatch" (RFC 6902) is produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status contains extra details about the outcome of the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

/// PatchType is the type of patch being used to represent the mutated object
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

/// Values that Status.Status of an AdmissionResponse can have
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum AdmissionResponseStatusValue {
    Success,
    Failure,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// Status of the operation.
    /// One of: "Success" or "Failure".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatusValue>,

    /// A human-readable description of the status of this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Suggested HTTP return code for this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl AdmissionResponse {
    /// Admit the request without any change.
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            status: Some(AdmissionResponseStatus {
                status: Some(AdmissionResponseStatusValue::Success),
                message: Some("Request permitted".to_owned()),
                code: Some(200),
            }),
            ..Default::default()
        }
    }

    /// Admit the request and ask the API server to apply `patch` first.
    ///
    /// An empty patch leaves both `patch` and `patchType` unset.
    pub fn allow_with_patch(
        uid: String,
        patch: &json_patch::Patch,
    ) -> Result<AdmissionResponse, serde_json::Error> {
        let mut response = AdmissionResponse::allow(uid);
        if patch.0.is_empty() {
            return Ok(response);
        }

        let patch_str = serde_json::to_string(patch)?;
        response.patch = Some(general_purpose::STANDARD.encode(patch_str));
        response.patch_type = Some(PatchType::JSONPatch);

        Ok(response)
    }

    pub fn reject(uid: String, message: String, code: u16) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                status: Some(AdmissionResponseStatusValue::Failure),
                message: Some(message),
                code: Some(code),
            }),
            ..Default::default()
        }
    }

    pub fn reject_internal_server_error(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse::reject(uid, format!("internal server error: {message}"), 500)
    }

    /// Decode the base64 patch carried by this response, if any.
    pub fn decoded_patch(&self) -> Option<Result<json_patch::Patch, String>> {
        self.patch.as_ref().map(|encoded| {
            let raw = general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| e.to_string())?;
            serde_json::from_slice(&raw).map_err(|e| e.to_string())
        })
    }
}
