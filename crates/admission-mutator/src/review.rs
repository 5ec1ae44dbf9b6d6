use tracing::{debug, error, info, warn};

use crate::admission_request::AdmissionRequest;
use crate::admission_response::AdmissionResponse;
use crate::admission_review::{AdmissionReviewRequest, AdmissionReviewResponse};
use crate::codec;
use crate::diff;
use crate::errors::{CodecError, ReviewError};
use crate::mutation::{Mutation, Mutator};

/// Drive one admission review through a [`Mutator`].
///
/// The handler holds no per-request state: every call decodes the envelope,
/// snapshots the object, lets the rule edit a working copy and turns the
/// difference between the two snapshots into a JSON patch.
#[derive(Debug, Clone)]
pub struct ReviewHandler<M> {
    mutator: M,
}

impl<M: Mutator> ReviewHandler<M> {
    pub fn new(mutator: M) -> Self {
        ReviewHandler { mutator }
    }

    /// Handle a raw HTTP body and return the encoded response envelope.
    ///
    /// Only failures that happen before a request uid is known (content type,
    /// envelope decoding) and encoding failures are returned as errors. Any
    /// failure past that point is reported inside the envelope.
    pub fn handle(&self, content_type: Option<&str>, body: &[u8]) -> Result<Vec<u8>, ReviewError> {
        let review = self.decode(content_type, body)?;
        let response = self.respond(&review.request);
        self.encode(&response)
    }

    /// Check the declared content type and decode the review envelope.
    pub fn decode(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<AdmissionReviewRequest, ReviewError> {
        check_content_type(content_type)?;
        let review = codec::decode(body)?;
        Ok(review)
    }

    /// Build the response envelope of a decoded request.
    ///
    /// Failures of the review are turned into a rejection carrying the
    /// request uid, so the API server always gets an answer.
    pub fn respond(&self, request: &AdmissionRequest) -> AdmissionReviewResponse {
        let response = self.review(request).unwrap_or_else(|e| {
            error!(
                request = %request.object_ref(),
                error = %e,
                "cannot compute mutation"
            );
            AdmissionResponse::reject_internal_server_error(request.uid.clone(), e.to_string())
        });

        AdmissionReviewResponse::new(response)
    }

    pub fn encode(&self, response: &AdmissionReviewResponse) -> Result<Vec<u8>, ReviewError> {
        let bytes = codec::encode(response)?;
        Ok(bytes)
    }

    /// Evaluate a decoded request and build its admission response.
    pub fn review(&self, request: &AdmissionRequest) -> Result<AdmissionResponse, ReviewError> {
        let object_ref = request.object_ref();
        info!(
            request = %object_ref,
            mutator = self.mutator.name(),
            "reviewing request"
        );

        let Some(object) = &request.object else {
            return Err(ReviewError::MalformedEnvelope(CodecError::MalformedEnvelope(
                "request.object is missing".to_owned(),
            )));
        };

        let original = codec::object_snapshot(object).map_err(ReviewError::ObjectEncode)?;
        debug!(
            request = %object_ref,
            original = %String::from_utf8_lossy(&original),
            "original object"
        );

        let mut working_copy: M::Object = match codec::decode_object(object) {
            Ok(obj) => obj,
            Err(e) => {
                warn!(
                    request = %object_ref,
                    error = %e,
                    "cannot decode object, admitting it unchanged"
                );
                return Ok(AdmissionResponse::allow(request.uid.clone()));
            }
        };

        if self.mutator.mutate(&mut working_copy) == Mutation::Unchanged {
            info!(request = %object_ref, "no patch necessary");
            return Ok(AdmissionResponse::allow(request.uid.clone()));
        }

        let mutated = codec::encode_object(&working_copy).map_err(ReviewError::ObjectEncode)?;
        debug!(
            request = %object_ref,
            mutated = %String::from_utf8_lossy(&mutated),
            "mutated object"
        );

        let patch = diff::diff(&original, &mutated)?;
        if patch.0.is_empty() {
            info!(request = %object_ref, "no patch necessary");
        } else {
            info!(
                request = %object_ref,
                patch = %serde_json::to_string(&patch).unwrap_or_default(),
                "created patch"
            );
        }

        AdmissionResponse::allow_with_patch(request.uid.clone(), &patch)
            .map_err(ReviewError::ObjectEncode)
    }
}

fn check_content_type(content_type: Option<&str>) -> Result<(), ReviewError> {
    let content_type = content_type.unwrap_or_default();
    match content_type.parse::<mime::Mime>() {
        Ok(m) if m.essence_str() == mime::APPLICATION_JSON.essence_str() => Ok(()),
        _ => Err(ReviewError::UnsupportedContentKind(content_type.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission_response::PatchType;
    use crate::mutation::ClusterCniMutator;
    use assert_json_diff::assert_json_eq;
    use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn handler() -> ReviewHandler<ClusterCniMutator> {
        ReviewHandler::new(ClusterCniMutator::default())
    }

    fn request(object: Value) -> AdmissionRequest {
        AdmissionRequest {
            uid: "705ab4f5-6393-11e8-b7cc-42010a800002".to_owned(),
            name: Some("my-cluster".to_owned()),
            operation: "CREATE".to_owned(),
            object: Some(RawExtension(object)),
            ..Default::default()
        }
    }

    fn review_body(object: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "name": "my-cluster",
                "operation": "CREATE",
                "object": object
            }
        }))
        .unwrap()
    }

    fn patch_of(response: &AdmissionResponse) -> Value {
        let patch = response
            .decoded_patch()
            .expect("patch should be set")
            .expect("patch should decode");
        serde_json::to_value(patch).unwrap()
    }

    #[test]
    fn both_labels_add_the_plugin_section() {
        let response = handler()
            .review(&request(json!({
                "metadata": {"labels": {"hackaton-cni": "calico", "hackaton-cni-version": "v3.1"}},
                "spec": {}
            })))
            .unwrap();

        assert!(response.allowed);
        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));
        assert_json_eq!(
            patch_of(&response),
            json!([{
                "op": "add",
                "path": "/spec/cniPlugin",
                "value": {"type": "calico", "version": "v3.1"}
            }])
        );
    }

    #[test]
    fn type_label_only_sets_type() {
        let response = handler()
            .review(&request(json!({
                "metadata": {"labels": {"hackaton-cni": "cilium"}},
                "spec": {"cniPlugin": {"type": "canal", "version": "v3.19"}}
            })))
            .unwrap();

        assert!(response.allowed);
        assert_json_eq!(
            patch_of(&response),
            json!([{"op": "replace", "path": "/spec/cniPlugin/type", "value": "cilium"}])
        );
    }

    #[rstest]
    #[case::api_server_metadata(
        json!({
            "apiVersion": "kubermatic.k8c.io/v1",
            "kind": "Cluster",
            "metadata": {
                "name": "my-cluster",
                "uid": "6f0c7b47-0d1c-4a8e-9c5e-0b2f5b4d2e11",
                "resourceVersion": "4711",
                "generation": 1,
                "creationTimestamp": null,
                "managedFields": [{
                    "manager": "kubectl-create",
                    "operation": "Update",
                    "apiVersion": "kubermatic.k8c.io/v1",
                    "time": null,
                    "fieldsType": "FieldsV1",
                    "fieldsV1": {"f:metadata": {"f:labels": {".": {}}}}
                }],
                "labels": {"hackaton-cni": "calico", "hackaton-cni-version": "v3.1"}
            },
            "spec": {"humanReadableName": "demo"},
            "status": null
        }),
        json!([{
            "op": "add",
            "path": "/spec/cniPlugin",
            "value": {"type": "calico", "version": "v3.1"}
        }])
    )]
    #[case::null_spec(
        json!({"metadata": {"labels": {"hackaton-cni": "calico"}}, "spec": null}),
        json!([{"op": "replace", "path": "/spec", "value": {"cniPlugin": {"type": "calico"}}}])
    )]
    #[case::missing_spec(
        json!({"metadata": {"labels": {"hackaton-cni": "calico"}}}),
        json!([{"op": "add", "path": "/spec", "value": {"cniPlugin": {"type": "calico"}}}])
    )]
    fn patch_only_touches_the_plugin_section(#[case] object: Value, #[case] expected: Value) {
        let response = handler().review(&request(object)).unwrap();

        assert!(response.allowed);
        assert_json_eq!(patch_of(&response), expected);
    }

    #[rstest]
    #[case::empty_labels(json!({"metadata": {"labels": {}}, "spec": {}}))]
    #[case::no_metadata(json!({"spec": {"cniPlugin": {"type": "canal"}}}))]
    #[case::labels_already_applied(json!({
        "metadata": {"labels": {"hackaton-cni": "canal"}},
        "spec": {"cniPlugin": {"type": "canal"}}
    }))]
    #[case::not_a_cluster(json!({"metadata": "not an object", "spec": 42}))]
    fn admitted_without_patch(#[case] object: Value) {
        let response = handler().review(&request(object)).unwrap();

        assert!(response.allowed);
        assert!(response.patch.is_none());
        assert!(response.patch_type.is_none());
        assert_eq!(response.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
    }

    #[test]
    fn patch_round_trip_is_stable() {
        let original = json!({
            "apiVersion": "kubermatic.k8c.io/v1",
            "kind": "Cluster",
            "metadata": {
                "name": "my-cluster",
                "labels": {"hackaton-cni": "cilium", "hackaton-cni-version": "v1.15"}
            },
            "spec": {"humanReadableName": "demo", "version": "1.30.1"}
        });
        let original_bytes = serde_json::to_vec(&original).unwrap();

        let response = handler().review(&request(original.clone())).unwrap();
        let patch: json_patch::Patch = response.decoded_patch().unwrap().unwrap();

        let patched = diff::apply(&original_bytes, &patch).unwrap();
        let mut expected = original.clone();
        expected["spec"]["cniPlugin"] = json!({"type": "cilium", "version": "v1.15"});
        assert_json_eq!(patched, expected);

        let patched_bytes = serde_json::to_vec(&patched).unwrap();
        let rediff = diff::diff(&original_bytes, &patched_bytes).unwrap();
        assert_eq!(rediff, patch);

        // the patched object is already in its final shape
        let second = handler().review(&request(patched)).unwrap();
        assert!(second.patch.is_none());
    }

    #[test]
    fn handle_produces_review_envelope() {
        let body = review_body(json!({
            "metadata": {"labels": {"hackaton-cni": "calico", "hackaton-cni-version": "v3.1"}},
            "spec": {}
        }));

        let bytes = handler()
            .handle(Some("application/json"), &body)
            .expect("handling should work");
        let review: AdmissionReviewResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(review.kind.as_deref(), Some("AdmissionReview"));
        assert_eq!(review.api_version.as_deref(), Some("admission.k8s.io/v1"));
        assert_eq!(review.response.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
        assert!(review.response.allowed);
        assert!(review.response.patch.is_some());
    }

    #[test]
    fn handle_without_labels_has_no_patch_field() {
        let body = review_body(json!({"metadata": {"labels": {}}, "spec": {}}));

        let bytes = handler()
            .handle(Some("application/json; charset=utf-8"), &body)
            .expect("handling should work");
        let wire: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(wire["response"]["allowed"], true);
        assert!(wire["response"].get("patch").is_none());
        assert!(wire["response"].get("patchType").is_none());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::yaml(Some("application/yaml"))]
    #[case::text(Some("text/plain"))]
    #[case::garbage(Some("not a mime type"))]
    fn handle_rejects_unsupported_content_kind(#[case] content_type: Option<&str>) {
        let body = review_body(json!({"spec": {}}));

        let result = handler().handle(content_type, &body);
        assert!(matches!(result, Err(ReviewError::UnsupportedContentKind(_))));
    }

    #[test]
    fn handle_rejects_malformed_envelope() {
        let result = handler().handle(Some("application/json"), b"{\"request\": 1}");
        assert!(matches!(result, Err(ReviewError::MalformedEnvelope(_))));
    }

    #[test]
    fn respond_turns_failures_into_rejections() {
        let request = AdmissionRequest {
            uid: "hello".to_owned(),
            object: None,
            ..Default::default()
        };

        let review = handler().respond(&request);

        assert_eq!(review.response.uid, "hello");
        assert!(!review.response.allowed);
        assert!(review.response.patch.is_none());
        let status = review.response.status.expect("status should be set");
        assert_eq!(status.code, Some(500));
        assert!(status
            .message
            .expect("message should be set")
            .starts_with("internal server error"));
    }
}
