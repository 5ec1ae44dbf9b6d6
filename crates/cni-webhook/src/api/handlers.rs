use admission_mutator::{
    admission_request::AdmissionRequest, admission_response::AdmissionResponse,
    errors::ReviewError,
};
use axum::{
    body::Bytes,
    extract,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, warn, Span};

use crate::api::{api_error::ApiError, state::ApiServerState};

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_code=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Run the CNI mutation against an AdmissionReview.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, ApiError)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let handler = &state.review_handler;

    let review = handler
        .decode(content_type, &body)
        .map_err(handle_review_error)?;
    debug!(admission_review = %String::from_utf8_lossy(&body), "request received");

    populate_span_with_admission_request_data(&review.request);

    let response = handler.respond(&review.request);

    populate_span_with_mutation_results(&response.response);

    let bytes = handler.encode(&response).map_err(handle_review_error)?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    ))
}

fn populate_span_with_admission_request_data(adm_req: &AdmissionRequest) {
    Span::current().record("kind", adm_req.kind.kind.as_str());
    Span::current().record("name", adm_req.name.clone().unwrap_or_default().as_str());
    Span::current().record(
        "namespace",
        adm_req.namespace.clone().unwrap_or_default().as_str(),
    );
    Span::current().record("operation", adm_req.operation.as_str());
    Span::current().record("request_uid", adm_req.uid.as_str());
}

fn populate_span_with_mutation_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
    if let Some(status) = &response.status {
        if let Some(code) = &status.code {
            Span::current().record("response_code", code);
        }
        if let Some(message) = &status.message {
            Span::current().record("response_message", message.as_str());
        }
    }
}

fn handle_review_error(error: ReviewError) -> (StatusCode, ApiError) {
    let status = match &error {
        ReviewError::UnsupportedContentKind(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ReviewError::MalformedEnvelope(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %error, "cannot handle admission review");
    } else {
        warn!(error = %error, "rejecting admission review");
    }

    (
        status,
        ApiError {
            status,
            message: error.to_string(),
        },
    )
}
