//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{FieldError, MarketError, MarketId, UniquenessConflict};
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection string postgres://secret")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_request_case(expected_trace_id: String) -> Error {
    Error::invalid_request("bad")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "name"}))
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
    assert_eq!(ResponseError::status_code(&Error::new(code, "x")), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn error_responses_include_trace_id_and_payloads(
    #[from(internal_error_case)] internal_error: Error,
    #[from(invalid_request_case)] invalid_request: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());

    let payload = assert_error_response(
        invalid_request,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "bad");
    assert_eq!(payload.details(), Some(&json!({"field": "name"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::invalid_request("bad").with_details(json!({"field": "name"}));

    let payload = assert_error_response(error, StatusCode::BAD_REQUEST, None).await;
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.details(), Some(&json!({"field": "name"})));
}

#[rstest]
#[actix_web::test]
async fn field_validation_renders_field_errors() {
    let error = Error::from(MarketError::FieldValidation(vec![FieldError::new(
        "code",
        "market code must be exactly 2 characters",
    )]));

    let payload = assert_error_response(error, StatusCode::BAD_REQUEST, None).await;
    let fields = payload
        .details()
        .and_then(|details| details.get("fieldErrors"))
        .and_then(|value| value.as_array())
        .expect("fieldErrors array");
    assert_eq!(fields[0]["field"], "code");
}

#[rstest]
#[case(
    MarketError::from(UniquenessConflict::MarketCode("GB".into())),
    StatusCode::CONFLICT
)]
#[case(MarketError::WriteConflict("unique violation".into()), StatusCode::CONFLICT)]
#[case(MarketError::MarketNotEmpty(MarketId::new(3)), StatusCode::CONFLICT)]
#[case(MarketError::NotFound(MarketId::new(3)), StatusCode::NOT_FOUND)]
#[case(MarketError::Cancelled, StatusCode::SERVICE_UNAVAILABLE)]
#[case(MarketError::StoreUnavailable("pool".into()), StatusCode::SERVICE_UNAVAILABLE)]
#[case(MarketError::Store("syntax".into()), StatusCode::INTERNAL_SERVER_ERROR)]
fn market_errors_map_to_statuses(#[case] error: MarketError, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&Error::from(error)), status);
}
