//! Tests for the error payload and its serialisation contract.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn conflict_with_details() -> Error {
    Error::conflict("market code already in use")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "conflict": "marketCode", "value": "GB" }))
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] err: Error, #[case] expected: ErrorCode) {
    assert_eq!(err.code(), expected);
}

#[rstest]
fn trace_id_is_absent_outside_a_request() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_inside_a_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("fixture is a valid UUID");
    let err = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(err.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[rstest]
fn round_trips_through_json(conflict_with_details: Error) {
    let text = serde_json::to_string(&conflict_with_details).expect("serialise");
    assert!(text.contains("\"traceId\""));
    let parsed: Error = serde_json::from_str(&text).expect("deserialise");
    assert_eq!(parsed, conflict_with_details);
}

#[rstest]
fn without_details_keeps_trace_id(conflict_with_details: Error) {
    let stripped = conflict_with_details.without_details();
    assert!(stripped.details().is_none());
    assert_eq!(stripped.trace_id(), Some(TRACE_ID));
    assert_eq!(stripped.code(), ErrorCode::Conflict);
}
