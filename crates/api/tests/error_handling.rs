//! Tests for the `AppError` -> HTTP response mapping.
//!
//! Every error leaving a handler must render as `{ "error": ..., "code": ... }`
//! with a stable taxonomy code, and internal failures must never leak
//! implementation details to the client.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use bmds_api::error::AppError;
use bmds_core::error::{CoreError, ValidationError};

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn parse_errors_map_to_400_with_parse_code() {
    let err = AppError::Validation(ValidationError::Parse("expected value at line 1".into()));
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PARSE_ERROR");
    assert!(body["error"].as_str().unwrap().contains("expected value"));
}

#[tokio::test]
async fn schema_errors_carry_the_failing_path() {
    let err = AppError::Validation(ValidationError::Schema {
        path: "$.datasets[0].doses".into(),
        message: "expected an array of numbers".into(),
    });
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SCHEMA_VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("$.datasets[0].doses"));
}

#[tokio::test]
async fn invariant_violations_map_to_400() {
    let err = AppError::Validation(ValidationError::Invariant(
        "doses and ns must have the same length".into(),
    ));
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVARIANT_VIOLATION");
}

#[tokio::test]
async fn compatibility_errors_map_to_400() {
    let err = AppError::Validation(ValidationError::Compatibility(
        "model Logistic belongs to the other dataset type's model set".into(),
    ));
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "COMPATIBILITY_ERROR");
}

#[tokio::test]
async fn missing_entities_map_to_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Job",
        id: 99,
    });
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("Job"));
    assert!(body["error"].as_str().unwrap().contains("99"));
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let err = AppError::Database(sqlx::Error::RowNotFound);
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::InternalError("connection string was sqlite://secret.db".into());
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");
}

#[tokio::test]
async fn bad_request_keeps_its_message() {
    let err = AppError::BadRequest("inputs field is required".into());
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("inputs field"));
}
