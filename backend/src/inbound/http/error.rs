//! HTTP mapping for domain errors.
//!
//! Handlers return [`ApiResult`]; Actix renders the error as the same
//! `{ code, message, details? }` payload WebSocket clients receive.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::domain::{DomainError, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, DomainError>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::SerializationFailure | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let body = if self.code() == ErrorCode::InternalError {
            DomainError::internal("Internal server error")
        } else {
            self.clone()
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(DomainError::validation_failure("bad"), StatusCode::BAD_REQUEST)]
    #[case(DomainError::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(DomainError::storage_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(DomainError::serialization_failure("shape"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: DomainError, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    async fn body_of(error: &DomainError) -> Value {
        let response = ResponseError::error_response(error);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = DomainError::internal("db password leaked").with_details(json!({ "secret": 1 }));
        assert_eq!(
            body_of(&error).await,
            json!({ "code": "internal_error", "message": "Internal server error" })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn validation_errors_keep_details() {
        let error = DomainError::validation_failure("too many").with_details(json!({ "field": "count" }));
        assert_eq!(
            body_of(&error).await,
            json!({
                "code": "validation_failure",
                "message": "too many",
                "details": { "field": "count" }
            })
        );
    }
}
