use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::service::RegistrationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// The blocking pool could not run the store call
    #[error("Request could not be processed: {0}")]
    Blocking(#[from] BlockingError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Registration(RegistrationError::AlreadyRegistered) => StatusCode::CONFLICT,
            ApiError::Registration(RegistrationError::Infrastructure(_))
            | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let (message, errors) = match self {
            ApiError::Validation(violations) => (self.to_string(), Some(violations.clone())),
            ApiError::Registration(RegistrationError::AlreadyRegistered) => {
                (self.to_string(), None)
            }
            // Infrastructure details stay in the logs
            ApiError::Registration(RegistrationError::Infrastructure(_)) | ApiError::Blocking(_) => {
                log::error!("Request failed: {}", self);
                ("Internal server error".to_string(), None)
            }
        };

        HttpResponse::build(status_code).json(ErrorBody {
            success: false,
            status_code: status_code.as_u16(),
            message,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use database::store::StoreError;
    use serde_json::Value;

    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_lists_violations() {
        let (status, body) =
            body_of(ApiError::Validation(vec!["email is required".to_string()])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["errors"][0], "email is required");
    }

    #[actix_web::test]
    async fn already_registered_is_a_conflict() {
        let (status, body) = body_of(RegistrationError::AlreadyRegistered.into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["message"],
            "This email is already registered in the raffle"
        );
        assert!(body.get("errors").is_none());
    }

    #[actix_web::test]
    async fn infrastructure_details_are_hidden() {
        let (status, body) = body_of(
            RegistrationError::Infrastructure(StoreError::Timeout).into(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["statusCode"], 500);
    }
}
