use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

/// Request-level error taxonomy. Validation and authorization failures are
/// surfaced to the caller; everything else is a 500 whose detail is logged
/// server-side and never leaked in the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed on field `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// Deliberately carries no detail about which check failed, so a caller
    /// cannot distinguish an absent token from a malformed or stale one.
    #[error("not authenticated")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),
}

impl ApiError {
    /// Collapses `ValidationErrors` into a single offending field. The map
    /// behind `ValidationErrors` has no stable order, so the field is chosen
    /// by sorted name for a deterministic response.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let field = field_errors
            .keys()
            .min()
            .map(|k| k.to_string())
            .unwrap_or_default();
        let reason = field_errors
            .get(field.as_str())
            .and_then(|errs| errs.first())
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => e.code.to_string(),
            })
            .unwrap_or_else(|| "invalid value".to_string());
        Self::Validation { field, reason }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Token(_) | Self::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Validation { field, reason } => HttpResponse::BadRequest().json(
                serde_json::json!({ "error": reason, "field": field }),
            ),
            Self::Unauthorized => HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "not authenticated" })),
            Self::Database(err) => {
                log::error!("database failure: {err:?}");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "internal server error" }))
            }
            Self::Token(err) => {
                log::error!("token issuance failure: {err:?}");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "internal server error" }))
            }
            Self::Export(err) => {
                log::error!("csv export failure: {err:?}");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "internal server error" }))
            }
        }
    }
}
