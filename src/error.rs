use actix_web::{
    HttpResponse, ResponseError,
    dev::ServiceResponse,
    http::StatusCode,
    middleware::ErrorHandlerResponse,
};
use derive_more::Display;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::store::{StoreError, UniqueKey};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "billsCount")]
    pub field: String,
    #[schema(example = "Bills count must be a non-negative integer")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failure a domain operation can surface to the HTTP boundary.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Validation failed")]
    Validation(Vec<FieldError>),

    #[display(fmt = "{}", _0)]
    Auth(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// The payload is the diagnostic detail; it is logged, never rendered
    /// unless the diagnostics handler is installed.
    #[display(fmt = "Internal Server Error")]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("Access denied".to_string())
    }

    pub fn invalid_credentials() -> Self {
        Self::Auth("Invalid credentials".to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(UniqueKey::Username) => {
                Self::Conflict("Username already exists".to_string())
            }
            StoreError::DuplicateKey(UniqueKey::Email) => {
                Self::Conflict("Email already exists".to_string())
            }
            StoreError::DuplicateKey(UniqueKey::EmployeeDate) => {
                Self::Conflict("Attendance already exists for this date".to_string())
            }
            StoreError::Backend(detail) => Self::Internal(detail),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => json!({
                "success": false,
                "message": self.to_string(),
                "errors": errors,
            }),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                json!({
                    "success": false,
                    "message": self.to_string(),
                })
            }
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// `ErrorHandlers` hook for development builds: re-renders internal errors
/// with their diagnostic detail attached.
pub fn expose_internal_details<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let detail = match res.response().error() {
        Some(err) => match err.as_error::<AppError>() {
            Some(AppError::Internal(detail)) => detail.clone(),
            _ => err.to_string(),
        },
        None => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };

    let (req, _) = res.into_parts();
    let resp = HttpResponse::InternalServerError().json(json!({
        "success": false,
        "message": "Internal Server Error",
        "details": detail,
    }));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, resp).map_into_right_body(),
    ))
}
