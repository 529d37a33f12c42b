use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_multipart::MultipartError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Include raw error detail in response bodies. Enabled outside production.
pub fn expose_error_details(enabled: bool) {
    EXPOSE_ERROR_DETAILS.store(enabled, Ordering::Relaxed);
}

fn error_details_exposed() -> bool {
    EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed)
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    BadRequest(String),
    UnauthorizedAccess,
    NotFound(String),
    StoreError(String),
    UploadError(String),
    EmailServiceError(String),
    RateLimited(u64),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Validation failed: {}", messages)
            }
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized: invalid or missing API key"),
            AppError::NotFound(msg) => write!(f, "{} not found", msg),
            AppError::StoreError(msg) => write!(f, "{}", msg),
            AppError::UploadError(msg) => write!(f, "{}", msg),
            AppError::EmailServiceError(msg) => write!(f, "Email service unavailable: {}", msg),
            AppError::RateLimited(_) => write!(f, "Too many requests, please try again later."),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    /// Caller-facing message. Server-side failures never leak their cause here.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "Validation failed".to_string(),
            AppError::EmailServiceError(_) => "Email service is not available".to_string(),
            AppError::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::EmailServiceError(msg) | AppError::InternalError(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        self.envelope_with(error_details_exposed())
    }

    fn envelope_with(&self, expose_detail: bool) -> ErrorEnvelope {
        let errors = match self {
            AppError::ValidationError(errors) => Some(errors.clone()),
            _ => None,
        };

        ErrorEnvelope {
            success: false,
            message: self.public_message(),
            errors,
            error: self.detail().filter(|_| expose_detail),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());

        if let AppError::RateLimited(retry_after) = self {
            builder.insert_header(("Retry-After", retry_after.to_string()));
        }

        builder.json(self.envelope())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreError(_) => StatusCode::BAD_REQUEST,
            AppError::UploadError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = Vec::new();
        collect_field_errors(None, &errors, &mut field_errors);
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

fn collect_field_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: describe_violation(e),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_field_errors(Some(&format!("{}[{}]", path, idx)), inner, out);
                }
            }
        }
    }
}

/// Human-readable reason for a single violation.
fn describe_violation(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |name: &str| error.params.get(name).map(|v| v.to_string());

    match &*error.code {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {} characters", min, max),
            (Some(min), None) => format!("Must be at least {} characters", min),
            (None, Some(max)) => format!("Must be at most {} characters", max),
            _ => "Invalid length".to_string(),
        },
        "email" => "Must be a valid email address".to_string(),
        "url" => "Must be a valid URL".to_string(),
        "required" => "This field is required".to_string(),
        _ => "Invalid value".to_string(),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource".into()),
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                AppError::StoreError(format!("Duplicate value violates unique constraint: {}", e.message()))
            }
            sqlx::Error::Database(e) => AppError::StoreError(e.message().to_string()),
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::ContentTypeIncompatible => {
                AppError::UploadError("Request must be multipart/form-data".to_string())
            }
            _ => AppError::UploadError(format!("Invalid upload: {}", err)),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotConfigured => AppError::InternalError(err.to_string()),
            _ => AppError::UploadError(err.to_string()),
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::EmailServiceError(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum AuthError {
    #[display("Missing credentials")]
    MissingCredentials,

    #[display("Invalid credentials")]
    InvalidCredentials,

    #[display("Missing application state")]
    MissingState,
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::MissingState => {
                AppError::InternalError(self.to_string()).error_response()
            }
            _ => AppError::UnauthorizedAccess.error_response(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingState => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Display)]
pub enum StorageError {
    #[display("Object storage is not configured")]
    NotConfigured,

    #[display("Upload request failed: {_0}")]
    Transport(String),

    #[display("Storage rejected upload ({_0}): {_1}")]
    Rejected(u16, String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum MailError {
    #[display("Mail provider is not configured: {_0}")]
    NotConfigured(String),

    #[display("Mail provider unreachable: {_0}")]
    Unreachable(String),

    #[display("Mail provider rejected message ({_0}): {_1}")]
    Rejected(u16, String),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Unreachable(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, max = 100))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn validation_errors_report_every_field() {
        let sample = Sample { name: "A".into(), email: "nope".into() };
        let err = AppError::from(sample.validate().unwrap_err());

        match err {
            AppError::ValidationError(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "name"]);
                assert_eq!(fields[1].message, "Must be between 2 and 100 characters");
                assert_eq!(fields[0].message, "Must be a valid email address");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn internal_errors_hide_detail_unless_exposed() {
        let err = AppError::InternalError("connection reset".into());

        let envelope = err.envelope_with(false);
        assert_eq!(envelope.message, "Internal server error");
        assert!(envelope.error.is_none());

        assert_eq!(err.envelope_with(true).error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::StoreError("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UploadError("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UnauthorizedAccess.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("Project".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::EmailServiceError("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::RateLimited(3).status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
