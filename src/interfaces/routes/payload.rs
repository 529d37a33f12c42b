use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError},
    web,
};

use crate::errors::AppError;

/// Ceiling for JSON and url-encoded bodies.
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Extractor failures are rendered through the standard error envelope.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_BODY_SIZE)
            .error_handler(|err, _req| json_error(err).into()),
    )
    .app_data(
        web::FormConfig::default()
            .limit(MAX_BODY_SIZE)
            .error_handler(|err, _req| form_error(err).into()),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| query_error(err).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| path_error(err).into()))
    .app_data(MultipartFormConfig::default().error_handler(|err, _req| AppError::from(err).into()));
}

fn json_error(err: JsonPayloadError) -> AppError {
    match err {
        JsonPayloadError::ContentType => AppError::BadRequest("Content type must be application/json".into()),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::BadRequest("Request body is too large".into())
        }
        JsonPayloadError::Deserialize(e) => AppError::BadRequest(format!("Invalid JSON payload: {}", e)),
        other => AppError::BadRequest(format!("Invalid JSON payload: {}", other)),
    }
}

fn form_error(err: UrlencodedError) -> AppError {
    match err {
        UrlencodedError::Overflow { .. } => AppError::BadRequest("Request body is too large".into()),
        other => AppError::BadRequest(format!("Invalid form payload: {}", other)),
    }
}

fn query_error(err: QueryPayloadError) -> AppError {
    AppError::BadRequest(format!("Invalid query string: {}", err))
}

fn path_error(err: PathError) -> AppError {
    AppError::BadRequest(format!("Invalid path parameter: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn content_type_mismatch_is_bad_request() {
        let err = json_error(JsonPayloadError::ContentType);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Content type must be application/json");
    }

    #[test]
    fn oversized_form_is_bad_request() {
        let err = form_error(UrlencodedError::Overflow { size: MAX_BODY_SIZE + 1, limit: MAX_BODY_SIZE });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
