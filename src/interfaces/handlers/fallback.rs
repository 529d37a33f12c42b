use actix_web::{HttpRequest, HttpResponse};

use crate::errors::AppError;

/// Default service for anything the router did not match.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    tracing::debug!(method = %req.method(), path = %req.path(), "Unmatched route");
    AppError::NotFound(format!("Route {}", req.path())).to_http_response()
}
