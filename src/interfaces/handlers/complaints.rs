use actix_web::{web, Either, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{complaint::NewComplaintForm, envelope::ApiResponse, pagination::PageQuery},
    errors::AppError,
    use_cases::extractors::{AdminAccess, PublicAccess},
    AppState,
};

/// Accepts either a JSON body or a classic HTML form post.
#[instrument(skip(_access, state, body))]
pub async fn submit_complaint(
    _access: PublicAccess,
    state: web::Data<AppState>,
    body: Either<web::Json<NewComplaintForm>, web::Form<NewComplaintForm>>,
) -> Result<impl Responder, AppError> {
    let form = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let complaint = state.complaint_handler.submit_complaint(form).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message("Complaint submitted successfully", complaint)))
}

#[instrument(skip(_admin, state, query))]
pub async fn list_complaints(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.complaint_handler.list_complaints(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}

#[instrument(skip(_admin, state))]
pub async fn get_complaint_by_id(
    _admin: AdminAccess,
    complaint_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let complaint = state.complaint_handler.get_complaint_by_id(&complaint_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(complaint)))
}

#[instrument(skip(_admin, state))]
pub async fn delete_complaint(
    _admin: AdminAccess,
    complaint_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.complaint_handler.delete_complaint(&complaint_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Complaint deleted successfully")))
}
