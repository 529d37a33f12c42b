use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        newsletter::{CampaignListQuery, NewTemplateRequest, SendNewsletterRequest, UpdateTemplateRequest},
        pagination::PageQuery,
    },
    errors::AppError,
    use_cases::extractors::AdminAccess,
    AppState,
};

#[instrument(skip(_admin, state, data))]
pub async fn send_newsletter(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    data: web::Json<SendNewsletterRequest>,
) -> Result<impl Responder, AppError> {
    let outcome = state.newsletter_handler.send_newsletter(data.into_inner()).await?;

    let message = format!(
        "Newsletter sent to {} of {} recipients",
        outcome.report.sent, outcome.report.total
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(message, outcome)))
}

#[instrument(skip(_admin, state, query))]
pub async fn list_templates(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.newsletter_handler.list_templates(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}

#[instrument(skip(_admin, state))]
pub async fn get_template_by_id(
    _admin: AdminAccess,
    template_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let template = state.newsletter_handler.get_template_by_id(&template_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(template)))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_template(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    data: web::Json<NewTemplateRequest>,
) -> Result<impl Responder, AppError> {
    let template = state.newsletter_handler.create_template(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message("Template created successfully", template)))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_template(
    _admin: AdminAccess,
    template_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateTemplateRequest>,
) -> Result<impl Responder, AppError> {
    let template = state
        .newsletter_handler
        .update_template(&template_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Template updated successfully", template)))
}

#[instrument(skip(_admin, state))]
pub async fn delete_template(
    _admin: AdminAccess,
    template_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.newsletter_handler.delete_template(&template_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Template deleted successfully")))
}

#[instrument(skip(_admin, state, query))]
pub async fn list_campaigns(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<CampaignListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.newsletter_handler.list_campaigns(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}
