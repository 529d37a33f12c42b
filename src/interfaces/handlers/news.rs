use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        news::{NewNewsRequest, NewsListQuery, UpdateNewsRequest},
    },
    errors::AppError,
    use_cases::extractors::{AdminAccess, PublicAccess},
    AppState,
};

#[instrument(skip(_access, state, query))]
pub async fn list_news(
    _access: PublicAccess,
    state: web::Data<AppState>,
    query: web::Query<NewsListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.news_handler.list_news(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}

#[instrument(skip(_access, state))]
pub async fn get_news_by_id(
    _access: PublicAccess,
    news_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let news = state.news_handler.get_news_by_id(&news_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(news)))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_news(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    data: web::Json<NewNewsRequest>,
) -> Result<impl Responder, AppError> {
    let news = state.news_handler.create_news(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message("News created successfully", news)))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_news(
    _admin: AdminAccess,
    news_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateNewsRequest>,
) -> Result<impl Responder, AppError> {
    let news = state.news_handler.update_news(&news_id, data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message("News updated successfully", news)))
}

#[instrument(skip(_admin, state))]
pub async fn delete_news(
    _admin: AdminAccess,
    news_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.news_handler.delete_news(&news_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("News deleted successfully")))
}
