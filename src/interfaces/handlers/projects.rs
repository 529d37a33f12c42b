use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        project::{NewProjectRequest, ProjectListQuery, UpdateProjectRequest},
    },
    errors::AppError,
    use_cases::extractors::{AdminAccess, PublicAccess},
    AppState,
};

#[instrument(skip(_access, state, query))]
pub async fn list_projects(
    _access: PublicAccess,
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.project_handler.list_projects(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(page)))
}

#[instrument(skip(_access, state))]
pub async fn get_project_by_id(
    _access: PublicAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project_by_id(&project_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(project)))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message("Project created successfully", project)))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_project(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .update_project(&project_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Project updated successfully", project)))
}

#[instrument(skip(_admin, state))]
pub async fn delete_project(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(&project_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Project deleted successfully")))
}
