use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::envelope::ApiResponse,
    errors::AppError,
    use_cases::{extractors::AdminAccess, upload::UploadedFile},
    AppState,
};

#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    pub images: Vec<TempFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadedImages {
    pub urls: Vec<String>,
}

async fn read_images(form: ImageUploadForm) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::with_capacity(form.images.len());

    for image in form.images {
        let bytes = tokio::fs::read(image.file.path())
            .await
            .map_err(|e| AppError::UploadError(format!("Failed to read uploaded file: {}", e)))?;

        files.push(UploadedFile {
            file_name: image.file_name,
            content_type: image.content_type.map(|mime| mime.essence_str().to_string()),
            bytes,
        });
    }

    Ok(files)
}

async fn upload_for(state: &AppState, resource: &str, form: ImageUploadForm) -> Result<HttpResponse, AppError> {
    let files = read_images(form).await?;
    let urls = state.upload_handler.upload_images(resource, files).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        format!("{} image(s) uploaded successfully", urls.len()),
        UploadedImages { urls },
    )))
}

#[instrument(skip(_admin, state, form))]
pub async fn upload_project_images(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ImageUploadForm>,
) -> Result<impl Responder, AppError> {
    upload_for(&state, "projects", form).await
}

#[instrument(skip(_admin, state, form))]
pub async fn upload_news_images(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ImageUploadForm>,
) -> Result<impl Responder, AppError> {
    upload_for(&state, "news", form).await
}
