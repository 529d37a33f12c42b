use std::sync::Arc;

use chrono::Utc;

use crate::{
    entities::validation::MAX_IMAGES,
    errors::AppError,
    settings::AppConfig,
    storage::{object_path, ObjectStorage},
};

/// One file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Declared type, falling back to sniffing the bytes when the client sent
    /// none or a generic one.
    fn mime_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(|t| t.split(';').next().unwrap_or(t).trim().to_lowercase())
            .filter(|t| !t.is_empty() && t != "application/octet-stream")
            .or_else(|| infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()))
    }

    fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("file")
    }
}

pub struct UploadHandler {
    storage: Arc<dyn ObjectStorage>,
    max_size: usize,
    allowed_types: Vec<String>,
}

impl UploadHandler {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_size: usize, allowed_types: Vec<String>) -> Self {
        UploadHandler { storage, max_size, allowed_types }
    }

    pub fn from_config(storage: Arc<dyn ObjectStorage>, config: &AppConfig) -> Self {
        Self::new(storage, config.max_upload_size, config.upload_types())
    }

    /// Checks every file, returning the resolved MIME types in order.
    fn check_files(&self, files: &[UploadedFile]) -> Result<Vec<String>, AppError> {
        if files.is_empty() {
            return Err(AppError::UploadError("No files uploaded".into()));
        }
        if files.len() > MAX_IMAGES {
            return Err(AppError::UploadError(format!("At most {} images can be uploaded at once", MAX_IMAGES)));
        }

        files
            .iter()
            .map(|file| {
                let mime = file.mime_type().ok_or_else(|| {
                    AppError::UploadError(format!("Could not determine the type of {}", file.display_name()))
                })?;

                if !self.allowed_types.iter().any(|allowed| *allowed == mime) {
                    return Err(AppError::UploadError(format!(
                        "Invalid file type {} for {}. Allowed types: {}",
                        mime,
                        file.display_name(),
                        self.allowed_types.join(", ")
                    )));
                }
                if file.bytes.is_empty() {
                    return Err(AppError::UploadError(format!("{} is empty", file.display_name())));
                }
                if file.bytes.len() > self.max_size {
                    return Err(AppError::UploadError(format!(
                        "{} exceeds the maximum size of {} bytes",
                        file.display_name(),
                        self.max_size
                    )));
                }

                Ok(mime)
            })
            .collect()
    }

    /// Validates the whole batch, then stores each file under
    /// `{resource}/{millis}-{name}`. Files already stored stay stored if a
    /// later one fails.
    pub async fn upload_images(&self, resource: &str, files: Vec<UploadedFile>) -> Result<Vec<String>, AppError> {
        let mime_types = self.check_files(&files)?;

        let mut urls = Vec::with_capacity(files.len());
        for (file, mime) in files.into_iter().zip(mime_types) {
            let path = object_path(resource, file.file_name.as_deref(), Utc::now().timestamp_millis());
            let url = self.storage.put_object(&path, &mime, file.bytes).await?;
            urls.push(url);
        }

        tracing::info!(resource, count = urls.len(), "Images uploaded");
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::bucket::MockObjectStorage;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn handler(storage: MockObjectStorage) -> UploadHandler {
        UploadHandler::new(
            Arc::new(storage),
            16,
            vec!["image/jpeg".into(), "image/png".into(), "image/webp".into()],
        )
    }

    fn file(name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    #[actix_rt::test]
    async fn disallowed_type_stores_nothing() {
        let mut storage = MockObjectStorage::new();
        storage.expect_put_object().times(0);

        let files = vec![
            file("ok.png", Some("image/png"), PNG_MAGIC.to_vec()),
            file("notes.pdf", Some("application/pdf"), vec![1, 2, 3]),
        ];

        let err = handler(storage).upload_images("projects", files).await.unwrap_err();
        assert!(matches!(err, AppError::UploadError(msg) if msg.contains("application/pdf")));
    }

    #[actix_rt::test]
    async fn oversized_file_is_rejected() {
        let mut storage = MockObjectStorage::new();
        storage.expect_put_object().times(0);

        let files = vec![file("big.png", Some("image/png"), vec![0; 17])];
        assert!(handler(storage).upload_images("news", files).await.is_err());
    }

    #[actix_rt::test]
    async fn undeclared_type_is_sniffed() {
        let mut storage = MockObjectStorage::new();
        storage
            .expect_put_object()
            .withf(|path, content_type, _| path.starts_with("news/") && content_type == "image/png")
            .times(1)
            .returning(|path, _, _| Ok(format!("https://cdn.example/{}", path)));

        let files = vec![file("Photo 1.png", None, PNG_MAGIC.to_vec())];
        let urls = handler(storage).upload_images("news", files).await.unwrap();

        assert_eq!(urls.len(), 1);
        assert!(urls[0].ends_with("-photo-1.png"));
    }

    #[actix_rt::test]
    async fn more_than_six_files_are_rejected() {
        let files = (0..7)
            .map(|i| file(&format!("{i}.png"), Some("image/png"), PNG_MAGIC.to_vec()))
            .collect();

        assert!(handler(MockObjectStorage::new()).upload_images("projects", files).await.is_err());
    }
}
