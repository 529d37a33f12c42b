use std::path::Path;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::{errors::StorageError, settings::AppConfig};

/// Content bucket that accepts binary objects and hands back a public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
}

/// `{resource}/{unix_millis}-{slugified name}.{ext}`
pub fn object_path(resource: &str, original_filename: Option<&str>, unix_millis: i64) -> String {
    let name = original_filename.unwrap_or("upload");
    let path = Path::new(name);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slug::slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}/{}-{}.{}", resource, unix_millis, stem, ext.to_lowercase()),
        None => format!("{}/{}-{}", resource, unix_millis, stem),
    }
}

struct Endpoint {
    base_url: String,
    service_key: Zeroizing<String>,
}

/// Storage REST API (`/storage/v1/object/...`) authenticated with a service key.
pub struct RestObjectStorage {
    client: reqwest::Client,
    endpoint: Option<Endpoint>,
    bucket: String,
}

impl RestObjectStorage {
    pub fn new(base_url: Option<&str>, service_key: Option<&str>, bucket: &str) -> Self {
        let endpoint = match (base_url, service_key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => Some(Endpoint {
                base_url: url.trim().trim_end_matches('/').to_string(),
                service_key: Zeroizing::new(key.trim().to_string()),
            }),
            _ => None,
        };

        RestObjectStorage {
            client: reqwest::Client::new(),
            endpoint,
            bucket: bucket.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.storage_url.as_deref(),
            config.storage_key.as_deref(),
            &config.storage_bucket,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn public_url(&self, base_url: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn put_object(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let endpoint = self.endpoint.as_ref().ok_or(StorageError::NotConfigured)?;
        let url = format!("{}/storage/v1/object/{}/{}", endpoint.base_url, self.bucket, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(endpoint.service_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected(status.as_u16(), body));
        }

        tracing::debug!(path, "Stored object");
        Ok(self.public_url(&endpoint.base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_is_resource_scoped_and_slugified() {
        let path = object_path("projects", Some("Bridge Repair (Final).JPG"), 1_700_000_000_000);
        assert_eq!(path, "projects/1700000000000-bridge-repair-final.jpg");
    }

    #[test]
    fn object_path_without_name() {
        assert_eq!(object_path("news", None, 5), "news/5-upload");
    }

    #[actix_rt::test]
    async fn unconfigured_storage_refuses_uploads() {
        let storage = RestObjectStorage::new(None, Some("key"), "content");
        assert!(!storage.is_configured());

        let err = storage.put_object("news/1-a.png", "image/png", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, StorageError::NotConfigured));
    }
}
