use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::crypto::signing::{hmac_hex, signed_download_url};
use crate::error::AppError;
use crate::storage::{validate_batch, MediaStore, StoredFile, UploadFile};

/// HTTP client for the external media service. Files land under a configured
/// folder in the service's object store; the service answers with a durable
/// reference URL per file.
pub struct CloudMediaStore {
    http: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudMediaStore {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.media_api_base.trim_end_matches('/').to_string(),
            cloud_name: config.media_cloud_name.clone(),
            api_key: config.media_api_key.clone(),
            api_secret: config.media_api_secret.clone(),
            folder: config.media_folder.clone(),
        }
    }

    fn upload_endpoint(&self) -> String {
        format!("{}/{}/auto/upload", self.api_base, self.cloud_name)
    }

    async fn upload_one(&self, file: UploadFile) -> Result<StoredFile, AppError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = hmac_hex(
            &self.api_secret,
            &format!("folder={}&timestamp={}", self.folder, timestamp),
        );

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.original_name.clone());
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .part("file", part);

        let response = self
            .http
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::AttachmentUpload(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::AttachmentUpload(e.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::AttachmentUpload(e.to_string()))?;

        Ok(StoredFile {
            url: body.secure_url,
            original_name: file.original_name,
        })
    }
}

#[async_trait]
impl MediaStore for CloudMediaStore {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<StoredFile>, AppError> {
        validate_batch(&files)?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let name = file.original_name.clone();
            let uploaded = self.upload_one(file).await?;
            tracing::debug!(file = %name, url = %uploaded.url, "attachment uploaded");
            stored.push(uploaded);
        }

        Ok(stored)
    }

    fn sign_download(&self, file_url: &str) -> String {
        signed_download_url(file_url, &self.api_secret)
    }
}
