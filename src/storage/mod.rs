pub mod cloud;
pub mod memory;

pub use cloud::CloudMediaStore;
pub use memory::MemoryMediaStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

/// Most files a single request may attach.
pub const MAX_FILES_PER_UPLOAD: usize = 5;

/// Extensions the media service accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "xlsx", "docx", "ppt"];

/// A file received from the client, prior to upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// A file the media service has accepted: a durable reference URL plus the
/// name the client uploaded it under.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub url: String,
    pub original_name: String,
}

/// Capability interface over the external media service.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a batch of files. The whole batch is validated before anything
    /// is sent, so a rejected batch uploads nothing.
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<StoredFile>, AppError>;

    /// Time-scoped signed download reference for a stored file URL.
    fn sign_download(&self, file_url: &str) -> String;
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Count and extension checks shared by every backend.
pub(crate) fn validate_batch(files: &[UploadFile]) -> Result<(), AppError> {
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(AppError::Validation(format!(
            "at most {} files per upload",
            MAX_FILES_PER_UPLOAD
        )));
    }

    for file in files {
        let ext = extension_of(&file.original_name)
            .ok_or_else(|| AppError::UnsupportedFileType(file.original_name.clone()))?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::UnsupportedFileType(file.original_name.clone()));
        }
    }

    Ok(())
}
