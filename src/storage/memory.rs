use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::crypto::signed_download_url;
use crate::error::AppError;
use crate::storage::{validate_batch, MediaStore, StoredFile, UploadFile};

/// In-process media backend for development and tests. Runs the same
/// validation as the cloud backend and hands out `memory://` URLs.
pub struct MemoryMediaStore {
    secret: String,
    folder: String,
    next_id: AtomicU64,
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStore {
    pub fn new(secret: String, folder: String) -> Self {
        Self {
            secret,
            folder,
            next_id: AtomicU64::new(1),
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<StoredFile>, AppError> {
        validate_batch(&files)?;

        let mut stored = Vec::with_capacity(files.len());
        let mut blobs = self
            .files
            .lock()
            .map_err(|_| AppError::Internal("media store poisoned".to_string()))?;

        for file in files {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let ext = crate::storage::extension_of(&file.original_name)
                .unwrap_or_else(|| "bin".to_string());
            let url = format!("memory://{}/{:08x}.{}", self.folder, id, ext);

            blobs.insert(url.clone(), file.bytes);
            stored.push(StoredFile {
                url,
                original_name: file.original_name,
            });
        }

        Ok(stored)
    }

    fn sign_download(&self, file_url: &str) -> String {
        signed_download_url(file_url, &self.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryMediaStore {
        MemoryMediaStore::new("test-secret".to_string(), "notes".to_string())
    }

    #[tokio::test]
    async fn test_upload_preserves_names_and_order() {
        let media = store();
        let stored = media
            .upload(vec![
                UploadFile {
                    original_name: "one.png".into(),
                    bytes: vec![1],
                },
                UploadFile {
                    original_name: "two.pdf".into(),
                    bytes: vec![2],
                },
            ])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].original_name, "one.png");
        assert_eq!(stored[1].original_name, "two.pdf");
        assert!(stored[0].url.ends_with(".png"));
        assert_eq!(media.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_batch_stores_nothing() {
        let media = store();
        let err = media
            .upload(vec![
                UploadFile {
                    original_name: "fine.png".into(),
                    bytes: vec![1],
                },
                UploadFile {
                    original_name: "nope.exe".into(),
                    bytes: vec![2],
                },
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType(_)));
        assert!(media.is_empty());
    }

    #[tokio::test]
    async fn test_signed_download_references_the_url() {
        let media = store();
        let stored = media
            .upload(vec![UploadFile {
                original_name: "one.png".into(),
                bytes: vec![1],
            }])
            .await
            .unwrap();

        let signed = media.sign_download(&stored[0].url);
        assert!(signed.starts_with(&stored[0].url));
        assert!(signed.contains("?_a="));
        assert!(!signed.contains("test-secret"));
    }
}
