use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: i64,
    pub created_at: i64,
}

/// A note and its accumulated attachments. `file_urls` and `file_names` are
/// index-aligned: entry `i` of both refers to the same stored file.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub file_urls: Json<Vec<String>>,
    pub file_names: Json<Vec<String>>,
    pub created_at: i64,
}

impl Note {
    /// Attachments as (url, original name) pairs.
    pub fn attachments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.file_urls
            .0
            .iter()
            .zip(self.file_names.0.iter())
            .map(|(u, n)| (u.as_str(), n.as_str()))
    }
}
