use std::sync::Arc;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::{Pool, Sqlite};
use crate::config::Config;
use crate::storage::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Arc<Config>,
    pub media: Arc<dyn MediaStore>,
    pub cookie_key: Key,
}

// Lets SignedCookieJar extract its signing key straight from the state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
