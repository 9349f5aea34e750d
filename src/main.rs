use std::sync::Arc;
use std::time::Duration;
use axum_extra::extract::cookie::Key;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notekeeper::{
    api::{create_router, AppState},
    config::Config,
    db::SessionRepository,
    error::AppError,
    storage::{CloudMediaStore, MediaStore, MemoryMediaStore},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notekeeper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting notekeeper v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Setup database with proper connection pooling
    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Database connected: {}", config.database_url);

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    tracing::info!("✅ Database migrations completed");

    // Pick the media backend
    let media: Arc<dyn MediaStore> = match config.media_backend.as_str() {
        "cloud" => Arc::new(CloudMediaStore::new(&config)),
        "memory" => Arc::new(MemoryMediaStore::new(
            config.media_api_secret.clone(),
            config.media_folder.clone(),
        )),
        other => {
            return Err(AppError::Config(format!(
                "Unknown MEDIA_BACKEND '{}' (expected 'cloud' or 'memory')",
                other
            )))
        }
    };
    tracing::info!("✅ Media backend ready: {}", config.media_backend);

    // Create shared application state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        media,
        cookie_key: Key::derive_from(config.session_secret.as_bytes()),
    };

    // Spawn background task for session cleanup
    {
        let db_clone = db.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600)); // Every hour
            loop {
                interval.tick().await;
                match SessionRepository::cleanup_expired(&db_clone).await {
                    Ok(_) => tracing::debug!("🧹 Expired sessions cleaned up"),
                    Err(e) => tracing::error!("❌ Session cleanup failed: {}", e),
                }
            }
        });
        tracing::info!("✅ Session cleanup task started (runs hourly)");
    }

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("");
    tracing::info!("📚 Routes:");
    tracing::info!("  GET/POST /register   - Create an account");
    tracing::info!("  GET/POST /login      - Start a session");
    tracing::info!("  POST     /logout     - End the session");
    tracing::info!("  GET      /notes      - Your notes (requires auth)");
    tracing::info!("  POST     /notes      - Create a note (multipart, ≤5 files)");
    tracing::info!("  PUT      /notes/:id  - Update a note, attachments append");
    tracing::info!("  DELETE   /notes/:id  - Delete a note");
    tracing::info!("  POST     /download   - Signed attachment download");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
