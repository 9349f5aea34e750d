use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub session_expiry_hours: i64,
    pub session_secret: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub max_upload_bytes: usize,
    pub media_backend: String,
    pub media_api_base: String,
    pub media_cloud_name: String,
    pub media_api_key: String,
    pub media_api_secret: String,
    pub media_folder: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Config {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://notekeeper.db".to_string()),
            session_expiry_hours: std::env::var("SESSION_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid SESSION_EXPIRY_HOURS: {}", e)))?,
            session_secret: std::env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "insecure-dev-session-secret-0123456789".to_string()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?,
            db_min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MIN_CONNECTIONS: {}", e)))?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid MAX_UPLOAD_BYTES: {}", e)))?,
            media_backend: std::env::var("MEDIA_BACKEND")
                .unwrap_or_else(|_| "memory".to_string()),
            media_api_base: std::env::var("MEDIA_API_BASE").unwrap_or_default(),
            media_cloud_name: std::env::var("MEDIA_CLOUD_NAME").unwrap_or_default(),
            media_api_key: std::env::var("MEDIA_API_KEY").unwrap_or_default(),
            media_api_secret: std::env::var("MEDIA_API_SECRET")
                .unwrap_or_else(|_| "insecure-dev-media-secret".to_string()),
            media_folder: std::env::var("MEDIA_FOLDER")
                .unwrap_or_else(|_| "notes".to_string()),
        };

        // Cookie key derivation needs at least 32 bytes of material
        if config.session_secret.len() < 32 {
            return Err(AppError::Config(
                "SESSION_SECRET must be at least 32 bytes".to_string(),
            ));
        }

        if config.media_backend == "cloud"
            && (config.media_api_base.is_empty()
                || config.media_cloud_name.is_empty()
                || config.media_api_key.is_empty())
        {
            return Err(AppError::Config(
                "MEDIA_BACKEND=cloud requires MEDIA_API_BASE, MEDIA_CLOUD_NAME and MEDIA_API_KEY"
                    .to_string(),
            ));
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
