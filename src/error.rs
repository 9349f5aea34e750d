use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid email or password")]
    AuthFailure,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("note not found")]
    NotFound,

    #[error("an account with this email already exists")]
    DuplicateUser,

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("attachment upload failed: {0}")]
    AttachmentUpload(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// Axum IntoResponse implementation for HTTP errors
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateUser => StatusCode::CONFLICT,
            AppError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            AppError::AttachmentUpload(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
