use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};

use crate::api::state::AppState;
use crate::db::SessionRepository;
use crate::error::AppError;

/// Name of the signed cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sid";

/// One-shot flash message cookie, consumed on the next form render.
pub const FLASH_COOKIE: &str = "flash";

/// The authenticated user context attached to a request once its session
/// cookie resolves to a live session.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

/// Authentication middleware - resolves the session cookie and gates
/// protected routes. Anonymous browsers are sent to the login form;
/// anonymous API callers get a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = SignedCookieJar::from_headers(request.headers(), state.cookie_key.clone());

    let identity = match jar.get(SESSION_COOKIE) {
        Some(cookie) => SessionRepository::get_by_token(&state.db, cookie.value())
            .await?
            .map(|session| Identity {
                user_id: session.user_id,
            }),
        None => None,
    };

    match identity {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        None if prefers_html(&request) => Ok(Redirect::to("/login").into_response()),
        None => Err(AppError::Unauthenticated),
    }
}

fn prefers_html(request: &Request) -> bool {
    request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Queue a message for the next rendered form.
pub fn set_flash(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, message.to_string()))
            .path("/")
            .http_only(true)
            .build(),
    )
}

/// Read and clear the pending flash message, if any.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let message = cookie.value().to_string();
            let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
            (jar, Some(message))
        }
        None => (jar, None),
    }
}
