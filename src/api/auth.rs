use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;

use crate::api::middleware::{set_flash, take_flash, SESSION_COOKIE};
use crate::api::state::AppState;
use crate::crypto::{hash_password, verify_password};
use crate::db::{SessionRepository, UserRepository};
use crate::error::AppError;
use crate::views;

/// Shown for both unknown email and wrong password, so the form never
/// confirms whether an address is registered.
const LOGIN_FAILED: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// GET /register
pub async fn register_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::register_form(flash.as_deref())))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        return Ok((
            set_flash(jar, "Username, email and password are all required"),
            Redirect::to("/register"),
        ));
    }

    // Friendly pre-check; the UNIQUE index below is the real guard
    if UserRepository::get_by_email(&state.db, email).await?.is_some() {
        return Ok((
            set_flash(jar, "An account with this email already exists"),
            Redirect::to("/register"),
        ));
    }

    let password_hash = hash_password(&form.password)?;

    match UserRepository::create(&state.db, username, email, &password_hash).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok((
                set_flash(jar, "Account created, please log in"),
                Redirect::to("/login"),
            ))
        }
        Err(AppError::DuplicateUser) => Ok((
            set_flash(jar, "An account with this email already exists"),
            Redirect::to("/register"),
        )),
        Err(e) => Err(e),
    }
}

/// GET /login
pub async fn login_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::login_form(flash.as_deref())))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let email = form.email.trim();

    let user = match UserRepository::get_by_email(&state.db, email).await? {
        Some(user) => user,
        None => {
            // The reason stays in the logs; the client sees one message
            tracing::warn!(email, "login failed: no such user");
            return Ok((set_flash(jar, LOGIN_FAILED), Redirect::to("/login")));
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        tracing::warn!(email, "login failed: bad password");
        return Ok((set_flash(jar, LOGIN_FAILED), Redirect::to("/login")));
    }

    let session =
        SessionRepository::create(&state.db, user.id, state.config.session_expiry_hours).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/notes")))
}

/// POST /logout (requires auth)
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        SessionRepository::delete(&state.db, cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Redirect::to("/login")))
}
