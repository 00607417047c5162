// SPDX-License-Identifier: MIT

//! Sign-up / sign-in / sign-out routes.
//!
//! Thin wrappers over the identity service. Federated providers (Google,
//! biometric unlock) terminate at the same boundary: anything that can
//! produce a verified UID+email pair can be issued a session token here.

use crate::error::Result;
use crate::middleware::auth::create_jwt;
use crate::models::Role;
use crate::services::identity::{LoginForm, SignupForm};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

const SESSION_COOKIE: &str = "trident_token";

/// Session response for both sign-up and sign-in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Register a new account and establish a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignupForm>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state.identity.sign_up(form).await?;
    let token = create_jwt(&user.uid, &user.email, &state.config.jwt_signing_key)?;

    Ok((
        jar.add(session_cookie(&token)),
        Json(AuthResponse {
            token,
            uid: user.uid,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }),
    ))
}

/// Password sign-in.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state.identity.sign_in(form).await?;
    let token = create_jwt(&user.uid, &user.email, &state.config.jwt_signing_key)?;

    Ok((
        jar.add(session_cookie(&token)),
        Json(AuthResponse {
            token,
            uid: user.uid,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }),
    ))
}

#[derive(Serialize)]
struct LogoutResponse {
    success: bool,
}

/// Sign out: destroy the server-side session (best effort) and clear the
/// cookie. Public so a client with an expired token can still clear state.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
        let validation = Validation::new(Algorithm::HS256);
        if let Ok(token_data) =
            decode::<crate::middleware::auth::Claims>(cookie.value(), &key, &validation)
        {
            state.identity.sign_out(&token_data.claims.sub);
        }
    }

    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(LogoutResponse { success: true }),
    )
}
