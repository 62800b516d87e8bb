// ABOUTME: Password authentication endpoints using argon2 hashing
// ABOUTME: Establishes the user identity consumed by the access decision on every request

use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::AppError;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::{AppState, session};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username must not be empty".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if state
        .storage
        .get_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .storage
        .create_user(&req.username, &req.display_name, &password_hash)
        .await?;

    Ok(Json(RegisterResponse {
        success: true,
        user_id: user.id,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let user = state
        .storage
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let session_id = state.sessions.create_session(user.id, user.username.clone());

    let is_secure = false; // TODO: detect from request or config
    let session_cookie = session::create_session_cookie(session_id, is_secure);
    let jar = jar.add(session_cookie);

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user_id: user.id,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    if let Some(session_cookie) = jar.get(session::SESSION_COOKIE_NAME) {
        state.sessions.remove_session(session_cookie.value());
    }

    let logout_cookie = session::create_logout_cookie();
    let jar = jar.add(logout_cookie);

    Ok((jar, Json(serde_json::json!({"success": true}))))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(format!("Password hashing failed: {}", err)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
