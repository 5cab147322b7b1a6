// rest/routes/auth.rs — account registration and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{bad_request, conflict, internal, unauthorized, ApiError};
use crate::auth;
use crate::AppContext;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let username = body.username.trim();
    if username.len() < 3 || username.len() > 30 || !username.chars().all(char::is_alphanumeric) {
        return Err(bad_request("username must be 3-30 alphanumeric characters"));
    }
    if !valid_email(body.email.trim()) {
        return Err(bad_request("email must be a valid email address"));
    }
    if body.password.len() < 6 {
        return Err(bad_request("password must be at least 6 characters"));
    }
    let email = body.email.trim().to_lowercase();

    let taken = ctx
        .storage
        .identity_taken(username, &email)
        .await
        .map_err(|_| internal("Database error"))?;
    if taken {
        return Err(conflict("User already exists"));
    }

    let password_hash =
        auth::hash_password(&body.password).map_err(|_| internal("Failed to create user"))?;
    let user = ctx
        .storage
        .create_user(username, &email, &password_hash)
        .await
        .map_err(|_| internal("Failed to create user"))?;
    let token = auth::issue_token(&ctx.config.jwt_secret, &user.id, &user.username)
        .map_err(|_| internal("Failed to create user"))?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "user": { "id": user.id, "username": user.username, "email": user.email },
        })),
    ))
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = body.email.trim().to_lowercase();
    let user = ctx
        .storage
        .get_user_by_email(&email)
        .await
        .map_err(|_| internal("Database error"))?
        // Unknown user and wrong password are indistinguishable on purpose.
        .ok_or_else(|| unauthorized("Invalid credentials"))?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(unauthorized("Invalid credentials"));
    }

    let token = auth::issue_token(&ctx.config.jwt_secret, &user.id, &user.username)
        .map_err(|_| internal("Login failed"))?;

    Ok(Json(json!({
        "token": token,
        "user": { "id": user.id, "username": user.username, "email": user.email },
    })))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
