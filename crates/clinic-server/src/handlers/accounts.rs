//! Account handlers: registration and login.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use clinic_api::ApiError;
use clinic_auth::{hash_password, verify_password};
use clinic_storage::{NewUser, Role};

use crate::server::AppState;

/// Single construction point so the unknown-email and wrong-password paths
/// return byte-identical bodies (no user enumeration).
fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid email or password")
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /register - Create a user account.
///
/// The password is hashed before it reaches storage; the response never
/// contains password material. Storage failures (including duplicate
/// email) surface as 500 with the adapter's error text.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|_| ApiError::bad_request("invalid request body"))?;

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = state
        .accounts
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
        })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "user registered successfully",
            "user": user,
        })),
    ))
}

/// POST /login - Authenticate and issue a token.
///
/// Unknown email and wrong password are deliberately indistinguishable.
/// The token is returned raw; clients prepend "Bearer " themselves.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|_| ApiError::bad_request("invalid request body"))?;

    let user = state
        .accounts
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(invalid_credentials)?;

    let matches = verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !matches {
        return Err(invalid_credentials());
    }

    let token = state
        .auth
        .jwt
        .issue(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

    Ok(Json(json!({
        "message": "login successful",
        "token": token,
        "role": user.role,
    })))
}
