// handlers/users/login.rs - POST /users/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::verify_password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::FETCH_FAILED;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Why a login was refused. Logged, never shown: the client sees one 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRejection {
    UnknownUser,
    WrongPassword,
}

impl LoginRejection {
    fn into_error(self, user_id: &str) -> ApiError {
        tracing::warn!("Login failed for '{}': {:?}", user_id, self);
        ApiError::unauthorized(INVALID_CREDENTIALS)
    }
}

/// Exchange `userID` and `password` for a bearer token.
pub async fn login_post(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> ApiResult<LoginResponse> {
    let Some(Json(request)) = body else {
        return Err(ApiError::validation_error(FETCH_FAILED));
    };
    if request.user_id.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation_error(FETCH_FAILED));
    }

    let credential = state
        .users
        .find_credential(&request.user_id)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?
        .ok_or_else(|| LoginRejection::UnknownUser.into_error(&request.user_id))?;

    if !verify_password(&request.password, &credential.password_hash)? {
        return Err(LoginRejection::WrongPassword.into_error(&request.user_id));
    }

    let token = state.tokens.issue(&credential.user_id)?;
    tracing::info!("User '{}' logged in", credential.user_id);
    Ok(ApiResponse::success(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn rejections_share_one_answer() {
        let unknown = LoginRejection::UnknownUser.into_error("u1");
        let wrong = LoginRejection::WrongPassword.into_error("u1");
        assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.message(), wrong.message());
        assert_eq!(wrong.message(), "Invalid credentials.");
    }
}
