// handlers/users/register.rs - GET /users and POST /users

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::hash_password;
use crate::database::{list_users as list_page, models::NewUser};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult, Created, Links};
use crate::pagination::Page;

use super::{FETCH_FAILED, INVALID_USER};

const LIST_FAILED: &str = "Error fetching users list. Please try again later.";
const INSERT_FAILED: &str = "Failed to insert new user.";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub password: String,
}

impl RegisterRequest {
    fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.name.is_empty() && !self.password.is_empty()
    }
}

/// Paginated users, credential-free.
pub async fn list_users(State(state): State<AppState>, query: PageQuery) -> ApiResult<Page<User>> {
    let page = list_page(state.users.as_ref(), query.requested_page())
        .await
        .map_err(|e| ApiError::store_failure(e, LIST_FAILED))?;
    Ok(ApiResponse::success(page))
}

/// Create an account. All three fields must be non-empty, and both the
/// `userID` and the display name must be unused.
pub async fn register_post(
    State(state): State<AppState>,
    body: Option<Json<RegisterRequest>>,
) -> ApiResult<Created> {
    let Some(Json(request)) = body.filter(|Json(r)| r.is_complete()) else {
        return Err(ApiError::validation_error(INVALID_USER));
    };

    let name_taken = state
        .users
        .name_taken(&request.name)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?;
    let existing = state
        .users
        .find(&request.user_id)
        .await
        .map_err(|e| ApiError::store_failure(e, FETCH_FAILED))?;
    if name_taken || existing.is_some() {
        tracing::info!("Registration rejected for '{}': already in use", request.user_id);
        return Err(ApiError::validation_error(INVALID_USER));
    }

    let password_hash = hash_password(&request.password)?;
    let id = state
        .users
        .insert(NewUser {
            user_id: request.user_id.clone(),
            name: request.name,
            password_hash,
        })
        .await
        .map_err(|e| {
            // a concurrent registration took the key after the checks
            if e.is_unique_violation() {
                tracing::info!("Registration rejected for '{}': lost insert race", request.user_id);
                ApiError::validation_error(INVALID_USER)
            } else {
                ApiError::store_failure(e, INSERT_FAILED)
            }
        })?;

    tracing::info!("Registered user '{}'", request.user_id);
    Ok(ApiResponse::created(Created {
        id,
        links: Links::to("user", format!("/users/{}", request.user_id)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: &str, name: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            user_id: user_id.into(),
            name: name.into(),
            password: password.into(),
        }
    }

    #[test]
    fn every_field_is_required() {
        assert!(request("ada", "Ada", "secret").is_complete());
        assert!(!request("", "Ada", "secret").is_complete());
        assert!(!request("ada", "", "secret").is_complete());
        assert!(!request("ada", "Ada", "").is_complete());
    }
}
