use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::bearer_token;
use crate::error::ApiError;

/// Authenticated identity extracted from the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    /// Reject with 403 unless the caller is `user_id`.
    pub fn ensure_is(&self, user_id: &str) -> Result<(), ApiError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            tracing::warn!(
                "User '{}' denied access to resources of '{}'",
                self.user_id,
                user_id
            );
            Err(ApiError::forbidden())
        }
    }
}

/// Bearer-token middleware: verifies the token and injects [`AuthUser`].
/// Never touches a store.
pub async fn require_authentication(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let user_id = state.tokens.verify(token)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
