use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::access::Identity;
use crate::auth;
use crate::database::models::{User, UserId};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id)
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_staff: user.is_staff,
        }
    }
}

/// JWT authentication middleware that validates tokens and loads the active user
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, &headers).await {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(api_error) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), api_error);
            api_error.into_response()
        }
    }
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;
    let claims = auth::validate_jwt(&token)?;
    let user_id = claims.user_id()?;

    match state.users().find_active(user_id).await? {
        Some(user) => Ok(AuthUser::from(&user)),
        None => Err(ApiError::unauthorized("User inactive or deleted")),
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Authentication credentials were not provided".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
