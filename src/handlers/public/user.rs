// handlers/public/user.rs - Account registration and token issuance

use axum::extract::State;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, JsonPayload};
use crate::serializers::{CredentialsPayload, UserOut, UserPayload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub token: String,
}

/// POST /api/user/create/ - Register a new account
///
/// Input: `{"email", "password", "name"}`. Output (201): `{"email", "name"}`.
pub async fn create(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<UserOut> {
    let user = state.users().register(UserPayload(body)).await?;
    Ok(ApiResponse::created(UserOut::from(&user)))
}

/// POST /api/user/token/ - Exchange email and password for a bearer token
pub async fn token(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<TokenOut> {
    let token = state.users().issue_token(CredentialsPayload(body)).await?;
    Ok(ApiResponse::success(TokenOut { token }))
}
