// handlers/protected/user.rs - GET/PUT/PATCH /api/user/me/

use axum::extract::{Extension, State};

use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonPayload};
use crate::serializers::{UserOut, UserPayload};
use crate::state::AppState;

/// GET /api/user/me/ - Profile of the authenticated user
pub async fn get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserOut> {
    Ok(ApiResponse::success(UserOut {
        email: auth_user.email,
        name: auth_user.name,
    }))
}

/// PUT /api/user/me/ - Replace email, name and password
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<UserOut> {
    let user = state.users().update_profile(auth_user.id, UserPayload(body), false).await?;
    Ok(ApiResponse::success(UserOut::from(&user)))
}

/// PATCH /api/user/me/ - Change only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<UserOut> {
    let user = state.users().update_profile(auth_user.id, UserPayload(body), true).await?;
    Ok(ApiResponse::success(UserOut::from(&user)))
}
