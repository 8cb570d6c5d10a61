// handlers/protected/recipe/tag.rs - GET/POST /api/recipe/tags/

use axum::extract::{Extension, Query, State};

use super::utils::{list_named, NamedQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonPayload};
use crate::serializers::{NamedOut, TagPayload};
use crate::state::AppState;

/// GET /api/recipe/tags/ - The caller's tags, by name descending
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<NamedQuery>,
) -> ApiResult<Vec<NamedOut>> {
    let tags = list_named(&state.tags(), &auth_user.identity(), &query).await?;
    Ok(ApiResponse::success(tags))
}

/// POST /api/recipe/tags/ - Create a tag owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<NamedOut> {
    let tag = state.tags().create(&auth_user.identity(), TagPayload(body)).await?;
    Ok(ApiResponse::created(NamedOut::from(&tag)))
}
