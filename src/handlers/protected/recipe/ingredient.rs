// handlers/protected/recipe/ingredient.rs - GET/POST /api/recipe/ingredients/

use axum::extract::{Extension, Query, State};

use super::utils::{list_named, NamedQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonPayload};
use crate::serializers::{IngredientPayload, NamedOut};
use crate::state::AppState;

/// GET /api/recipe/ingredients/ - The caller's ingredients, by name descending
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<NamedQuery>,
) -> ApiResult<Vec<NamedOut>> {
    let ingredients = list_named(&state.ingredients(), &auth_user.identity(), &query).await?;
    Ok(ApiResponse::success(ingredients))
}

/// POST /api/recipe/ingredients/ - Create an ingredient owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<NamedOut> {
    let ingredient = state.ingredients().create(&auth_user.identity(), IngredientPayload(body)).await?;
    Ok(ApiResponse::created(NamedOut::from(&ingredient)))
}
