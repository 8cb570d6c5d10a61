// handlers/protected/recipe/recipe.rs - /api/recipe/recipes/ collection, record and image upload

use axum::extract::{
    multipart::{Multipart, MultipartRejection},
    rejection::PathRejection,
    Extension, Path, Query, State,
};
use serde::Deserialize;

use super::utils::{list_options, record_id};
use crate::access::{parse_id_list, ImageUpload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonPayload};
use crate::serializers::{RecipeDetailOut, RecipeImageOut, RecipeOut, RecipePayload};
use crate::state::AppState;

/// Multipart field carrying the uploaded file
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    /// Comma-separated tag ids. Examples: tags=3, tags=1,2
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// GET /api/recipe/recipes/ - The caller's recipes, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecipeQuery>,
) -> ApiResult<Vec<RecipeOut>> {
    let tags = parse_id_list("tags", query.tags.as_deref())?;
    let ingredients = parse_id_list("ingredients", query.ingredients.as_deref())?;
    let options = list_options(query.limit.as_deref(), query.offset.as_deref())?;

    let recipes = state
        .recipes()
        .list(&auth_user.identity(), tags.as_deref(), ingredients.as_deref(), &options)
        .await?;
    Ok(ApiResponse::success(recipes.iter().map(RecipeOut::from).collect()))
}

/// POST /api/recipe/recipes/ - Create a recipe owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<RecipeOut> {
    let recipe = state.recipes().create(&auth_user.identity(), RecipePayload(body)).await?;
    Ok(ApiResponse::created(RecipeOut::from(&recipe)))
}

/// GET /api/recipe/recipes/:id/ - Detail view with nested tags and ingredients
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<RecipeDetailOut> {
    let id = record_id(id)?;
    let recipes = state.recipes();
    let detail = recipes.retrieve_detail(&auth_user.identity(), id).await?;
    Ok(ApiResponse::success(RecipeDetailOut::new(
        &detail.recipe,
        &detail.tags,
        &detail.ingredients,
        recipes.images(),
    )))
}

/// PUT /api/recipe/recipes/:id/ - Replace all writable fields
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<RecipeOut> {
    let id = record_id(id)?;
    let recipe = state
        .recipes()
        .update(&auth_user.identity(), id, RecipePayload(body), false)
        .await?;
    Ok(ApiResponse::success(RecipeOut::from(&recipe)))
}

/// PATCH /api/recipe/recipes/:id/ - Change only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    JsonPayload(body): JsonPayload,
) -> ApiResult<RecipeOut> {
    let id = record_id(id)?;
    let recipe = state
        .recipes()
        .update(&auth_user.identity(), id, RecipePayload(body), true)
        .await?;
    Ok(ApiResponse::success(RecipeOut::from(&recipe)))
}

/// DELETE /api/recipe/recipes/:id/ - Remove the recipe and its links
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = record_id(id)?;
    state.recipes().delete(&auth_user.identity(), id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/recipe/recipes/:id/upload-image/ - Store a new image (multipart field `image`)
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<RecipeImageOut> {
    let id = record_id(id)?;
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let upload = read_image_field(&mut multipart).await?;

    let recipes = state.recipes();
    let recipe = recipes.upload_image(&auth_user.identity(), id, upload).await?;
    Ok(ApiResponse::success(RecipeImageOut::new(&recipe, recipes.images())))
}

/// First `image` field of the body, `None` when the client sent no such field
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<ImageUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok(Some(ImageUpload {
            filename,
            data: data.to_vec(),
        }));
    }
    Ok(None)
}
