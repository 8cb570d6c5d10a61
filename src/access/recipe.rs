use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{AccessError, Identity, ListOptions, OwnedAccess};
use crate::database::models::{Ingredient, Recipe, Tag};
use crate::database::{RecipeStore, Store};
use crate::filter::filter_order::FilterOrder;
use crate::serializers::{FieldErrors, RecipePayload, Validate};
use crate::services::image_store::{ImageError, ImageStorage};

/// A recipe with its linked rows resolved
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

/// Uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Ownership-scoped recipe operations: the generic contract plus link
/// filtering, updates, deletion and image upload.
pub struct RecipeAccess<S: ?Sized> {
    store: Arc<S>,
    recipes: OwnedAccess<Recipe, S>,
    tags: OwnedAccess<Tag, S>,
    ingredients: OwnedAccess<Ingredient, S>,
    images: ImageStorage,
}

impl<S: Store + ?Sized> RecipeAccess<S> {
    pub fn new(store: Arc<S>, images: ImageStorage) -> Self {
        Self {
            recipes: OwnedAccess::new(Arc::clone(&store)),
            tags: OwnedAccess::new(Arc::clone(&store)),
            ingredients: OwnedAccess::new(Arc::clone(&store)),
            store,
            images,
        }
    }

    pub fn images(&self) -> &ImageStorage {
        &self.images
    }

    /// Owned recipes linked to any of `tag_ids` (when given) and to any of
    /// `ingredient_ids` (when given), newest first.
    pub async fn list(
        &self,
        identity: &Identity,
        tag_ids: Option<&[i64]>,
        ingredient_ids: Option<&[i64]>,
        options: &ListOptions,
    ) -> Result<Vec<Recipe>, AccessError> {
        let mut filter = self.recipes.filter(options)?;
        if let Some(ids) = tag_ids {
            filter = filter.where_any("tags", ids)?;
        }
        if let Some(ids) = ingredient_ids {
            filter = filter.where_any("ingredients", ids)?;
        }
        self.recipes.list(identity, filter).await
    }

    pub async fn retrieve(&self, identity: &Identity, id: i64) -> Result<Recipe, AccessError> {
        self.recipes.retrieve(identity, id).await
    }

    pub async fn retrieve_detail(&self, identity: &Identity, id: i64) -> Result<RecipeDetail, AccessError> {
        let recipe = self.recipes.retrieve(identity, id).await?;

        let by_id = FilterOrder::parse("id asc");
        let tags = self.tags.filter(&ListOptions::default())?
            .order(by_id.clone())?
            .where_in("id", &recipe.tag_ids)?;
        let ingredients = self.ingredients.filter(&ListOptions::default())?
            .order(by_id)?
            .where_in("id", &recipe.ingredient_ids)?;

        Ok(RecipeDetail {
            tags: self.tags.list(identity, tags).await?,
            ingredients: self.ingredients.list(identity, ingredients).await?,
            recipe,
        })
    }

    pub async fn create(&self, identity: &Identity, payload: RecipePayload) -> Result<Recipe, AccessError> {
        let fields = payload.validate()?;
        self.check_links(identity, Some(fields.tag_ids.as_slice()), Some(fields.ingredient_ids.as_slice()))
            .await?;
        self.recipes.insert(identity, fields).await
    }

    /// PUT when `partial` is false, PATCH otherwise. Owner never changes.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        payload: RecipePayload,
        partial: bool,
    ) -> Result<Recipe, AccessError> {
        let recipe = self.recipes.retrieve(identity, id).await?;
        let changes = payload.changes(partial)?;
        self.check_links(identity, changes.tag_ids.as_deref(), changes.ingredient_ids.as_deref())
            .await?;

        let updated = self.store.update_recipe(recipe.id, changes).await?;
        debug!("Updated recipe {} for user {}", id, identity.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, identity: &Identity, id: i64) -> Result<(), AccessError> {
        let recipe = self.recipes.retrieve(identity, id).await?;
        self.store.delete_recipe(recipe.id).await?;

        if let Some(image) = recipe.image.as_deref() {
            if let Err(e) = self.images.remove(image).await {
                warn!("Failed to remove image {} of deleted recipe {}: {}", image, id, e);
            }
        }
        info!("Deleted recipe {} for user {}", id, identity.user_id);
        Ok(())
    }

    /// Validate and store a new image for an owned recipe.
    ///
    /// Nothing changes when the bytes are not an acceptable image. The file is
    /// written before the row is updated and removed again if the update fails.
    pub async fn upload_image(
        &self,
        identity: &Identity,
        id: i64,
        upload: Option<ImageUpload>,
    ) -> Result<Recipe, AccessError> {
        let recipe = self.recipes.retrieve(identity, id).await?;
        let Some(upload) = upload else {
            return Err(FieldErrors::single("image", "No file was submitted.").into());
        };

        let format = self.images.validate(&upload.data).map_err(image_field_error)?;
        let path = ImageStorage::recipe_image_path(upload.filename.as_deref(), format);
        self.images.save(&path, &upload.data).await?;

        let updated = match self.store.set_recipe_image(recipe.id, Some(path.clone())).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Err(cleanup) = self.images.remove(&path).await {
                    warn!("Failed to remove orphaned image {}: {}", path, cleanup);
                }
                return Err(e.into());
            }
        };

        if let Some(previous) = recipe.image.as_deref() {
            if let Err(e) = self.images.remove(previous).await {
                warn!("Failed to remove replaced image {}: {}", previous, e);
            }
        }
        info!("Stored image {} for recipe {}", path, id);
        Ok(updated)
    }

    /// Every referenced id must name a row the identity owns. Unknown and
    /// foreign ids get the same message.
    async fn check_links(
        &self,
        identity: &Identity,
        tag_ids: Option<&[i64]>,
        ingredient_ids: Option<&[i64]>,
    ) -> Result<(), AccessError> {
        let mut errors = FieldErrors::new();

        if let Some(ids) = tag_ids.filter(|ids| !ids.is_empty()) {
            let owned: Vec<i64> = self.tags.owned_among(identity, ids).await?.iter().map(|t| t.id).collect();
            if let Some(missing) = ids.iter().find(|id| !owned.contains(*id)) {
                errors.add("tags", format!("Invalid pk \"{}\" - object does not exist.", missing));
            }
        }
        if let Some(ids) = ingredient_ids.filter(|ids| !ids.is_empty()) {
            let owned: Vec<i64> = self
                .ingredients
                .owned_among(identity, ids)
                .await?
                .iter()
                .map(|i| i.id)
                .collect();
            if let Some(missing) = ids.iter().find(|id| !owned.contains(*id)) {
                errors.add("ingredients", format!("Invalid pk \"{}\" - object does not exist.", missing));
            }
        }

        Ok(errors.check(())?)
    }
}

fn image_field_error(err: ImageError) -> AccessError {
    match err {
        ImageError::Invalid(message) => FieldErrors::single("image", message).into(),
        ImageError::TooLarge(_) => FieldErrors::single("image", err.to_string()).into(),
        other => other.into(),
    }
}
