use std::sync::Arc;

use crate::access::{OwnedAccess, RecipeAccess};
use crate::database::models::{Ingredient, Tag};
use crate::database::Store;
use crate::services::{ImageStorage, UserService};

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub images: ImageStorage,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, images: ImageStorage) -> Self {
        Self { store, images }
    }

    pub fn users(&self) -> UserService<dyn Store> {
        UserService::new(Arc::clone(&self.store))
    }

    pub fn tags(&self) -> OwnedAccess<Tag, dyn Store> {
        OwnedAccess::new(Arc::clone(&self.store))
    }

    pub fn ingredients(&self) -> OwnedAccess<Ingredient, dyn Store> {
        OwnedAccess::new(Arc::clone(&self.store))
    }

    pub fn recipes(&self) -> RecipeAccess<dyn Store> {
        RecipeAccess::new(Arc::clone(&self.store), self.images.clone())
    }
}
