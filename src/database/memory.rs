use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::info;

use super::manager::DatabaseError;
use super::models::{
    Ingredient, IngredientFields, NewUser, Recipe, RecipeChanges, RecipeFields, Tag, TagFields,
    User, UserChanges, UserId,
};
use super::store::{EntityStore, RecipeStore, Store, UserStore};
use crate::filter::{Filter, FilterTarget};

#[derive(Default)]
struct Tables {
    last_id: BTreeMap<&'static str, i64>,
    users: BTreeMap<i64, User>,
    tags: BTreeMap<i64, Tag>,
    ingredients: BTreeMap<i64, Ingredient>,
    recipes: BTreeMap<i64, Recipe>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.last_id.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn recipes_linking(&self, pick: impl Fn(&Recipe) -> &Vec<i64>, id: i64) -> Vec<i64> {
        self.recipes
            .values()
            .filter(|recipe| pick(recipe).contains(&id))
            .map(|recipe| recipe.id)
            .collect()
    }

    fn check_links(&self, tag_ids: &[i64], ingredient_ids: &[i64]) -> Result<(), DatabaseError> {
        if let Some(id) = tag_ids.iter().find(|id| !self.tags.contains_key(*id)) {
            return Err(DatabaseError::QueryError(format!("recipe_tags references missing tag {}", id)));
        }
        if let Some(id) = ingredient_ids.iter().find(|id| !self.ingredients.contains_key(*id)) {
            return Err(DatabaseError::QueryError(format!(
                "recipe_ingredients references missing ingredient {}",
                id
            )));
        }
        Ok(())
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// A row as seen by a filter: serialized columns plus resolved link ids.
struct Row<E> {
    entity: E,
    fields: Map<String, Value>,
    links: Vec<(&'static str, Vec<i64>)>,
}

impl<E: Serialize> Row<E> {
    fn new(entity: E) -> Self {
        let fields = match serde_json::to_value(&entity) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            entity,
            fields,
            links: vec![],
        }
    }

    fn with_link(mut self, relation: &'static str, ids: Vec<i64>) -> Self {
        self.links.push((relation, ids));
        self
    }
}

impl<E> FilterTarget for Row<E> {
    fn column(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn linked_ids(&self, relation: &str) -> Vec<i64> {
        self.links
            .iter()
            .find(|(r, _)| *r == relation)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default()
    }
}

fn normalize_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Process-local store with the same observable behavior as `PgStore`. Text
/// ordering is bytewise, matching the `COLLATE "C"` the SQL side orders by.
///
/// Backs the test suite and `DATABASE_BACKEND=memory` runs. Everything is lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore<Tag> for MemoryStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables.tags.values().cloned().map(|tag| {
            let recipes = tables.recipes_linking(|r| &r.tag_ids, tag.id);
            Row::new(tag).with_link("recipes", recipes)
        });
        Ok(filter.apply(rows).into_iter().map(|row| row.entity).collect())
    }

    async fn insert(&self, owner: UserId, fields: TagFields) -> Result<Tag, DatabaseError> {
        let mut tables = self.tables.write().await;
        let tag = Tag {
            id: tables.next_id("tags"),
            name: fields.name,
            user_id: owner,
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl EntityStore<Ingredient> for MemoryStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Ingredient>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables.ingredients.values().cloned().map(|ingredient| {
            let recipes = tables.recipes_linking(|r| &r.ingredient_ids, ingredient.id);
            Row::new(ingredient).with_link("recipes", recipes)
        });
        Ok(filter.apply(rows).into_iter().map(|row| row.entity).collect())
    }

    async fn insert(&self, owner: UserId, fields: IngredientFields) -> Result<Ingredient, DatabaseError> {
        let mut tables = self.tables.write().await;
        let ingredient = Ingredient {
            id: tables.next_id("ingredients"),
            name: fields.name,
            user_id: owner,
        };
        tables.ingredients.insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }
}

#[async_trait]
impl EntityStore<Recipe> for MemoryStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Recipe>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables.recipes.values().cloned().map(|recipe| {
            let tags = recipe.tag_ids.clone();
            let ingredients = recipe.ingredient_ids.clone();
            Row::new(recipe)
                .with_link("tags", tags)
                .with_link("ingredients", ingredients)
        });
        Ok(filter.apply(rows).into_iter().map(|row| row.entity).collect())
    }

    async fn insert(&self, owner: UserId, fields: RecipeFields) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_links(&fields.tag_ids, &fields.ingredient_ids)?;

        let recipe = Recipe {
            id: tables.next_id("recipes"),
            user_id: owner,
            title: fields.title,
            time_minutes: fields.time_minutes,
            price: fields.price,
            link: fields.link,
            image: None,
            tag_ids: normalize_ids(&fields.tag_ids),
            ingredient_ids: normalize_ids(&fields.ingredient_ids),
        };
        tables.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn update_recipe(&self, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .recipes
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Recipe {} not found", id)))?;

        let mut updated = changes.apply_to(current);
        tables.check_links(&updated.tag_ids, &updated.ingredient_ids)?;
        updated.tag_ids = normalize_ids(&updated.tag_ids);
        updated.ingredient_ids = normalize_ids(&updated.ingredient_ids);

        tables.recipes.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_recipe(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .recipes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("Recipe {} not found", id)))
    }

    async fn set_recipe_image(&self, id: i64, image: Option<String>) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        let recipe = tables
            .recipes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Recipe {} not found", id)))?;
        recipe.image = image;
        Ok(recipe.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict("email".to_string()));
        }

        let user = User {
            id: tables.next_id("users"),
            email: user.email,
            name: user.name,
            password: user.password,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(DatabaseError::Conflict("email".to_string()));
            }
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))?;
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password) = changes.password {
            user.password = password;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }

        tables.recipes.retain(|_, recipe| recipe.user_id != id);
        tables.tags.retain(|_, tag| tag.user_id != id);
        tables.ingredients.retain(|_, ingredient| ingredient.user_id != id);

        // Other users' recipes lose links to rows that just went away
        let Tables { tags, ingredients, recipes, .. } = &mut *tables;
        for recipe in recipes.values_mut() {
            recipe.tag_ids.retain(|tag_id| tags.contains_key(tag_id));
            recipe.ingredient_ids.retain(|ingredient_id| ingredients.contains_key(ingredient_id));
        }

        info!("Deleted user {} with owned rows", id);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
