use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Ingredient, IngredientFields, NewUser, Recipe, RecipeChanges, RecipeFields, Tag, TagFields,
    User, UserChanges, UserId,
};
use super::repository::{PgEntity, Repository};
use super::store::{EntityStore, RecipeStore, Store, UserStore};
use crate::filter::Filter;

impl PgEntity for Tag {
    const SELECT: &'static str = "\"tags\".\"id\", \"tags\".\"name\", \"tags\".\"user_id\"";
}

impl PgEntity for Ingredient {
    const SELECT: &'static str =
        "\"ingredients\".\"id\", \"ingredients\".\"name\", \"ingredients\".\"user_id\"";
}

impl PgEntity for Recipe {
    const SELECT: &'static str = "\"recipes\".\"id\", \"recipes\".\"user_id\", \"recipes\".\"title\", \
        \"recipes\".\"time_minutes\", \"recipes\".\"price\", \"recipes\".\"link\", \"recipes\".\"image\", \
        ARRAY(SELECT \"tag_id\" FROM \"recipe_tags\" WHERE \"recipe_id\" = \"recipes\".\"id\" ORDER BY \"tag_id\") AS \"tag_ids\", \
        ARRAY(SELECT \"ingredient_id\" FROM \"recipe_ingredients\" WHERE \"recipe_id\" = \"recipes\".\"id\" ORDER BY \"ingredient_id\") AS \"ingredient_ids\"";
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn replace_links(
        tx: &mut Transaction<'_, Postgres>,
        link_table: &str,
        target: &str,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<(), DatabaseError> {
        sqlx::query(&format!("DELETE FROM \"{}\" WHERE \"recipe_id\" = $1", link_table))
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?;

        if !ids.is_empty() {
            sqlx::query(&format!(
                "INSERT INTO \"{}\" (\"recipe_id\", \"{}\") SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
                link_table, target
            ))
            .bind(recipe_id)
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

fn unique_violation(err: sqlx::Error, column: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Conflict(column.to_string()),
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl EntityStore<Tag> for PgStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Tag>, DatabaseError> {
        Repository::<Tag>::new(&self.pool).select_any(filter).await
    }

    async fn insert(&self, owner: UserId, fields: TagFields) -> Result<Tag, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
        )
        .bind(&fields.name)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(tag)
    }
}

#[async_trait]
impl EntityStore<Ingredient> for PgStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Ingredient>, DatabaseError> {
        Repository::<Ingredient>::new(&self.pool).select_any(filter).await
    }

    async fn insert(&self, owner: UserId, fields: IngredientFields) -> Result<Ingredient, DatabaseError> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "INSERT INTO ingredients (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
        )
        .bind(&fields.name)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(ingredient)
    }
}

#[async_trait]
impl EntityStore<Recipe> for PgStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<Recipe>, DatabaseError> {
        Repository::<Recipe>::new(&self.pool).select_any(filter).await
    }

    async fn insert(&self, owner: UserId, fields: RecipeFields) -> Result<Recipe, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO recipes (user_id, title, time_minutes, price, link) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(owner)
        .bind(&fields.title)
        .bind(fields.time_minutes)
        .bind(fields.price)
        .bind(&fields.link)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_links(&mut tx, "recipe_tags", "tag_id", id, &fields.tag_ids).await?;
        Self::replace_links(&mut tx, "recipe_ingredients", "ingredient_id", id, &fields.ingredient_ids).await?;
        tx.commit().await?;

        Repository::<Recipe>::new(&self.pool).select_404(id).await
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn update_recipe(&self, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError> {
        let current = Repository::<Recipe>::new(&self.pool).select_404(id).await?;
        let replace_tags = changes.tag_ids.is_some();
        let replace_ingredients = changes.ingredient_ids.is_some();
        let updated = changes.apply_to(current);

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE recipes SET title = $1, time_minutes = $2, price = $3, link = $4 WHERE id = $5",
        )
        .bind(&updated.title)
        .bind(updated.time_minutes)
        .bind(updated.price)
        .bind(&updated.link)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Recipe {} not found", id)));
        }
        if replace_tags {
            Self::replace_links(&mut tx, "recipe_tags", "tag_id", id, &updated.tag_ids).await?;
        }
        if replace_ingredients {
            Self::replace_links(&mut tx, "recipe_ingredients", "ingredient_id", id, &updated.ingredient_ids).await?;
        }
        tx.commit().await?;

        Repository::<Recipe>::new(&self.pool).select_404(id).await
    }

    async fn delete_recipe(&self, id: i64) -> Result<(), DatabaseError> {
        // Link rows go with the recipe through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Recipe {} not found", id)));
        }
        Ok(())
    }

    async fn set_recipe_image(&self, id: i64, image: Option<String>) -> Result<Recipe, DatabaseError> {
        let result = sqlx::query("UPDATE recipes SET image = $1 WHERE id = $2")
            .bind(image)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Recipe {} not found", id)));
        }
        Repository::<Recipe>::new(&self.pool).select_404(id).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, password, is_active, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($1, email), name = COALESCE($2, name), \
             password = COALESCE($3, password) WHERE id = $4 RETURNING *",
        )
        .bind(changes.email)
        .bind(changes.name)
        .bind(changes.password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        info!("Deleted user {} with owned rows", id);
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
