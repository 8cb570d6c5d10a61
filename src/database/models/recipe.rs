use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserId;
use crate::access::OwnedEntity;

/// Recipe row with its tag and ingredient links resolved to sorted id lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    /// Path relative to the media root
    pub image: Option<String>,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

/// Update to a recipe. A `Some` link list replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

impl RecipeChanges {
    /// Fold the changes into an existing row.
    pub fn apply_to(self, mut recipe: Recipe) -> Recipe {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = self.link {
            recipe.link = link;
        }
        if let Some(tag_ids) = self.tag_ids {
            recipe.tag_ids = tag_ids;
        }
        if let Some(ingredient_ids) = self.ingredient_ids {
            recipe.ingredient_ids = ingredient_ids;
        }
        recipe
    }
}

impl OwnedEntity for Recipe {
    const TABLE: &'static str = "recipes";
    const LABEL: &'static str = "Recipe";
    const DEFAULT_ORDER: &'static str = "id desc";
    type Fields = RecipeFields;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }
}
