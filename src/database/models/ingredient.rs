use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserId;
use crate::access::OwnedEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct IngredientFields {
    pub name: String,
}

impl OwnedEntity for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LABEL: &'static str = "Ingredient";
    const DEFAULT_ORDER: &'static str = "name desc, id desc";
    type Fields = IngredientFields;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }
}
