use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserId;
use crate::access::OwnedEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct TagFields {
    pub name: String,
}

impl OwnedEntity for Tag {
    const TABLE: &'static str = "tags";
    const LABEL: &'static str = "Tag";
    const DEFAULT_ORDER: &'static str = "name desc, id desc";
    type Fields = TagFields;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }
}
