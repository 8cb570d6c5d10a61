use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldErrors, FieldReader, Validate};
use crate::database::models::{Ingredient, IngredientFields, Tag, TagFields};

const NAME_MAX: usize = 255;

/// Body of `POST /api/recipe/tags/`. Any `user`/`user_id` key is ignored.
#[derive(Debug, Clone)]
pub struct TagPayload(pub Map<String, Value>);

impl Validate for TagPayload {
    type Output = TagFields;

    fn validate(self) -> Result<TagFields, FieldErrors> {
        let mut reader = FieldReader::new(&self.0);
        let name = reader.string("name", true, false, NAME_MAX);
        match name {
            Some(name) => reader.errors.check(TagFields { name }),
            None => Err(reader.errors),
        }
    }
}

/// Body of `POST /api/recipe/ingredients/`
#[derive(Debug, Clone)]
pub struct IngredientPayload(pub Map<String, Value>);

impl Validate for IngredientPayload {
    type Output = IngredientFields;

    fn validate(self) -> Result<IngredientFields, FieldErrors> {
        let mut reader = FieldReader::new(&self.0);
        let name = reader.string("name", true, false, NAME_MAX);
        match name {
            Some(name) => reader.errors.check(IngredientFields { name }),
            None => Err(reader.errors),
        }
    }
}

/// `{id, name}` shape shared by tags and ingredients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedOut {
    pub id: i64,
    pub name: String,
}

impl From<&Tag> for NamedOut {
    fn from(tag: &Tag) -> Self {
        Self { id: tag.id, name: tag.name.clone() }
    }
}

impl From<&Ingredient> for NamedOut {
    fn from(ingredient: &Ingredient) -> Self {
        Self { id: ingredient.id, name: ingredient.name.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn tag_name_is_required() {
        let err = TagPayload(payload(json!({"user": 99}))).validate().unwrap_err();
        assert_eq!(err.get("name"), Some(super::super::REQUIRED));

        let err = IngredientPayload(payload(json!({"name": ""}))).validate().unwrap_err();
        assert_eq!(err.get("name"), Some(super::super::BLANK));
    }

    #[test]
    fn owner_fields_are_dropped() {
        let fields = TagPayload(payload(json!({"name": "Vegan", "user_id": 99})))
            .validate()
            .unwrap();
        assert_eq!(fields.name, "Vegan");
    }
}
