use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldErrors, FieldReader, NamedOut, Validate};
use crate::database::models::{Ingredient, Recipe, RecipeChanges, RecipeFields, Tag};
use crate::services::image_store::ImageStorage;

const TITLE_MAX: usize = 255;
const LINK_MAX: usize = 255;
const PRICE_DIGITS: u32 = 5;
const PRICE_PLACES: u32 = 2;

/// Body of recipe create/update requests
#[derive(Debug, Clone)]
pub struct RecipePayload(pub Map<String, Value>);

impl RecipePayload {
    /// Fields for PUT (`partial == false`, required fields must be present) or PATCH.
    pub fn changes(self, partial: bool) -> Result<RecipeChanges, FieldErrors> {
        let required = !partial;
        let mut reader = FieldReader::new(&self.0);
        let changes = RecipeChanges {
            title: reader.string("title", required, false, TITLE_MAX),
            time_minutes: reader.integer("time_minutes", required),
            price: reader.decimal("price", required, PRICE_DIGITS, PRICE_PLACES),
            link: reader.string("link", false, true, LINK_MAX),
            tag_ids: reader.id_list("tags"),
            ingredient_ids: reader.id_list("ingredients"),
        };
        reader.errors.check(changes)
    }
}

impl Validate for RecipePayload {
    type Output = RecipeFields;

    fn validate(self) -> Result<RecipeFields, FieldErrors> {
        let mut reader = FieldReader::new(&self.0);
        let title = reader.string("title", true, false, TITLE_MAX);
        let time_minutes = reader.integer("time_minutes", true);
        let price = reader.decimal("price", true, PRICE_DIGITS, PRICE_PLACES);
        let link = reader.string("link", false, true, LINK_MAX).unwrap_or_default();
        let tag_ids = reader.id_list("tags").unwrap_or_default();
        let ingredient_ids = reader.id_list("ingredients").unwrap_or_default();

        match (title, time_minutes, price) {
            (Some(title), Some(time_minutes), Some(price)) if reader.errors.is_empty() => Ok(RecipeFields {
                title,
                time_minutes,
                price,
                link,
                tag_ids,
                ingredient_ids,
            }),
            _ => Err(reader.errors),
        }
    }
}

fn render_price(price: Decimal) -> String {
    let mut price = price;
    price.rescale(PRICE_PLACES);
    price.to_string()
}

/// List and create representation: links as ids
#[derive(Debug, Clone, Serialize)]
pub struct RecipeOut {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: String,
    pub link: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

impl From<&Recipe> for RecipeOut {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: render_price(recipe.price),
            link: recipe.link.clone(),
            tags: recipe.tag_ids.clone(),
            ingredients: recipe.ingredient_ids.clone(),
        }
    }
}

/// Retrieve representation: nested tags and ingredients plus the image URL
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailOut {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: String,
    pub link: String,
    pub image: Option<String>,
    pub tags: Vec<NamedOut>,
    pub ingredients: Vec<NamedOut>,
}

impl RecipeDetailOut {
    pub fn new(recipe: &Recipe, tags: &[Tag], ingredients: &[Ingredient], images: &ImageStorage) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: render_price(recipe.price),
            link: recipe.link.clone(),
            image: recipe.image.as_deref().map(|path| images.url_for(path)),
            tags: tags.iter().map(NamedOut::from).collect(),
            ingredients: ingredients.iter().map(NamedOut::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeImageOut {
    pub id: i64,
    pub image: Option<String>,
}

impl RecipeImageOut {
    pub fn new(recipe: &Recipe, images: &ImageStorage) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image.as_deref().map(|path| images.url_for(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RecipePayload {
        RecipePayload(value.as_object().cloned().unwrap())
    }

    #[test]
    fn create_requires_core_fields() {
        let err = payload(json!({"link": "https://example.com"})).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["price", "time_minutes", "title"]);
    }

    #[test]
    fn create_defaults_optional_fields() {
        let fields = payload(json!({"title": "Soup", "time_minutes": 30, "price": "5.50"}))
            .validate()
            .unwrap();
        assert_eq!(fields.link, "");
        assert!(fields.tag_ids.is_empty());
        assert!(fields.ingredient_ids.is_empty());
        assert_eq!(render_price(fields.price), "5.50");
    }

    #[test]
    fn partial_changes_leave_missing_fields_unset() {
        let changes = payload(json!({"title": "Stew", "tags": []})).changes(true).unwrap();
        assert_eq!(changes.title.as_deref(), Some("Stew"));
        assert_eq!(changes.tag_ids, Some(vec![]));
        assert!(changes.price.is_none());
        assert!(changes.ingredient_ids.is_none());
    }

    #[test]
    fn compact_and_detail_shapes() {
        let images = ImageStorage::new("/tmp/media", "/media", 1024);
        let recipe = Recipe {
            id: 7,
            user_id: 1,
            title: "Soup".to_string(),
            time_minutes: 30,
            price: Decimal::new(55, 1),
            link: String::new(),
            image: Some("uploads/recipe/abc.png".to_string()),
            tag_ids: vec![2],
            ingredient_ids: vec![],
        };
        let tag = Tag { id: 2, name: "Vegan".to_string(), user_id: 1 };

        let compact = serde_json::to_value(RecipeOut::from(&recipe)).unwrap();
        assert_eq!(compact["price"], "5.50");
        assert_eq!(compact["tags"], json!([2]));
        assert!(compact.get("image").is_none());

        let detail = serde_json::to_value(RecipeDetailOut::new(&recipe, &[tag], &[], &images)).unwrap();
        assert_eq!(detail["tags"], json!([{"id": 2, "name": "Vegan"}]));
        assert_eq!(detail["image"], "/media/uploads/recipe/abc.png");
    }
}
