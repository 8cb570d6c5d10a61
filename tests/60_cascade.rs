mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

use recipe_api::database::models::{Ingredient, Recipe, Tag};
use recipe_api::database::{EntityStore, UserStore};
use recipe_api::filter::Filter;

use common::{ids, TestApp};

#[tokio::test]
async fn deleting_a_user_removes_everything_they_own() -> Result<()> {
    let app = TestApp::new()?;
    let doomed = app.register_and_login("doomed@example.com").await?;
    let keeper = app.register_and_login("keeper@example.com").await?;

    let tag = app.create_tag(&doomed, "Gone").await?;
    let ingredient = app.create_ingredient(&doomed, "Gone too").await?;
    app.create_recipe(&doomed, json!({"tags": [tag], "ingredients": [ingredient]})).await?;
    let kept = app.create_recipe(&keeper, json!({})).await?;

    let user = app
        .store
        .find_user_by_email("doomed@example.com")
        .await?
        .context("user missing")?;
    app.store.delete_user(user.id).await?;

    let store = app.store.as_ref();
    let tags = EntityStore::<Tag>::filter(store, &Filter::new("tags")?).await?;
    let ingredients = EntityStore::<Ingredient>::filter(store, &Filter::new("ingredients")?).await?;
    let recipes = EntityStore::<Recipe>::filter(store, &Filter::new("recipes")?).await?;
    assert!(tags.is_empty());
    assert!(ingredients.is_empty());
    assert_eq!(recipes.iter().map(|r| r.id).collect::<Vec<_>>(), vec![kept]);

    // The token outlives the account but no longer authenticates
    let res = app.get("/api/recipe/recipes/", &doomed).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/recipe/recipes/", &keeper).await?;
    assert_eq!(ids(res.data()), vec![kept]);
    Ok(())
}
