mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{ids, TestApp};

struct Fixture {
    app: TestApp,
    token: String,
    vegan: i64,
    vegetarian: i64,
    feta: i64,
    chicken: i64,
    curry: i64,
    tahini: i64,
    fish: i64,
}

/// curry: vegan + feta, tahini: vegetarian + chicken, fish: no links
async fn fixture() -> Result<Fixture> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;

    let vegan = app.create_tag(&token, "Vegan").await?;
    let vegetarian = app.create_tag(&token, "Vegetarian").await?;
    let feta = app.create_ingredient(&token, "Feta cheese").await?;
    let chicken = app.create_ingredient(&token, "Chicken").await?;

    let curry = app
        .create_recipe(&token, json!({"title": "Thai vegetable curry", "tags": [vegan], "ingredients": [feta]}))
        .await?;
    let tahini = app
        .create_recipe(&token, json!({"title": "Aubergine with tahini", "tags": [vegetarian], "ingredients": [chicken]}))
        .await?;
    let fish = app.create_recipe(&token, json!({"title": "Fish and chips"})).await?;

    Ok(Fixture { app, token, vegan, vegetarian, feta, chicken, curry, tahini, fish })
}

impl Fixture {
    async fn list(&self, query: &str) -> Result<Vec<i64>> {
        let res = self.app.get(&format!("/api/recipe/recipes/{}", query), &self.token).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "list failed: {}", res.body);
        Ok(ids(res.data()))
    }
}

#[tokio::test]
async fn filter_by_single_tag() -> Result<()> {
    let f = fixture().await?;
    assert_eq!(f.list(&format!("?tags={}", f.vegan)).await?, vec![f.curry]);
    Ok(())
}

#[tokio::test]
async fn tag_ids_match_any() -> Result<()> {
    let f = fixture().await?;
    let found = f.list(&format!("?tags={},{}", f.vegan, f.vegetarian)).await?;
    assert_eq!(found, vec![f.tahini, f.curry]);
    assert!(!found.contains(&f.fish));
    Ok(())
}

#[tokio::test]
async fn ingredient_ids_match_any() -> Result<()> {
    let f = fixture().await?;
    let found = f.list(&format!("?ingredients={},{}", f.feta, f.chicken)).await?;
    assert_eq!(found, vec![f.tahini, f.curry]);
    Ok(())
}

#[tokio::test]
async fn tags_and_ingredients_combine_with_and() -> Result<()> {
    let f = fixture().await?;
    let found = f
        .list(&format!("?tags={},{}&ingredients={}", f.vegan, f.vegetarian, f.chicken))
        .await?;
    assert_eq!(found, vec![f.tahini]);

    let none = f.list(&format!("?tags={}&ingredients={}", f.vegan, f.chicken)).await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn blank_filter_means_no_filter() -> Result<()> {
    let f = fixture().await?;
    assert_eq!(f.list("?tags=&ingredients=").await?, vec![f.fish, f.tahini, f.curry]);
    Ok(())
}

#[tokio::test]
async fn malformed_ids_name_the_parameter() -> Result<()> {
    let f = fixture().await?;
    let res = f.app.get("/api/recipe/recipes/?tags=1,abc", &f.token).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("tags").is_some());

    let res = f.app.get("/api/recipe/recipes/?ingredients=x", &f.token).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("ingredients").is_some());
    Ok(())
}

#[tokio::test]
async fn filters_never_reach_other_users() -> Result<()> {
    let f = fixture().await?;
    let other = f.app.register_and_login("other@example.com").await?;

    let res = f
        .app
        .get(&format!("/api/recipe/recipes/?tags={}", f.vegan), &other)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(ids(res.data()).is_empty());
    Ok(())
}
