mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{ids, TestApp};

#[tokio::test]
async fn create_returns_compact_representation() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;
    let tag = app.create_tag(&token, "Thai").await?;
    let prawns = app.create_ingredient(&token, "Prawns").await?;

    let body = json!({
        "title": "Thai prawn curry",
        "time_minutes": 30,
        "price": 5.5,
        "link": "https://example.com/curry",
        "tags": [tag],
        "ingredients": [prawns],
    });
    let res = app.post("/api/recipe/recipes/", &token, body).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["title"], "Thai prawn curry");
    assert_eq!(res.data()["time_minutes"], 30);
    assert_eq!(res.data()["price"], "5.50");
    assert_eq!(res.data()["tags"], json!([tag]));
    assert_eq!(res.data()["ingredients"], json!([prawns]));
    assert!(res.data().get("image").is_none());
    Ok(())
}

#[tokio::test]
async fn create_validates_required_fields() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;

    let res = app.post("/api/recipe/recipes/", &token, json!({"title": "No time"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("time_minutes").is_some());
    assert!(res.field_error("price").is_some());

    let res = app
        .post("/api/recipe/recipes/", &token, json!({"title": "Pricey", "time_minutes": 5, "price": "1000.00"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("price").is_some());
    Ok(())
}

#[tokio::test]
async fn retrieve_returns_detail_representation() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;
    let vegan = app.create_tag(&token, "Vegan").await?;
    let dessert = app.create_tag(&token, "Dessert").await?;
    let id = app.create_recipe(&token, json!({"tags": [dessert, vegan]})).await?;

    let res = app.get(&format!("/api/recipe/recipes/{}/", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["id"], id);
    assert_eq!(res.data()["price"], "5.25");
    assert_eq!(res.data()["image"], json!(null));
    assert_eq!(
        res.data()["tags"],
        json!([{"id": vegan, "name": "Vegan"}, {"id": dessert, "name": "Dessert"}])
    );
    assert_eq!(res.data()["ingredients"], json!([]));
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_and_newest_first() -> Result<()> {
    let app = TestApp::new()?;
    let u1 = app.register_and_login("user1@example.com").await?;
    let u2 = app.register_and_login("user2@example.com").await?;

    let first = app.create_recipe(&u1, json!({})).await?;
    let second = app.create_recipe(&u1, json!({})).await?;
    app.create_recipe(&u2, json!({})).await?;

    let res = app.get("/api/recipe/recipes/", &u1).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(res.data()), vec![second, first]);
    assert!(res.data()[0]["tags"].is_array());
    Ok(())
}

#[tokio::test]
async fn foreign_recipes_are_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register_and_login("owner@example.com").await?;
    let other = app.register_and_login("other@example.com").await?;
    let id = app.create_recipe(&owner, json!({"title": "Mine"})).await?;
    let uri = format!("/api/recipe/recipes/{}/", id);

    assert_eq!(app.get(&uri, &other).await?.status, StatusCode::NOT_FOUND);

    let patch = app
        .request(Method::PATCH, &uri, Some(&other), Some(json!({"title": "Stolen"})))
        .await?;
    assert_eq!(patch.status, StatusCode::NOT_FOUND);

    let delete = app.request(Method::DELETE, &uri, Some(&other), None).await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let res = app.get(&uri, &owner).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "Mine");
    Ok(())
}

#[tokio::test]
async fn foreign_or_unknown_links_are_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let u1 = app.register_and_login("user1@example.com").await?;
    let u2 = app.register_and_login("user2@example.com").await?;
    let foreign = app.create_tag(&u2, "Theirs").await?;

    let body = json!({"title": "Sneaky", "time_minutes": 5, "price": "1.00", "tags": [foreign]});
    let res = app.post("/api/recipe/recipes/", &u1, body).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let foreign_message = res.field_error("tags").map(str::to_string);
    assert!(foreign_message.is_some());

    let body = json!({"title": "Sneaky", "time_minutes": 5, "price": "1.00", "tags": [foreign + 1000]});
    let res = app.post("/api/recipe/recipes/", &u1, body).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.field_error("tags").map(|m| m.replace(&(foreign + 1000).to_string(), "")),
        foreign_message.map(|m| m.replace(&foreign.to_string(), ""))
    );

    let res = app.get("/api/recipe/recipes/", &u1).await?;
    assert!(ids(res.data()).is_empty());
    Ok(())
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;
    let tag = app.create_tag(&token, "Quick").await?;
    let id = app
        .create_recipe(&token, json!({"title": "Original", "link": "https://example.com", "tags": [tag]}))
        .await?;
    let uri = format!("/api/recipe/recipes/{}/", id);

    let res = app
        .request(Method::PATCH, &uri, Some(&token), Some(json!({"title": "Renamed"})))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "Renamed");
    assert_eq!(res.data()["link"], "https://example.com");
    assert_eq!(res.data()["tags"], json!([tag]));

    let res = app
        .request(Method::PATCH, &uri, Some(&token), Some(json!({"tags": []})))
        .await?;
    assert_eq!(res.data()["tags"], json!([]));
    Ok(())
}

#[tokio::test]
async fn put_replaces_required_fields() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;
    let id = app.create_recipe(&token, json!({"link": "https://example.com"})).await?;
    let uri = format!("/api/recipe/recipes/{}/", id);

    let res = app
        .request(Method::PUT, &uri, Some(&token), Some(json!({"title": "Only title"})))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let body = json!({"title": "Spaghetti", "time_minutes": 25, "price": "7.00"});
    let res = app.request(Method::PUT, &uri, Some(&token), Some(body)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "Spaghetti");
    assert_eq!(res.data()["time_minutes"], 25);
    assert_eq!(res.data()["price"], "7.00");
    // optional fields that were not sent keep their value
    assert_eq!(res.data()["link"], "https://example.com");
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_recipe() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;
    let id = app.create_recipe(&token, json!({})).await?;
    let uri = format!("/api/recipe/recipes/{}/", id);

    let res = app.request(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.body, json!(null));

    assert_eq!(app.get(&uri, &token).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_use_the_error_envelope() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("user@example.com").await?;

    let res = app.get("/api/recipe/recipes/abc/", &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], true);
    assert_eq!(res.body["code"], "NOT_FOUND");

    let patch = app
        .request(Method::PATCH, "/api/recipe/recipes/1.5/", Some(&token), Some(json!({"title": "X"})))
        .await?;
    assert_eq!(patch.status, StatusCode::NOT_FOUND);
    assert_eq!(patch.body["code"], "NOT_FOUND");

    let delete = app
        .request(Method::DELETE, "/api/recipe/recipes/abc/", Some(&token), None)
        .await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.body["error"], true);
    Ok(())
}
