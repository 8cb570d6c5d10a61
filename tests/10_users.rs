mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.request(Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn register_returns_profile_without_password() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.register("test@example.com").await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["email"], "test@example.com");
    assert_eq!(res.data()["name"], "Test Name");
    assert!(res.data().get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    app.register("test@example.com").await?;
    let res = app.register("test@example.com").await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("email").is_some());
    Ok(())
}

#[tokio::test]
async fn short_password_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let body = json!({"email": "test@example.com", "password": "pw", "name": "Test"});
    let res = app.request(Method::POST, "/api/user/create/", None, Some(body)).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("password").is_some());

    let login = app.login("test@example.com", "pw").await?;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn token_requires_valid_credentials() -> Result<()> {
    let app = TestApp::new()?;
    app.register("test@example.com").await?;

    let ok = app.login("test@example.com", PASSWORD).await?;
    assert_eq!(ok.status, StatusCode::OK);
    assert!(ok.data()["token"].as_str().is_some_and(|t| !t.is_empty()));

    let bad = app.login("test@example.com", "wrong").await?;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["message"], "Unable to authenticate with provided credentials");
    assert!(bad.body.get("data").is_none());

    let blank = app.login("test@example.com", "").await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn me_requires_authentication() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.request(Method::GET, "/api/user/me/", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "UNAUTHORIZED");

    let res = app.get("/api/user/me/", "not-a-jwt").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_returns_and_updates_profile() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("test@example.com").await?;

    let me = app.get("/api/user/me/", &token).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data(), &json!({"email": "test@example.com", "name": "Test Name"}));

    let body = json!({"name": "Updated", "password": "newpassword123"});
    let patched = app.request(Method::PATCH, "/api/user/me/", Some(&token), Some(body)).await?;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.data()["name"], "Updated");
    assert_eq!(patched.data()["email"], "test@example.com");

    assert_eq!(app.login("test@example.com", "newpassword123").await?.status, StatusCode::OK);
    assert_eq!(app.login("test@example.com", PASSWORD).await?.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn put_on_me_requires_every_field() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register_and_login("test@example.com").await?;

    let res = app
        .request(Method::PUT, "/api/user/me/", Some(&token), Some(json!({"name": "Only name"})))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("email").is_some());
    Ok(())
}

#[tokio::test]
async fn non_object_body_is_invalid_json() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .request(Method::POST, "/api/user/create/", None, Some(json!(["not", "an", "object"])))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}
