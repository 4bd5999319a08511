mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{app, get, get_as, login, post};

#[tokio::test]
async fn profile_requires_login() -> Result<()> {
    let (app, _pool) = app().await?;
    let reply = get(&app, "/profile").await?;
    assert_eq!(reply.status, StatusCode::FOUND);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn fresh_profile_is_empty() -> Result<()> {
    let (app, _pool) = app().await?;
    let token = login(&app, "testuser").await?;

    let reply = get_as(&app, "/profile", &token).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "testuser");
    assert_eq!(reply.body["profile"]["full_name"], "");
    assert!(reply.body["profile"]["bio"].is_null());
    assert!(reply.body["profile"]["birthday"].is_null());
    Ok(())
}

#[tokio::test]
async fn valid_update_is_saved_and_rendered() -> Result<()> {
    let (app, _pool) = app().await?;
    let token = login(&app, "testuser").await?;

    let reply = post(
        &app,
        "/profile",
        Some(&token),
        json!({
            "full_name": "Test User",
            "bio": "I am a user from Testlandia.",
            "birthday": "01/01/1970",
        }),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["profile"]["full_name"], "Test User");
    assert_eq!(reply.body["profile"]["bio"], "I am a user from Testlandia.");
    assert_eq!(reply.body["profile"]["birthday"], "Jan. 1, 1970");

    // Still there on the next view.
    let reply = get_as(&app, "/profile", &token).await?;
    assert_eq!(reply.body["profile"]["full_name"], "Test User");
    assert_eq!(reply.body["profile"]["birthday"], "Jan. 1, 1970");
    Ok(())
}

#[tokio::test]
async fn invalid_update_echoes_submission_beside_saved_values() -> Result<()> {
    let (app, _pool) = app().await?;
    let token = login(&app, "testuser").await?;
    post(
        &app,
        "/profile",
        Some(&token),
        json!({
            "full_name": "Test User",
            "bio": "I am a user from Testlandia.",
            "birthday": "01/01/1970",
        }),
    )
    .await?;

    let reply = post(
        &app,
        "/profile",
        Some(&token),
        json!({
            "full_name": "",
            "bio": "I am a user from Testlandshire.",
            "birthday": "Not a Date",
        }),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);

    // The persisted record is untouched...
    assert_eq!(reply.body["profile"]["full_name"], "Test User");
    assert_eq!(reply.body["profile"]["bio"], "I am a user from Testlandia.");
    assert_eq!(reply.body["profile"]["birthday"], "Jan. 1, 1970");

    // ...while the rejected submission comes back for correction.
    assert_eq!(reply.body["submitted"]["bio"], "I am a user from Testlandshire.");
    assert_eq!(reply.body["submitted"]["birthday"], "Not a Date");
    assert_eq!(
        reply.body["errors"]["fields"]["full_name"],
        "This field is required."
    );
    assert_eq!(reply.body["errors"]["fields"]["birthday"], "Enter a valid date.");
    Ok(())
}

#[tokio::test]
async fn partial_update_without_optional_fields() -> Result<()> {
    let (app, _pool) = app().await?;
    let token = login(&app, "testuser").await?;

    let reply = post(
        &app,
        "/profile",
        Some(&token),
        json!({ "full_name": "Test User" }),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["profile"]["full_name"], "Test User");
    assert!(reply.body["profile"]["bio"].is_null());
    assert!(reply.body["profile"]["birthday"].is_null());
    assert!(reply.body["errors"].is_null());
    Ok(())
}
