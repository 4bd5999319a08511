#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// Fresh router over a private in-memory database. One connection, so the
/// whole test sees the same memory db.
pub async fn app() -> Result<(Router, SqlitePool)> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("in-memory pool")?;
    zlot::db::init_schema(&pool).await?;
    Ok((zlot::app(pool.clone()), pool))
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub location: Option<String>,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<Reply> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    Ok(Reply {
        status,
        body,
        location,
    })
}

pub async fn get(app: &Router, uri: &str) -> Result<Reply> {
    send(app, "GET", uri, None, None).await
}

pub async fn get_as(app: &Router, uri: &str, token: &str) -> Result<Reply> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Result<Reply> {
    send(app, "POST", uri, token, Some(body)).await
}

pub async fn login(app: &Router, username: &str) -> Result<String> {
    let reply = post(app, "/login", None, json!({ "username": username })).await?;
    anyhow::ensure!(reply.status == StatusCode::OK, "login failed: {}", reply.body);
    Ok(reply.body["token"]
        .as_str()
        .context("token missing from login response")?
        .to_string())
}

pub fn event_form() -> Value {
    json!({
        "organizer": "Test Organizer",
        "name": "Test Event Name",
        "comment": "Test Event Details",
        "address": "Test Address",
        "geolocation": "0,0",
        "event_date": "12/1/2100",
        "event_time": "1:00",
    })
}

/// Logs `username` in and creates the standard test event, returning the
/// token and the event id.
pub async fn login_and_add_event(app: &Router, username: &str) -> Result<(String, i64)> {
    let token = login(app, username).await?;
    let reply = post(app, "/events/new", Some(&token), event_form()).await?;
    anyhow::ensure!(reply.status == StatusCode::OK, "create failed: {}", reply.body);
    // Listing is in insertion order, so the new event is last.
    let id = reply.body["events"]
        .as_array()
        .and_then(|events| events.last())
        .and_then(|event| event["id"].as_i64())
        .context("event id missing from listing")?;
    Ok((token, id))
}

/// The response row id for one of the three options on an event's detail page.
pub async fn response_id(app: &Router, event_id: i64, text: &str) -> Result<i64> {
    let reply = get(app, &format!("/events/{event_id}")).await?;
    reply.body["responses"]
        .as_array()
        .context("responses missing")?
        .iter()
        .find(|r| r["response_text"] == text)
        .and_then(|r| r["id"].as_i64())
        .with_context(|| format!("no response named {text}"))
}

pub fn tallies(detail: &Value) -> Vec<(String, i64)> {
    detail["responses"]
        .as_array()
        .map(|rs| {
            rs.iter()
                .map(|r| {
                    (
                        r["response_text"].as_str().unwrap_or_default().to_string(),
                        r["votes"].as_i64().unwrap_or(-1),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}
