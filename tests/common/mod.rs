#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub use music_catalog_api::testing::TestContext;

const MAX_BODY: usize = 1024 * 1024;

/// Send one request through `app` and decode the JSON body (`Null` if empty).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), MAX_BODY).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

pub async fn get(ctx: &TestContext, uri: &str) -> Result<(StatusCode, Value)> {
    send(ctx.app(), Method::GET, uri, None, None).await
}

pub async fn post(ctx: &TestContext, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    send(ctx.app(), Method::POST, uri, Some(body), None).await
}

/// Register `user_id` with password `secret` and return a token for it.
pub async fn register(ctx: &TestContext, user_id: &str, name: &str) -> Result<String> {
    let (status, body) = post(
        ctx,
        "/users",
        serde_json::json!({ "userID": user_id, "name": name, "password": "secret" }),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
    ctx.token_for(user_id)
}
