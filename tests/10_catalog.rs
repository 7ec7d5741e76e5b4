mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, post, send, TestContext};

#[tokio::test]
async fn album_round_trip() -> Result<()> {
    let ctx = TestContext::new()?;
    let album = json!({ "title": "Blue", "artist": 1, "genre": 2, "year": 1971 });

    let (status, created) = post(&ctx, "/albums", album.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("numeric id");
    assert_eq!(created["links"]["album"], format!("/albums/{}", id));

    let (status, fetched) = get(&ctx, &format!("/albums/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    for field in ["title", "artist", "genre", "year"] {
        assert_eq!(fetched[field], album[field], "field {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_dropped() -> Result<()> {
    let ctx = TestContext::new()?;
    let (_, created) = post(&ctx, "/genres", json!({ "genre": "Jazz", "mood": "cool" })).await?;

    let (_, fetched) = get(&ctx, &format!("/genres/{}", created["id"])).await?;
    assert_eq!(fetched["genre"], "Jazz");
    assert!(fetched.get("mood").is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_body_is_rejected_without_store_call() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = post(&ctx, "/artists", json!({ "name": "Nina" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body is not a valid artist object.");
    assert_eq!(ctx.catalog.calls(), 0);

    let (status, _) = send(ctx.app(), Method::POST, "/artists", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn present_but_empty_values_count() -> Result<()> {
    let ctx = TestContext::new()?;
    let (status, _) = post(&ctx, "/artists", json!({ "name": "", "genre": null })).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn replace_then_delete_song() -> Result<()> {
    let ctx = TestContext::new()?;
    let (_, created) = post(&ctx, "/songs", json!({ "title": "River", "artist": 1, "album": 1 })).await?;
    let path = format!("/songs/{}", created["id"]);

    let (status, body) = send(
        ctx.app(),
        Method::PUT,
        &path,
        Some(json!({ "title": "River", "artist": 1, "album": 1, "track": 4 })),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "links": { "song": path } }));
    assert_eq!(get(&ctx, &path).await?.1["track"], 4);

    let (status, body) = send(ctx.app(), Method::DELETE, &path, None, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = get(&ctx, &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn missing_records_are_404() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = send(ctx.app(), Method::DELETE, "/songs/999", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Requested resource /songs/999 does not exist");

    let (status, _) = send(
        ctx.app(),
        Method::PUT,
        "/genres/999",
        Some(json!({ "genre": "Rock" })),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&ctx, "/albums/abc").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Requested resource /albums/abc does not exist");
    Ok(())
}

#[tokio::test]
async fn list_pages_with_links() -> Result<()> {
    let ctx = TestContext::new()?;
    for n in 0..25 {
        post(&ctx, "/genres", json!({ "genre": format!("g{}", n) })).await?;
    }

    let (status, page) = get(&ctx, "/genres?page=2").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pageNumber"], 2);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["totalCount"], 25);
    assert_eq!(page["genres"].as_array().map(Vec::len), Some(10));
    assert_eq!(
        page["links"],
        json!({
            "nextPage": "/genres?page=3",
            "lastPage": "/genres?page=3",
            "prevPage": "/genres?page=1",
            "firstPage": "/genres?page=1"
        })
    );

    let (_, last) = get(&ctx, "/genres?page=99").await?;
    assert_eq!(last["pageNumber"], 3);
    assert_eq!(last["genres"].as_array().map(Vec::len), Some(5));

    let (_, first) = get(&ctx, "/genres?page=abc").await?;
    assert_eq!(first["pageNumber"], 1);
    assert!(first["links"].get("prevPage").is_none());
    Ok(())
}

#[tokio::test]
async fn repeated_page_parameter_uses_the_first() -> Result<()> {
    let ctx = TestContext::new()?;
    for n in 0..25 {
        post(&ctx, "/genres", json!({ "genre": format!("g{}", n) })).await?;
    }

    let (status, page) = get(&ctx, "/genres?page=2&page=3").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pageNumber"], 2);

    let (status, page) = get(&ctx, "/users?page=1&page=x").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pageNumber"], 1);
    Ok(())
}

#[tokio::test]
async fn empty_collection_is_one_page() -> Result<()> {
    let ctx = TestContext::new()?;
    let (status, page) = get(&ctx, "/artists").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["artists"], json!([]));
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["links"], json!({}));
    Ok(())
}

#[tokio::test]
async fn store_failure_is_500_with_static_message() -> Result<()> {
    let ctx = TestContext::new()?;
    ctx.catalog.set_failing(true);

    let (status, body) = get(&ctx, "/albums").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error fetching albums list.  Please try again later.");

    let (status, body) = post(&ctx, "/genres", json!({ "genre": "Jazz" })).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error inserting genre into DB.  Please try again later.");
    Ok(())
}
