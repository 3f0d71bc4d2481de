use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::util::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_search_delete_roundtrip() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, a) = post_json(
        &app,
        "/clips",
        json!({ "type": "text", "content": "rust ownership model explained", "title": "Rust notes" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let a_id = a["id"].as_u64().unwrap();
    assert_eq!(a["type"], "text");
    assert!(a["created_at"].as_str().unwrap().contains('T'));

    let (_, b) = post_json(
        &app,
        "/clips",
        json!({ "type": "text", "content": "go concurrency patterns" }),
    )
    .await;
    let b_id = b["id"].as_u64().unwrap();

    let (status, hits) = get(&app, "/search?q=rust").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = hits.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![a_id]);

    let (_, hits) = get(&app, "/search?q=concurrency").await;
    let ids: Vec<u64> = hits.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![b_id]);

    let req = Request::delete(format!("/clips/{a_id}")).body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, hits) = get(&app, "/search?q=rust").await;
    assert!(hits.as_array().unwrap().is_empty());
    let (_, hits) = get(&app, "/search?q=notes").await;
    assert!(hits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    for content in ["first", "second", "third"] {
        post_json(&app, "/clips", json!({ "type": "text", "content": content })).await;
    }

    let (status, listed) = get(&app, "/clips").await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn update_reindexes_the_clip() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (_, a) = post_json(&app, "/clips", json!({ "type": "text", "content": "apple pie" })).await;
    let a_id = a["id"].as_u64().unwrap();

    let req = Request::put(format!("/clips/{a_id}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "type": "text", "content": "banana bread" }).to_string()))
        .unwrap();
    let (status, updated) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "banana bread");

    let (_, hits) = get(&app, "/search?q=apple").await;
    assert!(hits.as_array().unwrap().is_empty());
    let (_, hits) = get(&app, "/search?q=banana").await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn error_statuses() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let req = Request::delete("/clips/999").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Clip not found");

    let (status, _) = post_json(&app, "/clips", json!({ "type": "text", "content": "   " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_limit_and_empty_query() {
    let dir = tempdir().unwrap();
    let app = muse_server::build_app(dir.path().to_str().unwrap()).unwrap();

    for i in 0..5 {
        post_json(&app, "/clips", json!({ "type": "text", "content": format!("note {i}") })).await;
    }

    let (_, hits) = get(&app, "/search?q=note&limit=2").await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let (status, hits) = get(&app, "/search?q=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(hits.as_array().unwrap().is_empty());
}
