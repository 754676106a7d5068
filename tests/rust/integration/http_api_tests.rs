//! End-to-end HTTP behaviour of the router against an in-memory database.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use hopgraph::server::MAX_BODY_BYTES;
use serde_json::{json, Value};

use super::support::*;

// ---------------------------------------------------------------------------
// Connection profiles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_add_then_list_connections() {
    let app = app(FakeDatabase::default());

    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;
    post_ok(&app, "/connections/add", "name=dev&server=db2&db_name=sales", SESSION).await;

    let html = body_text(send(&app, get("/connections", SESSION)).await).await;
    let prod = html.find("<li>prod ").expect("prod listed");
    let dev = html.find("<li>dev ").expect("dev listed");
    assert!(prod < dev, "insertion order is kept");
    assert!(html.contains("No active connection"));
}

#[tokio::test]
async fn test_duplicate_add_is_bad_request() {
    let app = app(FakeDatabase::default());
    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;

    let response = send(
        &app,
        form("/connections/add", "name=prod&server=other&db_name=x", SESSION),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.starts_with("<p>Error: "));
    assert!(body.contains("already exists"));
}

#[tokio::test]
async fn test_select_and_delete_unknown_are_bad_request() {
    let app = app(FakeDatabase::default());

    let response = send(&app, form("/connections/select", "name=ghost", SESSION)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, form("/connections/delete", "name=ghost", SESSION)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("not found"));
}

#[tokio::test]
async fn test_select_marks_active_for_session_only() {
    let app = app(FakeDatabase::default());
    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", SESSION).await;

    let mine = body_text(send(&app, get("/connections", SESSION)).await).await;
    assert!(mine.contains("<strong id=\"selected\">prod</strong>"));

    let other = body_text(send(&app, get("/connections", "hopgraph_session=other")).await).await;
    assert!(other.contains("No active connection"));
}

#[tokio::test]
async fn test_delete_active_clears_selection_everywhere() {
    let app = app(FakeDatabase::default());
    let other = "hopgraph_session=second-browser";

    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", other).await;

    post_ok(&app, "/connections/delete", "name=prod", SESSION).await;

    for cookie in [SESSION, other] {
        let html = body_text(send(&app, get("/connections", cookie)).await).await;
        assert!(html.contains("No active connection"));
        assert!(!html.contains("<li>prod "));
    }
}

#[tokio::test]
async fn test_session_cookie_is_issued_once() {
    let app = app(FakeDatabase::default());

    let response = send(
        &app,
        axum::http::Request::builder()
            .uri("/")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("cookie issued")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("hopgraph_session="));

    let response = send(&app, get("/", SESSION)).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_responses_are_not_cacheable() {
    let app = app(FakeDatabase::default());
    let response = send(&app, get("/health", SESSION)).await;

    let headers = response.headers();
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-store, no-cache, must-revalidate, max-age=0"
    );
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
}

// ---------------------------------------------------------------------------
// Ad-hoc queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_query_without_active_connection_fails() {
    let db = FakeDatabase::default();
    let recorder = Arc::clone(&db.recorder);
    let app = app(db);

    let response = send(&app, form("/query", "sql=SELECT+1", SESSION)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response)
        .await
        .contains("No active connection selected"));
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_query_renders_rows_and_releases_session() {
    let db = FakeDatabase {
        rows: vec![
            serde_json::from_value(json!({"id": 1, "name": "alpha"})).unwrap(),
            serde_json::from_value(json!({"id": 2, "name": "beta"})).unwrap(),
        ],
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = app(db);

    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", SESSION).await;

    let response = send(
        &app,
        form("/query", "sql=SELECT+id%2C+name+FROM+t+WHERE+x+%3D+%3F", SESSION),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<tr><th>id</th><th>name</th></tr>"));
    assert!(html.contains("<tr><td>2</td><td>beta</td></tr>"));

    assert_eq!(
        recorder.sql.lock().unwrap().as_slice(),
        ["SELECT id, name FROM t WHERE x = ?"]
    );
    let descriptor = recorder.descriptors.lock().unwrap()[0].clone();
    assert_eq!(descriptor.server, "db1");
    assert_eq!(descriptor.database, "sales");
    assert_eq!(descriptor.user, "tester@example");
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_failure_is_reported_verbatim() {
    let db = FakeDatabase {
        failure: Some("Table sales.t doesn't exist".to_string()),
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = app(db);

    post_ok(&app, "/connections/add", "name=prod&server=db1&db_name=sales", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", SESSION).await;

    let response = send(&app, form("/query", "sql=SELECT+*+FROM+t", SESSION)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response)
        .await
        .contains("Table sales.t doesn&#x27;t exist"));
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_form_is_rejected() {
    let db = FakeDatabase::default();
    let recorder = Arc::clone(&db.recorder);
    let app = app(db);
    post_ok(&app, "/connections/add", "name=prod&server=h&db_name=d", SESSION).await;
    post_ok(&app, "/connections/select", "name=prod", SESSION).await;

    let body = format!("sql={}", "x".repeat(MAX_BODY_BYTES + 1));
    let response = send(&app, form("/query", &body, SESSION)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Session registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cookieless_requests_do_not_accumulate_sessions() {
    let (app, state) = app_with_state(FakeDatabase::default());
    post_ok(&app, "/connections/add", "name=prod&server=h&db_name=d", SESSION).await;

    for _ in 0..20 {
        let request = Request::builder()
            .method("POST")
            .uri("/connections/select")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=prod"))
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::OK);
    }
    assert_eq!(state.sessions.len().await, 20);

    post_ok(&app, "/connections/delete", "name=prod", SESSION).await;
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn test_empty_selection_leaves_no_session_entry() {
    let (app, state) = app_with_state(FakeDatabase::default());
    post_ok(&app, "/connections/add", "name=prod&server=h&db_name=d", SESSION).await;
    post_ok(&app, "/connections/add", "name=dev&server=h&db_name=d", SESSION).await;
    assert_eq!(state.sessions.len().await, 0);

    post_ok(&app, "/connections/select", "name=prod", SESSION).await;
    assert_eq!(state.sessions.len().await, 1);

    // Deleting an inactive profile keeps the selection.
    post_ok(&app, "/connections/delete", "name=dev", SESSION).await;
    assert_eq!(state.sessions.len().await, 1);

    post_ok(&app, "/connections/delete", "name=prod", SESSION).await;
    assert_eq!(state.sessions.len().await, 0);
}

// ---------------------------------------------------------------------------
// Hops
// ---------------------------------------------------------------------------

async fn hop_app(db: FakeDatabase) -> axum::Router {
    let app = app(db);
    post_ok(&app, "/connections/add", "name=graph&server=gdb&db_name=kg", SESSION).await;
    post_ok(&app, "/connections/select", "name=graph", SESSION).await;
    app
}

#[tokio::test]
async fn test_hops_returns_graph_elements() {
    let db = FakeDatabase {
        hops: vec![
            hop_row("A", "B", "E1", "default"),
            hop_row("A", "C", "E2", "inverse"),
            hop_row("A", "B", "E1", "default"),
        ],
        ..Default::default()
    };
    let app = hop_app(db).await;

    let response = send(&app, get("/hops?by_v_id=A&limit=10", SESSION)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();

    assert_eq!(
        body,
        json!({
            "nodes": [
                {"data": {"id": "A", "label": "A label", "type": "Vertex"}},
                {"data": {"id": "B", "label": "B label", "type": "Vertex"}},
                {"data": {"id": "C", "label": "C label", "type": "Vertex"}}
            ],
            "edges": [
                {"data": {"id": "E1", "type": "linked", "source": "A", "target": "B"}},
                {"data": {"id": "E2", "type": "linked", "source": "C", "target": "A"}}
            ]
        })
    );
}

#[tokio::test]
async fn test_hops_selector_precedence_and_limit() {
    let db = FakeDatabase {
        hops: vec![hop_row("A", "B", "E1", "default")],
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    let response = send(
        &app,
        get("/hops?by_like_v_label_en=lab&by_v_id=A&limit=3", SESSION),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let queries = recorder.hop_queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].sql.contains("WHERE v_id = {v_id:String}"));
    assert!(queries[0].sql.ends_with("LIMIT 3"));
    assert_eq!(queries[0].params[0].value, "A");
}

#[tokio::test]
async fn test_hops_default_limit() {
    let db = FakeDatabase {
        hops: vec![hop_row("A", "B", "E1", "default")],
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    send(&app, get("/hops", SESSION)).await;
    let queries = recorder.hop_queries.lock().unwrap();
    assert!(queries[0].sql.ends_with("LIMIT 50"));
    assert!(queries[0].params.is_empty());
}

#[tokio::test]
async fn test_hops_no_match_is_not_found() {
    let db = FakeDatabase {
        hops: vec![hop_row("A", "B", "E1", "default")],
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    let response = send(&app, get("/hops?by_v_id=nobody", SESSION)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"detail": "No data found"}));
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_hops_invalid_limit() {
    let db = FakeDatabase::default();
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    for uri in ["/hops?limit=0", "/hops?by_v_id=A&limit=abc", "/hops?limit=-4"] {
        let response = send(&app, get(uri, SESSION)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(
            body["detail"]
                .as_str()
                .is_some_and(|detail| detail.contains("positive integer")),
            "{}: {}",
            uri,
            body
        );
    }
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hops_blank_limit_uses_default() {
    let db = FakeDatabase {
        hops: vec![hop_row("A", "B", "E1", "default")],
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    let response = send(&app, get("/hops?by_v_id=A&limit=", SESSION)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let queries = recorder.hop_queries.lock().unwrap();
    assert!(queries[0].sql.ends_with("LIMIT 50"));
}

#[tokio::test]
async fn test_hops_database_failure_is_server_error() {
    let db = FakeDatabase {
        failure: Some("connection refused".to_string()),
        ..Default::default()
    };
    let recorder = Arc::clone(&db.recorder);
    let app = hop_app(db).await;

    let response = send(&app, get("/hops?by_v_label_en=x", SESSION)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"detail": "connection refused"}));
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_hops_without_active_connection() {
    let app = app(FakeDatabase::default());
    let response = send(&app, get("/hops?by_v_id=A", SESSION)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"detail": "No active connection selected"}));
}
