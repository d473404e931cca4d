use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::{MockProvider, body_text, test_app_state};
use crate::views::Views;

#[tokio::test]
async fn healthz_is_ok() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state).oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stylesheet_is_served() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state)
        .oneshot(Request::builder().uri("/static/app.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(".spinner"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state).oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn render_failure_is_internal_error() {
    let views = Views::new().unwrap();
    let response = html(views.render("missing.html", ()));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn script_leaves_dashboard_when_stream_closes() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state)
        .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains(r#"source.addEventListener("error""#));
    assert!(body.contains("EventSource.CLOSED"));
}
