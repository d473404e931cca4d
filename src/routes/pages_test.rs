use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use super::*;
use crate::routes::app;
use crate::state::test_helpers::{MockProvider, body_text, location, set_cookies, test_app_state};
use crate::views::theme::THEME_COOKIE;

fn toggle(cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/theme")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[test]
fn redirect_target_stays_local() {
    assert_eq!(local_redirect_target(Some("/auth/signin?x=1")), "/auth/signin?x=1");
    assert_eq!(local_redirect_target(Some("https://evil.example")), "/");
    assert_eq!(local_redirect_target(Some("//evil.example")), "/");
    assert_eq!(local_redirect_target(Some("/\\evil.example")), "/");
    assert_eq!(local_redirect_target(None), "/");
    assert_eq!(local_redirect_target(Some("/a\nb")), "/");
    assert_eq!(local_redirect_target(Some("/caf\u{e9}")), "/");
}

#[tokio::test]
async fn home_renders_hero_and_features() {
    let provider = Arc::new(MockProvider::default());
    let state = test_app_state(provider.clone());
    let response = app(state).oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("XPLR"));
    assert!(body.contains("Your journey begins here. Discover new horizons."));
    for feature in ["Explore", "Create", "Share"] {
        assert!(body.contains(&format!("<h2>{feature}</h2>")));
    }
    assert!(body.contains("Start your journey to explore amazing experiences."));
    assert!(body.contains("Switch to dark mode"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn toggle_from_light_writes_dark() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state)
        .oneshot(toggle(Some("theme=light"), "next=%2Fauth%2Fsignin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/signin"));
    let theme = set_cookies(&response).into_iter().find(|c| c.name() == THEME_COOKIE).unwrap();
    assert_eq!(theme.value(), "dark");
}

#[tokio::test]
async fn toggle_from_dark_writes_light_and_rejects_foreign_target() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state)
        .oneshot(toggle(Some("theme=dark"), "next=https%3A%2F%2Fevil.example"))
        .await
        .unwrap();
    assert_eq!(location(&response), Some("/"));
    let theme = set_cookies(&response).into_iter().find(|c| c.name() == THEME_COOKIE).unwrap();
    assert_eq!(theme.value(), "light");
}

#[tokio::test]
async fn dark_theme_renders_dark_class() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let request = Request::builder().uri("/").header(COOKIE, "theme=dark").body(Body::empty()).unwrap();
    let body = body_text(app(state).oneshot(request).await.unwrap()).await;
    assert!(body.contains(r#"<html lang="en" class="dark">"#));
    assert!(body.contains("Switch to light mode"));
}

#[tokio::test]
async fn toggle_with_control_characters_in_target_goes_home() {
    let state = test_app_state(Arc::new(MockProvider::default()));
    let response = app(state).oneshot(toggle(None, "next=%2Fa%0Ab")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
}
