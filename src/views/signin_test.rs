use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use super::*;
use crate::state::test_helpers::{MockProvider, api_error, test_app_state};
use crate::views::theme::{ThemeContext, ThemePreference};

fn layout() -> Layout {
    ThemeContext { preference: ThemePreference::Light, current_path: "/auth/signin".into() }.layout()
}

#[tokio::test]
async fn success_navigates_to_dashboard() {
    let provider = Arc::new(MockProvider::default());
    let state = test_app_state(provider.clone());
    let mut client = state.auth_client(CookieJar::new());
    let mut form = SignInForm::new();

    let outcome = form.submit(&mut client, "test@example.com", "password123").await;
    assert_eq!(outcome, FormOutcome::Navigate("/dashboard"));
    assert_eq!(form.status(), &FormStatus::Succeeded);
    assert_eq!(provider.calls(), vec!["sign_in_with_password".to_string()]);
}

#[tokio::test]
async fn failure_shows_provider_message_verbatim() {
    let provider = Arc::new(MockProvider::default());
    *provider.sign_in.lock().unwrap() = Err(api_error(400, "Invalid login credentials"));
    let state = test_app_state(provider);
    let mut client = state.auth_client(CookieJar::new());
    let mut form = SignInForm::new();

    let outcome = form.submit(&mut client, "test@example.com", "wrongpassword").await;
    assert_eq!(outcome, FormOutcome::Stay);
    assert_eq!(form.error(), Some("Invalid login credentials"));
    assert_eq!(form.email, "test@example.com");

    let html = form.render(&state.views, &layout()).unwrap();
    assert!(html.contains("Invalid login credentials"));
    assert!(html.contains(r#"value="test@example.com""#));
    assert!(!html.contains(">Signing in...</button>"));
}

#[test]
fn busy_label_while_submitting() {
    let views = Views::new().unwrap();
    let mut form = SignInForm::new();
    assert!(form.begin_submit("test@example.com"));
    assert_eq!(form.button_label(), "Signing in...");

    let html = form.render(&views, &layout()).unwrap();
    assert!(html.contains(">Signing in...</button>"));
    assert!(html.contains("disabled"));
}

#[test]
fn resubmit_refused_while_busy() {
    let mut form = SignInForm::new();
    assert!(form.begin_submit("a@example.com"));
    assert!(!form.begin_submit("b@example.com"));
    assert_eq!(form.email, "a@example.com");
}

#[test]
fn editable_again_after_error() {
    let mut form = SignInForm::new();
    form.begin_submit("a@example.com");
    form.finish::<(), _>(Err("nope"));
    assert!(!form.is_busy());
    assert_eq!(form.button_label(), "Sign In");
    assert!(form.begin_submit("a@example.com"));
}

#[test]
fn idle_page_renders_fields_and_link() {
    let views = Views::new().unwrap();
    let html = SignInForm::new().render(&views, &layout()).unwrap();
    assert!(html.contains("<h1>Sign In</h1>"));
    assert!(html.contains(r#"<label for="email">Email</label>"#));
    assert!(html.contains(r#"<label for="password">Password</label>"#));
    assert!(html.contains(r#"data-busy-label="Signing in...""#));
    assert!(html.contains("Don't have an account?"));
    assert!(html.contains(r#"href="/auth/signup""#));
}
