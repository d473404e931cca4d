use super::*;
use axum::http::Request;

async fn context_for(request: Request<()>) -> ThemeContext {
    let (mut parts, ()) = request.into_parts();
    ThemeContext::from_request_parts(&mut parts, &()).await.unwrap()
}

#[test]
fn parse_known_values() {
    assert_eq!(ThemePreference::parse(Some("light")), ThemePreference::Light);
    assert_eq!(ThemePreference::parse(Some("dark")), ThemePreference::Dark);
    assert_eq!(ThemePreference::parse(Some("system")), ThemePreference::System);
    assert_eq!(ThemePreference::parse(Some("purple")), ThemePreference::System);
    assert_eq!(ThemePreference::parse(None), ThemePreference::System);
}

#[test]
fn toggle_flips_between_light_and_dark_only() {
    assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
    assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
    assert_eq!(ThemePreference::System.toggled(), ThemePreference::Dark);
}

#[test]
fn toggle_title_describes_next_mode() {
    let light = ThemeToggle::for_preference(ThemePreference::Light);
    assert_eq!(light.title, "Switch to dark mode");
    assert_eq!(light.next, "dark");
    assert_eq!(light.label, "Toggle theme");

    let dark = ThemeToggle::for_preference(ThemePreference::Dark);
    assert_eq!(dark.title, "Switch to light mode");
    assert_eq!(dark.next, "light");
}

#[test]
fn system_renders_as_light() {
    let toggle = ThemeToggle::for_preference(ThemePreference::System);
    assert_eq!(toggle.title, "Switch to dark mode");
    assert!(!ThemePreference::System.is_dark());
}

#[test]
fn theme_cookie_attributes() {
    let cookie = theme_cookie(ThemePreference::Dark, true);
    assert_eq!(cookie.name(), THEME_COOKIE);
    assert_eq!(cookie.value(), "dark");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.secure(), Some(true));
}

#[tokio::test]
async fn extractor_reads_cookie_and_path() {
    let request = Request::builder()
        .uri("/auth/signin?x=1")
        .header("cookie", "theme=dark; other=1")
        .body(())
        .unwrap();
    let ctx = context_for(request).await;
    assert_eq!(ctx.preference, ThemePreference::Dark);
    assert_eq!(ctx.current_path, "/auth/signin?x=1");

    let layout = ctx.layout();
    assert!(layout.dark);
    assert_eq!(layout.toggle.title, "Switch to light mode");
}

#[tokio::test]
async fn extractor_defaults_to_system() {
    let ctx = context_for(Request::builder().uri("/").body(()).unwrap()).await;
    assert_eq!(ctx.preference, ThemePreference::System);
    assert!(!ctx.layout().dark);
}
