use super::*;
use crate::provider::User;
use uuid::Uuid;

fn settings() -> CookieSettings {
    CookieSettings::new("abcd", true)
}

fn session_with_metadata(padding: usize) -> Session {
    let mut user_metadata = serde_json::Map::new();
    user_metadata.insert("bio".into(), serde_json::json!("x".repeat(padding)));
    Session {
        access_token: "access-1".into(),
        refresh_token: "refresh-1".into(),
        token_type: "bearer".into(),
        expires_in: 3600,
        expires_at: 1_710_939_600,
        user: User {
            id: Uuid::nil(),
            email: Some("test@example.com".into()),
            aud: None,
            role: None,
            last_sign_in_at: None,
            created_at: None,
            app_metadata: serde_json::Map::new(),
            user_metadata,
        },
    }
}

fn jar_from(cookies: &CookieJar) -> CookieJar {
    cookies
        .iter()
        .filter(|c| !is_removal(c))
        .fold(CookieJar::new(), |jar, c| jar.add(Cookie::new(c.name().to_string(), c.value().to_string())))
}

// =============================================================================
// settings
// =============================================================================

#[test]
fn settings_namespace_cookies_by_project() {
    let s = settings();
    assert_eq!(s.session_name, "sb-abcd-auth-token");
    assert_eq!(s.verifier_name, "sb-abcd-auth-token-code-verifier");
}

#[test]
fn built_cookie_attributes() {
    let cookie = settings().build("name", "value");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert!(!is_removal(&cookie));
}

#[test]
fn removal_cookie_expires_immediately() {
    let cookie = settings().removal("name");
    assert_eq!(cookie.value(), "");
    assert!(is_removal(&cookie));
}

// =============================================================================
// codec
// =============================================================================

#[test]
fn session_codec_round_trips() {
    let session = session_with_metadata(10);
    let encoded = encode_session(&session).unwrap();
    assert!(encoded.starts_with("base64-"));
    assert_eq!(decode_session(&encoded), Some(session));
}

#[test]
fn decode_accepts_plain_json() {
    let session = session_with_metadata(0);
    let json = serde_json::to_string(&session).unwrap();
    assert_eq!(decode_session(&json), Some(session));
}

#[test]
fn decode_rejects_garbage() {
    assert_eq!(decode_session("base64-!!!"), None);
    assert_eq!(decode_session("not a session"), None);
}

// =============================================================================
// chunking
// =============================================================================

#[test]
fn split_chunks_respects_limit() {
    let value = "a".repeat(CHUNK_SIZE * 2 + 5);
    let chunks = split_chunks(&value);
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| c.len() <= CHUNK_SIZE));
    assert_eq!(chunks.concat(), value);
}

#[test]
fn chunk_name_matching() {
    assert!(is_chunk_of("sb-abcd-auth-token.0", "sb-abcd-auth-token"));
    assert!(is_chunk_of("sb-abcd-auth-token.12", "sb-abcd-auth-token"));
    assert!(!is_chunk_of("sb-abcd-auth-token", "sb-abcd-auth-token"));
    assert!(!is_chunk_of("sb-abcd-auth-token-code-verifier", "sb-abcd-auth-token"));
    assert!(!is_chunk_of("sb-abcd-auth-token.", "sb-abcd-auth-token"));
}

#[test]
fn short_value_written_under_bare_name() {
    let s = settings();
    let out = write_chunked(&s, &CookieJar::new(), CookieJar::new(), &s.session_name, "small");
    assert_eq!(out.get(&s.session_name).map(Cookie::value), Some("small"));
    assert!(out.get("sb-abcd-auth-token.0").is_none());
}

#[test]
fn long_session_round_trips_through_chunks() {
    let s = settings();
    let session = session_with_metadata(CHUNK_SIZE * 2);
    let encoded = encode_session(&session).unwrap();
    let out = write_chunked(&s, &CookieJar::new(), CookieJar::new(), &s.session_name, &encoded);

    assert!(out.get(&s.session_name).is_none());
    assert!(out.get("sb-abcd-auth-token.0").is_some());
    assert!(out.get("sb-abcd-auth-token.1").is_some());

    let browser = jar_from(&out);
    let restored = read_chunked(&browser, &s.session_name).and_then(|raw| decode_session(&raw));
    assert_eq!(restored, Some(session));
}

#[test]
fn shorter_write_removes_stale_chunks() {
    let s = settings();
    let incoming = CookieJar::new()
        .add(Cookie::new("sb-abcd-auth-token.0", "aaa"))
        .add(Cookie::new("sb-abcd-auth-token.1", "bbb"))
        .add(Cookie::new("unrelated", "keep"));

    let out = write_chunked(&s, &incoming, CookieJar::new(), &s.session_name, "fresh");

    assert_eq!(out.get(&s.session_name).map(Cookie::value), Some("fresh"));
    assert!(out.get("sb-abcd-auth-token.0").is_some_and(is_removal));
    assert!(out.get("sb-abcd-auth-token.1").is_some_and(is_removal));
    assert!(out.get("unrelated").is_none());
}

#[test]
fn chunked_write_removes_stale_bare_cookie() {
    let s = settings();
    let incoming = CookieJar::new().add(Cookie::new("sb-abcd-auth-token", "old"));
    let long = "z".repeat(CHUNK_SIZE + 1);

    let out = write_chunked(&s, &incoming, CookieJar::new(), &s.session_name, &long);

    assert!(out.get("sb-abcd-auth-token").is_some_and(is_removal));
    assert_eq!(out.get("sb-abcd-auth-token.1").map(Cookie::value), Some("z"));
}

#[test]
fn remove_chunked_clears_every_piece() {
    let s = settings();
    let incoming = CookieJar::new()
        .add(Cookie::new("sb-abcd-auth-token.0", "aaa"))
        .add(Cookie::new("sb-abcd-auth-token.1", "bbb"));

    let out = remove_chunked(&s, &incoming, CookieJar::new(), &s.session_name);

    assert!(out.get("sb-abcd-auth-token.0").is_some_and(is_removal));
    assert!(out.get("sb-abcd-auth-token.1").is_some_and(is_removal));
}

#[test]
fn read_chunked_ignores_empty_values() {
    let jar = CookieJar::new().add(Cookie::new("sb-abcd-auth-token", ""));
    assert_eq!(read_chunked(&jar, "sb-abcd-auth-token"), None);
    assert_eq!(read_chunked(&CookieJar::new(), "sb-abcd-auth-token"), None);
}

// =============================================================================
// BrowserId
// =============================================================================

#[test]
fn bytes_to_hex_pads_each_byte() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn browser_id_generate_is_64_hex_chars() {
    let id = BrowserId::generate();
    assert_eq!(id.as_str().len(), 64);
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(id, BrowserId::generate());
}

#[test]
fn browser_id_from_jar_validates_shape() {
    let id = BrowserId::generate();
    let jar = CookieJar::new().add(Cookie::new(BROWSER_COOKIE, id.to_string()));
    assert_eq!(BrowserId::from_jar(&jar), Some(id));

    let tampered = CookieJar::new().add(Cookie::new(BROWSER_COOKIE, "../../etc"));
    assert_eq!(BrowserId::from_jar(&tampered), None);
    assert_eq!(BrowserId::from_jar(&CookieJar::new()), None);
}
