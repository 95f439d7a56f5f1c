//! Test utilities and common setup.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::Value;
use ssogate::api::{self, AppState};
use ssogate::auth::SessionCodec;
use ssogate::config::{GatewayConfig, SessionConfig};
use ssogate::identity::Identity;
use ssogate::provider::{ConsentMode, ProfileFormat, ProviderSettings};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Base URL nothing listens on, for tests that never reach a provider.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Both providers, pointed at `base` (usually a wiremock server).
pub fn test_providers(base: &str) -> Vec<ProviderSettings> {
    vec![
        ProviderSettings {
            id: "eve".to_string(),
            name: Some("EVE Online".to_string()),
            client_id: "eve-client".to_string(),
            client_secret: "eve-secret".to_string(),
            redirect_url: "http://localhost:4000/auth/callback/eve".to_string(),
            scopes: vec!["publicData".to_string()],
            authorization_endpoint: format!("{base}/eve/authorize"),
            token_endpoint: format!("{base}/eve/token"),
            profile_endpoint: format!("{base}/eve/verify"),
            consent: ConsentMode::Offline,
            profile: ProfileFormat::Eve,
        },
        ProviderSettings {
            id: "discord".to_string(),
            name: Some("Discord".to_string()),
            client_id: "discord-client".to_string(),
            client_secret: "discord-secret".to_string(),
            redirect_url: "http://localhost:4000/auth/callback/discord".to_string(),
            scopes: vec!["identify".to_string(), "email".to_string()],
            authorization_endpoint: format!("{base}/discord/authorize"),
            token_endpoint: format!("{base}/discord/token"),
            profile_endpoint: format!("{base}/discord/users/@me"),
            consent: ConsentMode::Online,
            profile: ProfileFormat::Discord,
        },
    ]
}

pub fn test_config(base: &str) -> GatewayConfig {
    GatewayConfig {
        session: SessionConfig {
            secret: Some(TEST_SECRET.to_string()),
            ..SessionConfig::default()
        },
        providers: test_providers(base),
        ..GatewayConfig::default()
    }
}

/// Router wired exactly as the server wires it.
pub fn test_app(base: &str) -> Router {
    let state = AppState::from_config(&test_config(base)).expect("valid test config");
    api::create_router(state)
}

/// Codec sharing the test secret, for minting and checking cookies.
pub fn test_codec() -> SessionCodec {
    let session = SessionConfig::default();
    SessionCodec::new(TEST_SECRET, session.ttl_secs, session.state_ttl_secs)
}

pub fn session_cookie_for(subject_id: &str, display_name: &str) -> String {
    let token = test_codec()
        .encode(&Identity {
            subject_id: subject_id.to_string(),
            display_name: display_name.to_string(),
            provider_id: "eve".to_string(),
        })
        .unwrap();
    format!("auth={token}")
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// A started login: the `oauth_state` cookie pair and the `state` value the
/// provider would echo back.
pub struct StartedLogin {
    pub cookie: String,
    pub state: String,
}

pub async fn start_login(app: &Router, provider: &str) -> StartedLogin {
    let response = get(app, &format!("/auth/login/{provider}"), None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let url = reqwest::Url::parse(&location(&response).unwrap()).unwrap();
    let state = url
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    let cookie = cookie_pair(&set_cookies(&response)[0]);

    StartedLogin { cookie, state }
}
