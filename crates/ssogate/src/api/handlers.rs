//! HTTP request handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, cookie_value};
use crate::flow::{AuthAction, CallbackParams, FlowError, STATE_COOKIE};
use crate::pages;

use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Public landing page.
pub async fn landing(State(state): State<AppState>) -> Html<String> {
    pages::landing(&state.registry)
}

/// Protected user page. Only reachable through the session gate.
pub async fn user_page(user: CurrentUser) -> Html<String> {
    pages::user(&user)
}

/// `/auth/{action}/{provider}`
///
/// The query is only read by the callback, so a malformed one never changes
/// the outcome of a login or an unsupported action.
pub async fn auth_action(
    State(state): State<AppState>,
    Path((action, provider)): Path<(String, String)>,
    query: Result<Query<CallbackParams>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let action = match action.parse::<AuthAction>() {
        Ok(action) => action,
        Err(e) => return e.into_response(),
    };

    match action {
        AuthAction::Login => state.flow.initiate_login(&provider).into_response(),
        AuthAction::Callback => {
            let Query(params) = match query {
                Ok(query) => query,
                Err(rejection) => {
                    return FlowError::BadCallback(rejection.body_text()).into_response();
                }
            };
            let state_cookie = match cookie_value(&headers, STATE_COOKIE) {
                Ok(cookie) => cookie,
                Err(e) => return e.into_response(),
            };
            state
                .flow
                .complete_login(&provider, &params, state_cookie)
                .await
                .into_response()
        }
    }
}
