//! OAuth2 authorization-code flow.
//!
//! `/auth/login/{provider}` redirects to the provider with a fresh state value
//! kept in a signed, short-lived cookie. `/auth/callback/{provider}` checks
//! that state, exchanges the code, fetches and normalizes the profile and
//! issues the session cookie.

mod client;
mod controller;
mod error;
mod state;

pub use client::{AccessToken, EXPIRY_DELTA_SECS, ProviderClient, TokenResponse};
pub use controller::{
    AuthAction, AuthFlowController, CallbackParams, CompletedLogin, LoginRedirect,
};
pub use error::FlowError;
pub use state::{STATE_COOKIE, new_state, verify_state};
