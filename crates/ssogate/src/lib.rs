//! ssogate: an OAuth2 login gateway.
//!
//! Users sign in through a configured identity provider (EVE Online and
//! Discord out of the box). The provider profile is normalized into an
//! [`identity::Identity`], which is carried in a signed, expiring `auth`
//! cookie. Protected routes sit behind [`auth::protect`].

pub mod api;
pub mod auth;
pub mod config;
pub mod flow;
pub mod identity;
pub mod pages;
pub mod provider;
