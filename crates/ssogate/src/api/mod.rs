//! HTTP surface.
//!
//! Public landing page, health check and login routes, plus the protected
//! user page behind the session gate.

pub mod error;
mod handlers;
mod routes;
mod state;

pub use error::ErrorResponse;
pub use handlers::HealthResponse;
pub use routes::create_router;
pub use state::AppState;
