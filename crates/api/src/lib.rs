//! HTTP layer for polls.
//!
//! - **Endpoints**: home, login/logout/sign-up, poll pages and voting, administration
//! - **Extractors**: authenticated and optional users, login-required redirects
//! - **Middleware**: session resolution from bearer token or cookie
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
