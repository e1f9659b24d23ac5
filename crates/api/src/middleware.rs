//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use polls_common::config::AuthConfig;
use polls_core::{PollService, UserService, VoteService};
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and sessions.
    pub user_service: UserService,
    /// Question listing, detail and administration.
    pub poll_service: PollService,
    /// Eligibility, vote recording and tallies.
    pub vote_service: VoteService,
    /// Session cookie settings.
    pub auth: AuthConfig,
}

/// Authentication middleware.
///
/// Resolves the session token from `Authorization: Bearer` first, then the
/// session cookie, and stores the matching user in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer.or_else(|| {
        jar.get(&state.auth.session_cookie)
            .map(|cookie| cookie.value().to_string())
    });

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(error = %e, "Ignoring unusable session token"),
        }
    }

    next.run(req).await
}
