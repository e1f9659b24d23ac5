//! Home page.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::{
    extractors::{LOGIN_PATH, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Home page document.
#[derive(Serialize)]
pub struct HomePage {
    pub username: String,
    pub is_admin: bool,
    pub polls_url: &'static str,
    pub logout_url: &'static str,
}

/// Landing page; anonymous visitors go to the login page.
async fn home(MaybeAuthUser(user): MaybeAuthUser) -> Response {
    let Some(user) = user else {
        return found(LOGIN_PATH);
    };

    ApiResponse::ok(HomePage {
        username: user.username,
        is_admin: user.is_admin,
        polls_url: "/polls/",
        logout_url: "/logout/",
    })
    .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}
