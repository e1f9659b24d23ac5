//! Authentication endpoints.

use axum::{
    Form, Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use polls_common::AppResult;
use polls_core::CreateUserInput;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Signup request.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Signup response.
#[derive(Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<ApiResponse<SignupResponse>> {
    let user = state
        .user_service
        .create(CreateUserInput {
            username: req.username,
            password: req.password,
            is_admin: false,
        })
        .await?;

    Ok(ApiResponse::ok(SignupResponse {
        id: user.id,
        username: user.username,
        token: user.token.unwrap_or_default(),
    }))
}

/// One field of the login form.
#[derive(Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
}

/// Login page document.
#[derive(Serialize)]
pub struct LoginPage {
    pub action: &'static str,
    pub fields: [FormField; 2],
}

/// Describe the login form.
async fn login_page() -> ApiResponse<LoginPage> {
    ApiResponse::ok(LoginPage {
        action: "/login/",
        fields: [
            FormField {
                name: "username",
                label: "Admission Number",
                input_type: "text",
            },
            FormField {
                name: "password",
                label: "Password",
                input_type: "password",
            },
        ],
    })
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Check credentials, set the session cookie and go home.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = state
        .user_service
        .authenticate(&form.username, &form.password)
        .await?;

    let token = match user.token {
        Some(token) => token,
        None => state.user_service.regenerate_token(&user.id).await?,
    };

    let cookie = Cookie::build((state.auth.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .secure(state.auth.secure_cookies)
        .same_site(SameSite::Lax);

    info!(user_id = %user.id, "User logged in");

    Ok((jar.add(cookie), found("/")).into_response())
}

/// Logout response.
#[derive(Serialize)]
pub struct LogoutPage {
    pub message: &'static str,
    pub login_url: &'static str,
}

/// End the session: the token is rotated so copies of the cookie stop
/// working, then the cookie is cleared.
async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.regenerate_token(&user.id).await?;
        info!(user_id = %user.id, "User logged out");
    }

    let jar = jar.remove(Cookie::build(state.auth.session_cookie.clone()).path("/"));

    Ok((
        jar,
        ApiResponse::ok(LogoutPage {
            message: "You have been logged out.",
            login_url: "/login/",
        }),
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", post(signup))
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout))
}
