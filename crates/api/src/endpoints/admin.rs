//! Poll administration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use chrono::{DateTime, FixedOffset};
use polls_common::{AppError, AppResult};
use polls_core::CreateQuestionInput;
use polls_db::entities::user;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Created question with its choice IDs.
#[derive(Serialize)]
pub struct CreatedQuestion {
    pub id: i32,
    pub question_text: String,
    pub pub_date: DateTime<FixedOffset>,
    pub choice_ids: Vec<i32>,
}

fn ensure_admin(user: &user::Model) -> AppResult<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Administrator access required".to_string()))
    }
}

async fn create_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<ApiResponse<CreatedQuestion>> {
    ensure_admin(&user)?;

    let created = state.poll_service.create_question(input).await?;

    Ok(ApiResponse::ok(CreatedQuestion {
        id: created.question.id,
        question_text: created.question.question_text,
        pub_date: created.question.pub_date,
        choice_ids: created.choices.iter().map(|c| c.id).collect(),
    }))
}

async fn delete_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> AppResult<StatusCode> {
    ensure_admin(&user)?;
    state.poll_service.delete_question(question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/polls/", post(create_question))
        .route("/admin/polls/{question_id}/", delete(delete_question))
}
