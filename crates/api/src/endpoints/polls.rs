//! Poll pages and voting.

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::{Form, FormRejection};
use chrono::{DateTime, FixedOffset, Utc};
use polls_common::{AppError, AppResult};
use polls_core::{ChoiceTally, QuestionWithChoices, Tally, VoteError};
use polls_db::entities::{choice, question};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::LoginRequired,
    middleware::AppState,
    response::{ApiResponse, found},
};

const NO_POLLS_MESSAGE: &str = "No polls are available.";

/// Question as shown on every poll page.
#[derive(Serialize)]
pub struct QuestionView {
    pub id: i32,
    pub question_text: String,
    pub pub_date: DateTime<FixedOffset>,
    pub was_published_recently: bool,
}

impl QuestionView {
    fn new(question: question::Model, now: DateTime<Utc>) -> Self {
        Self {
            was_published_recently: question.was_published_recently(now),
            id: question.id,
            question_text: question.question_text,
            pub_date: question.pub_date,
        }
    }
}

#[derive(Serialize)]
pub struct IndexPage {
    pub latest_question_list: Vec<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct ChoiceView {
    pub id: i32,
    pub choice_text: String,
}

impl From<choice::Model> for ChoiceView {
    fn from(choice: choice::Model) -> Self {
        Self {
            id: choice.id,
            choice_text: choice.choice_text,
        }
    }
}

/// Voting form for one question.
#[derive(Serialize)]
pub struct DetailPage {
    pub question: QuestionView,
    pub choices: Vec<ChoiceView>,
    pub vote_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DetailPage {
    fn new(loaded: QuestionWithChoices, error_message: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            vote_url: format!("/polls/{}/vote/", loaded.question.id),
            question: QuestionView::new(loaded.question, now),
            choices: loaded.choices.into_iter().map(ChoiceView::from).collect(),
            error_message,
        }
    }
}

#[derive(Serialize)]
pub struct ResultsPage {
    pub question: QuestionView,
    pub total_votes: i64,
    pub choices: Vec<ChoiceTally>,
}

/// Latest five presentable questions.
async fn index(State(state): State<AppState>) -> AppResult<ApiResponse<IndexPage>> {
    let now = Utc::now();
    let questions = state.poll_service.list_presentable(now).await?;

    let message = questions.is_empty().then_some(NO_POLLS_MESSAGE);
    Ok(ApiResponse::ok(IndexPage {
        latest_question_list: questions
            .into_iter()
            .map(|q| QuestionView::new(q, now))
            .collect(),
        message,
    }))
}

async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> AppResult<ApiResponse<DetailPage>> {
    let now = Utc::now();
    let loaded = state.poll_service.get_presentable(question_id, now).await?;
    Ok(ApiResponse::ok(DetailPage::new(loaded, None, now)))
}

async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> AppResult<ApiResponse<ResultsPage>> {
    let now = Utc::now();
    let loaded = state.poll_service.get_presentable(question_id, now).await?;
    let tally = Tally::from_choices(question_id, &loaded.choices);

    Ok(ApiResponse::ok(ResultsPage {
        question: QuestionView::new(loaded.question, now),
        total_votes: tally.total_votes,
        choices: tally.choices,
    }))
}

/// Vote form. `choice` stays a string so that a malformed value is
/// reported like a missing one; when it is repeated the last value wins.
#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub choice: Vec<String>,
}

impl VoteForm {
    fn choice_id(&self) -> Option<i32> {
        self.choice
            .last()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
    }
}

async fn vote(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(question_id): Path<i32>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> AppResult<Response> {
    // An unreadable body carries no selection.
    let choice_id = form.map(|Form(form)| form).unwrap_or_default().choice_id();

    match state
        .vote_service
        .cast_vote(&user.id, question_id, choice_id)
        .await
    {
        Ok(_) => Ok(found(&format!("/polls/{question_id}/results/"))),
        Err(VoteError::NotFound(id)) => Err(AppError::QuestionNotFound(id)),
        Err(err @ (VoteError::MissingSelection | VoteError::AlreadyVoted)) => {
            let loaded = state
                .poll_service
                .get_question_with_choices(question_id)
                .await?;
            Ok(ApiResponse::ok(DetailPage::new(loaded, Some(err.to_string()), Utc::now()))
                .into_response())
        }
        Err(VoteError::Store(e)) => Err(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/polls/", get(index))
        .route("/polls/{question_id}/", get(detail))
        .route("/polls/{question_id}/results/", get(results))
        .route("/polls/{question_id}/vote/", post(vote))
}
