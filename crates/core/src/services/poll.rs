//! Poll service: listing, detail and administration of questions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use polls_common::{AppError, AppResult};
use polls_db::{
    entities::{choice, question},
    repositories::{ChoiceRepository, QuestionRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::visibility::{LATEST_LIMIT, MIN_CHOICES, is_presentable};

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    db: Arc<DatabaseConnection>,
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
}

/// A question together with its choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionWithChoices {
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
}

/// Input for creating a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionInput {
    #[validate(custom(function = "validate_question_text"))]
    pub question_text: String,

    /// Defaults to now.
    pub pub_date: Option<DateTime<Utc>>,

    #[validate(
        length(min = 2, max = 20),
        custom(function = "validate_choice_texts")
    )]
    pub choices: Vec<String>,
}

fn trimmed_len_ok(text: &str) -> bool {
    (1..=200).contains(&text.trim().chars().count())
}

fn validate_question_text(text: &str) -> Result<(), ValidationError> {
    if trimmed_len_ok(text) {
        Ok(())
    } else {
        Err(ValidationError::new("question_text_length"))
    }
}

fn validate_choice_texts(choices: &[String]) -> Result<(), ValidationError> {
    if choices.iter().all(|text| trimmed_len_ok(text)) {
        Ok(())
    } else {
        Err(ValidationError::new("choice_text_length"))
    }
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        question_repo: QuestionRepository,
        choice_repo: ChoiceRepository,
    ) -> Self {
        Self {
            db,
            question_repo,
            choice_repo,
        }
    }

    /// The latest presentable questions, newest first.
    pub async fn list_presentable(&self, now: DateTime<Utc>) -> AppResult<Vec<question::Model>> {
        self.question_repo
            .find_presentable(now, MIN_CHOICES as i64, LATEST_LIMIT)
            .await
    }

    /// A question and its choices, whether or not it is presentable.
    pub async fn get_question_with_choices(&self, id: i32) -> AppResult<QuestionWithChoices> {
        let question = self.question_repo.get_by_id(id).await?;
        let choices = self.choice_repo.find_by_question(id).await?;
        Ok(QuestionWithChoices { question, choices })
    }

    /// A presentable question and its choices. Hidden questions are
    /// reported exactly like missing ones.
    pub async fn get_presentable(
        &self,
        id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<QuestionWithChoices> {
        let found = self.get_question_with_choices(id).await?;
        if !is_presentable(&found.question, found.choices.len(), now) {
            return Err(AppError::QuestionNotFound(id));
        }
        Ok(found)
    }

    /// Create a question with its choices in one transaction.
    pub async fn create_question(
        &self,
        input: CreateQuestionInput,
    ) -> AppResult<QuestionWithChoices> {
        input.validate()?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question = QuestionRepository::create_in(
            &txn,
            question::ActiveModel {
                question_text: Set(input.question_text.trim().to_string()),
                pub_date: Set(input.pub_date.unwrap_or_else(Utc::now).into()),
                ..Default::default()
            },
        )
        .await?;

        let models = input
            .choices
            .iter()
            .map(|text| choice::ActiveModel {
                question_id: Set(question.id),
                choice_text: Set(text.trim().to_string()),
                votes: Set(0),
                percentage: Set(0),
                ..Default::default()
            })
            .collect();
        ChoiceRepository::create_many_in(&txn, models).await?;

        let choices = ChoiceRepository::find_by_question_in(&txn, question.id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(question_id = question.id, choices = choices.len(), "Question created");

        Ok(QuestionWithChoices { question, choices })
    }

    /// Delete a question; its choices and receipts go with it.
    pub async fn delete_question(&self, id: i32) -> AppResult<()> {
        self.question_repo.delete(id).await?;
        info!(question_id = id, "Question deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_question(id: i32, days: i64) -> question::Model {
        question::Model {
            id,
            question_text: "What's new?".to_string(),
            pub_date: (Utc::now() + Duration::days(days)).into(),
        }
    }

    fn create_test_choice(id: i32, question_id: i32) -> choice::Model {
        choice::Model {
            id,
            question_id,
            choice_text: format!("choice{id}"),
            votes: 0,
            percentage: 0,
        }
    }

    fn service(db: MockDatabase) -> PollService {
        let db = Arc::new(db.into_connection());
        PollService::new(
            Arc::clone(&db),
            QuestionRepository::new(Arc::clone(&db)),
            ChoiceRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_get_presentable() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question(1, -30)]])
                .append_query_results([[create_test_choice(1, 1), create_test_choice(2, 1)]]),
        );

        let found = svc.get_presentable(1, Utc::now()).await.unwrap();
        assert_eq!(found.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_future_question_is_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question(1, 30)]])
                .append_query_results([[create_test_choice(1, 1), create_test_choice(2, 1)]]),
        );

        let result = svc.get_presentable(1, Utc::now()).await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(1))));
    }

    #[tokio::test]
    async fn test_single_choice_question_is_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question(1, -30)]])
                .append_query_results([[create_test_choice(1, 1)]]),
        );

        let result = svc.get_presentable(1, Utc::now()).await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(1))));
    }

    #[tokio::test]
    async fn test_create_question() {
        let question = create_test_question(1, 0);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .append_query_results([[create_test_choice(1, 1), create_test_choice(2, 1)]]),
        );

        let created = svc
            .create_question(CreateQuestionInput {
                question_text: "What's new?".to_string(),
                pub_date: None,
                choices: vec!["Not much".to_string(), "The sky".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(created.question, question);
        assert_eq!(created.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_create_question_needs_two_choices() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .create_question(CreateQuestionInput {
                question_text: "Lonely?".to_string(),
                pub_date: None,
                choices: vec!["Yes".to_string()],
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_question_rejects_blank_choice() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .create_question(CreateQuestionInput {
                question_text: "Blank?".to_string(),
                pub_date: None,
                choices: vec!["Yes".to_string(), "   ".to_string()],
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_question_rejects_blank_text() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .create_question(CreateQuestionInput {
                question_text: "   ".to_string(),
                pub_date: None,
                choices: vec!["Yes".to_string(), "No".to_string()],
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_question_text_length_counts_trimmed_text() {
        assert!(validate_question_text("  Why?  ").is_ok());
        assert!(validate_question_text(&format!(" {} ", "a".repeat(200))).is_ok());
        assert!(validate_question_text(&"a".repeat(201)).is_err());
    }
}
