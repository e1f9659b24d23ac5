//! Voter (vote receipt) repository.

use std::sync::Arc;

use chrono::Utc;
use polls_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::entities::{Voter, voter};

/// Voter repository for database operations.
#[derive(Clone)]
pub struct VoterRepository {
    db: Arc<DatabaseConnection>,
}

impl VoterRepository {
    /// Create a new voter repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user holds a receipt for a question.
    pub async fn has_voted(&self, user_id: &str, question_id: i32) -> AppResult<bool> {
        Self::has_voted_in(self.db.as_ref(), user_id, question_id).await
    }

    /// Check for a receipt on the given connection or transaction.
    pub async fn has_voted_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        question_id: i32,
    ) -> AppResult<bool> {
        let receipt = Voter::find()
            .filter(voter::Column::UserId.eq(user_id))
            .filter(voter::Column::QuestionId.eq(question_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(receipt.is_some())
    }

    /// Insert a receipt for (`user_id`, `question_id`).
    ///
    /// A violation of the unique (user, question) index is reported as
    /// [`AppError::Conflict`]; any other failure as [`AppError::Database`].
    pub async fn insert_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        question_id: i32,
    ) -> AppResult<()> {
        let model = voter::ActiveModel {
            question_id: Set(question_id),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        Voter::insert(model)
            .exec_without_returning(conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(format!(
                    "User {user_id} already voted on question {question_id}"
                )),
                _ => AppError::Database(e.to_string()),
            })?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_receipt(user_id: &str, question_id: i32) -> voter::Model {
        voter::Model {
            id: 1,
            question_id,
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_voted_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_receipt("user1", 1)]])
                .into_connection(),
        );
        let repo = VoterRepository::new(db);

        assert!(repo.has_voted("user1", 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_voted_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<voter::Model>::new()])
                .into_connection(),
        );
        let repo = VoterRepository::new(db);

        assert!(!repo.has_voted("user1", 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_receipt() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        VoterRepository::insert_in(&db, "user1", 1).await.unwrap();
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
