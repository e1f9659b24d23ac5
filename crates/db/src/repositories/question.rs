//! Question repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use polls_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    sea_query::{Expr, Func},
};

use crate::entities::{Question, choice, question};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<question::Model>> {
        Self::find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a question by ID on the given connection or transaction.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::QuestionNotFound(id))
    }

    /// Latest questions published at or before `now` that carry at least
    /// `min_choices` choices, newest first.
    pub async fn find_presentable(
        &self,
        now: DateTime<Utc>,
        min_choices: i64,
        limit: u64,
    ) -> AppResult<Vec<question::Model>> {
        Question::find()
            .join(JoinType::InnerJoin, question::Relation::Choice.def())
            .filter(question::Column::PubDate.lte(now))
            .group_by(question::Column::Id)
            .having(
                Expr::expr(Func::count(Expr::col((choice::Entity, choice::Column::Id))))
                    .gte(min_choices),
            )
            .order_by_desc(question::Column::PubDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question on the given connection or transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        model: question::ActiveModel,
    ) -> AppResult<question::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a question. Choices and receipts go with it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Question::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::QuestionNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_question(id: i32, text: &str, days: i64) -> question::Model {
        question::Model {
            id,
            question_text: text.to_string(),
            pub_date: (Utc::now() + Duration::days(days)).into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );
        let repo = QuestionRepository::new(db);

        let result = repo.get_by_id(99).await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(99))));
    }

    #[tokio::test]
    async fn test_find_presentable_returns_rows_in_query_order() {
        let newer = create_test_question(2, "Past question 2.", -5);
        let older = create_test_question(1, "Past question 1.", -30);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[newer.clone(), older.clone()]])
                .into_connection(),
        );
        let repo = QuestionRepository::new(db);

        let result = repo.find_presentable(Utc::now(), 2, 5).await.unwrap();
        assert_eq!(result, vec![newer, older]);
    }

    #[tokio::test]
    async fn test_delete_missing_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let repo = QuestionRepository::new(db);

        let result = repo.delete(5).await;
        assert!(matches!(result, Err(AppError::QuestionNotFound(5))));
    }
}
