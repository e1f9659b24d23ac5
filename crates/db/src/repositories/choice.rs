//! Choice repository.

use std::sync::Arc;

use polls_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

use crate::entities::{Choice, choice};

/// Choice repository for database operations.
#[derive(Clone)]
pub struct ChoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl ChoiceRepository {
    /// Create a new choice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All choices of a question, in creation order.
    pub async fn find_by_question(&self, question_id: i32) -> AppResult<Vec<choice::Model>> {
        Self::find_by_question_in(self.db.as_ref(), question_id).await
    }

    /// All choices of a question on the given connection or transaction.
    pub async fn find_by_question_in<C: ConnectionTrait>(
        conn: &C,
        question_id: i32,
    ) -> AppResult<Vec<choice::Model>> {
        Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .order_by_asc(choice::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a choice only if it belongs to the given question.
    pub async fn find_in_question_in<C: ConnectionTrait>(
        conn: &C,
        choice_id: i32,
        question_id: i32,
    ) -> AppResult<Option<choice::Model>> {
        Choice::find_by_id(choice_id)
            .filter(choice::Column::QuestionId.eq(question_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert the choices of a freshly created question.
    pub async fn create_many_in<C: ConnectionTrait>(
        conn: &C,
        models: Vec<choice::ActiveModel>,
    ) -> AppResult<()> {
        if models.is_empty() {
            return Ok(());
        }

        Choice::insert_many(models)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a choice's vote counter atomically (`votes = votes + 1`
    /// evaluated by the database, no fetch).
    pub async fn increment_votes_in<C: ConnectionTrait>(conn: &C, choice_id: i32) -> AppResult<()> {
        let result = Choice::update_many()
            .col_expr(choice::Column::Votes, Expr::col(choice::Column::Votes).add(1))
            .filter(choice::Column::Id.eq(choice_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Choice not found: {choice_id}")));
        }
        Ok(())
    }

    /// Persist a recomputed percentage.
    pub async fn set_percentage_in<C: ConnectionTrait>(
        conn: &C,
        choice_id: i32,
        percentage: i32,
    ) -> AppResult<()> {
        Choice::update_many()
            .col_expr(choice::Column::Percentage, Expr::value(percentage))
            .filter(choice::Column::Id.eq(choice_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
