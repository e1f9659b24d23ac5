//! Vote service: eligibility, recording and tallying.

use std::sync::Arc;

use polls_common::AppError;
use polls_db::repositories::{ChoiceRepository, QuestionRepository, VoterRepository};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tracing::{debug, info};

use crate::tally::Tally;

/// Why a vote was not recorded.
///
/// The `Display` text of the selection and double-vote cases is shown to
/// the voter as-is.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Question not found: {0}")]
    NotFound(i32),

    #[error("You didn't select a choice!")]
    MissingSelection,

    #[error("Sorry, but you have already voted.")]
    AlreadyVoted,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<sea_orm::DbErr> for VoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(AppError::Database(err.to_string()))
    }
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    db: Arc<DatabaseConnection>,
    voter_repo: VoterRepository,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, voter_repo: VoterRepository) -> Self {
        Self { db, voter_repo }
    }

    /// Whether `user_id` may still vote on `question_id`.
    pub async fn can_vote(&self, user_id: &str, question_id: i32) -> Result<bool, AppError> {
        Ok(!self.voter_repo.has_voted(user_id, question_id).await?)
    }

    /// Record one vote and return the refreshed tally.
    ///
    /// The receipt, the counter increment and the recomputed percentages
    /// are written in a single transaction.
    pub async fn cast_vote(
        &self,
        user_id: &str,
        question_id: i32,
        choice_id: Option<i32>,
    ) -> Result<Tally, VoteError> {
        let txn = self.db.begin().await?;

        // Dropping `txn` on any early return rolls it back.
        if QuestionRepository::find_by_id_in(&txn, question_id)
            .await?
            .is_none()
        {
            return Err(VoteError::NotFound(question_id));
        }

        if VoterRepository::has_voted_in(&txn, user_id, question_id).await? {
            debug!(user_id, question_id, "Rejected repeat vote");
            return Err(VoteError::AlreadyVoted);
        }

        let choice = match choice_id {
            Some(id) => ChoiceRepository::find_in_question_in(&txn, id, question_id).await?,
            None => None,
        };
        let Some(choice) = choice else {
            debug!(user_id, question_id, ?choice_id, "Rejected vote without a valid choice");
            return Err(VoteError::MissingSelection);
        };

        VoterRepository::insert_in(&txn, user_id, question_id)
            .await
            .map_err(receipt_error)?;

        ChoiceRepository::increment_votes_in(&txn, choice.id).await?;

        let tally = recompute_in(&txn, question_id).await?;

        txn.commit().await?;

        info!(
            user_id,
            question_id,
            choice_id = choice.id,
            total_votes = tally.total_votes,
            "Vote recorded"
        );

        Ok(tally)
    }

    /// Recompute and persist the percentages of every choice of a question.
    pub async fn recompute_tally(&self, question_id: i32) -> Result<Tally, AppError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let tally = recompute_in(&txn, question_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(tally)
    }
}

/// A concurrent vote that committed its receipt first surfaces here as a
/// unique violation.
fn receipt_error(err: AppError) -> VoteError {
    match err {
        AppError::Conflict(_) => VoteError::AlreadyVoted,
        other => VoteError::Store(other),
    }
}

async fn recompute_in<C: ConnectionTrait>(conn: &C, question_id: i32) -> Result<Tally, AppError> {
    let choices = ChoiceRepository::find_by_question_in(conn, question_id).await?;
    let tally = Tally::from_choices(question_id, &choices);

    for line in &tally.choices {
        ChoiceRepository::set_percentage_in(conn, line.id, line.percentage).await?;
    }

    Ok(tally)
}
