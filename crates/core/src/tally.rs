//! Tally calculation.
//!
//! Percentages are derived from the persisted vote counters and rounded
//! half to even, so a 1/8 share (12.5%) becomes 12 and 3/8 (37.5%) becomes 38.

use std::cmp::Ordering;

use polls_db::entities::choice;
use serde::Serialize;

/// Share of `votes` in `total`, as a whole percentage.
///
/// Returns 0 when nothing has been voted yet.
#[must_use]
pub fn percentage(votes: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }

    let scaled = votes * 100;
    let quotient = scaled / total;
    let remainder = scaled % total;

    let rounded = match (remainder * 2).cmp(&total) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    };

    i32::try_from(rounded).unwrap_or(100)
}

/// Percentages for a list of vote counts, in the same order.
#[must_use]
pub fn compute_percentages(votes: &[i32]) -> Vec<i32> {
    let total: i64 = votes.iter().map(|&v| i64::from(v)).sum();
    votes
        .iter()
        .map(|&v| percentage(i64::from(v), total))
        .collect()
}

/// Result line for one choice.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceTally {
    pub id: i32,
    pub choice_text: String,
    pub votes: i32,
    /// 0..=100
    pub percentage: i32,
}

/// Vote counts and percentages of one question.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub question_id: i32,
    /// Sum of the choices' vote counters
    pub total_votes: i64,
    pub choices: Vec<ChoiceTally>,
}

impl Tally {
    /// Build a tally from the current vote counters, recomputing every
    /// percentage instead of trusting the stored ones.
    #[must_use]
    pub fn from_choices(question_id: i32, choices: &[choice::Model]) -> Self {
        let votes: Vec<i32> = choices.iter().map(|c| c.votes).collect();
        let percentages = compute_percentages(&votes);

        Self {
            question_id,
            total_votes: votes.iter().map(|&v| i64::from(v)).sum(),
            choices: choices
                .iter()
                .zip(percentages)
                .map(|(c, percentage)| ChoiceTally {
                    id: c.id,
                    choice_text: c.choice_text.clone(),
                    votes: c.votes,
                    percentage,
                })
                .collect(),
        }
    }

    /// Sum of all percentages. Rounding drifts it from 100 by at most half a
    /// point per choice.
    #[must_use]
    pub fn percentage_sum(&self) -> i32 {
        self.choices.iter().map(|c| c.percentage).sum()
    }
}
