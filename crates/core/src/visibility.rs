//! Which questions may be shown to voters.

use chrono::{DateTime, Utc};
use polls_db::entities::question;

/// Fewest choices a question needs before it is shown.
pub const MIN_CHOICES: usize = 2;

/// Number of questions on the index page.
pub const LATEST_LIMIT: u64 = 5;

/// A question is presentable once published and carrying at least
/// [`MIN_CHOICES`] choices.
#[must_use]
pub fn is_presentable(question: &question::Model, choice_count: usize, now: DateTime<Utc>) -> bool {
    question.is_published(now) && choice_count >= MIN_CHOICES
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_question(days: i64) -> question::Model {
        question::Model {
            id: 1,
            question_text: "What's up?".to_string(),
            pub_date: (Utc::now() + Duration::days(days)).into(),
        }
    }

    #[test]
    fn test_past_question_with_two_choices() {
        assert!(is_presentable(&create_test_question(-30), 2, Utc::now()));
    }

    #[test]
    fn test_future_question_is_hidden() {
        assert!(!is_presentable(&create_test_question(30), 2, Utc::now()));
    }

    #[test]
    fn test_single_choice_is_hidden() {
        assert!(!is_presentable(&create_test_question(-30), 1, Utc::now()));
    }

    #[test]
    fn test_no_choices_is_hidden() {
        assert!(!is_presentable(&create_test_question(-30), 0, Utc::now()));
    }
}
