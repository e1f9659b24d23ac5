//! Business logic services.

#![allow(missing_docs)]

pub mod poll;
pub mod user;
pub mod vote;

pub use poll::{CreateQuestionInput, PollService, QuestionWithChoices};
pub use user::{CreateUserInput, UserService};
pub use vote::{VoteError, VoteService};
