//! Repositories for database access.
//!
//! Each repository wraps a shared connection. Operations that must run
//! inside a caller-owned transaction are exposed as `*_in` associated
//! functions taking any [`sea_orm::ConnectionTrait`].

mod choice;
mod question;
mod user;
mod voter;

pub use choice::ChoiceRepository;
pub use question::QuestionRepository;
pub use user::UserRepository;
pub use voter::VoterRepository;
