//! Database entities.

#![allow(missing_docs)]

pub mod choice;
pub mod question;
pub mod user;
pub mod voter;

pub use choice::Entity as Choice;
pub use question::Entity as Question;
pub use user::Entity as User;
pub use voter::Entity as Voter;
