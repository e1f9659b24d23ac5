//! Core business logic for polls.

pub mod services;
pub mod tally;
pub mod visibility;

pub use services::*;
pub use tally::{ChoiceTally, Tally};
