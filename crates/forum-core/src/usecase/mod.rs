//! Orchestration over the repository ports.

pub mod forum;
pub mod outcome;
pub mod post;

pub use forum::ForumUsecase;
pub use outcome::{Outcome, OutcomeCode};
pub use post::PostUsecase;
