//! forum-core
//!
//! Domain models, repository ports and the usecases that orchestrate them.
//! Nothing in here performs I/O; storage and transport live in plugins.

pub mod error;
pub mod filters;
pub mod models;
pub mod traits;
pub mod usecase;

// Re-exporting for easier access in other crates
pub use error::*;
pub use filters::*;
pub use models::*;
pub use traits::*;
pub use usecase::{ForumUsecase, Outcome, OutcomeCode, PostUsecase};
