//! # Outcome
//!
//! Result of a usecase call that the caller has to classify (e.g. into an HTTP
//! status). Unlike a plain `Result`, a conflict can still hand back a usable
//! entity.

use crate::error::AppError;

/// Transport-agnostic classification of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCode {
    Ok,
    Created,
    Conflict,
    NotFound,
    Internal,
}

#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Created(T),
    /// The entity was already there; this is the stored one.
    AlreadyExists(T),
    /// A uniqueness conflict whose existing entity could not be fetched.
    Conflict(AppError),
    NotFound(AppError),
    Failed(AppError),
}

impl<T> Outcome<T> {
    pub fn code(&self) -> OutcomeCode {
        match self {
            Outcome::Ok(_) => OutcomeCode::Ok,
            Outcome::Created(_) => OutcomeCode::Created,
            Outcome::AlreadyExists(_) | Outcome::Conflict(_) => OutcomeCode::Conflict,
            Outcome::NotFound(_) => OutcomeCode::NotFound,
            Outcome::Failed(_) => OutcomeCode::Internal,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(v) | Outcome::Created(v) | Outcome::AlreadyExists(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Ok(v) | Outcome::Created(v) | Outcome::AlreadyExists(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            Outcome::Conflict(e) | Outcome::NotFound(e) | Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Splits into the `(value, code, error)` triple.
    pub fn into_parts(self) -> (Option<T>, OutcomeCode, Option<AppError>) {
        let code = self.code();
        match self {
            Outcome::Ok(v) | Outcome::Created(v) | Outcome::AlreadyExists(v) => (Some(v), code, None),
            Outcome::Conflict(e) | Outcome::NotFound(e) | Outcome::Failed(e) => (None, code, Some(e)),
        }
    }
}
