//! Error types for the selection engine.

use crate::catalog::Course;
use thiserror::Error;

/// A candidate course shares a time slot with an already-selected course.
///
/// Returned by every add path; the selection is left unchanged.
#[derive(Debug, Clone, Error)]
#[error(
    "「{}」({}) conflicts with already selected 「{}」({})",
    candidate.name_local,
    candidate.code,
    blocker.name_local,
    blocker.code
)]
pub struct ConflictError {
    pub candidate: Course,
    pub blocker: Course,
}

/// Errors raised while exporting a timetable.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing is selected
    #[error("The timetable is empty, nothing to export")]
    EmptySchedule,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}
