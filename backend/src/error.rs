//! Error types for the shift-assignment core.
//!
//! Boundary validation (time strings, weekdays, staffing bounds) and job
//! lifecycle violations are reported through [`RosterError`]. The solver and the
//! editor state machine never fail: they assume validated input and treat
//! conflicting edits as no-ops.

use crate::models::{ShiftId, StudentId};
use crate::services::job_tracker::{GenerationStatus, JobId};

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Error type for roster operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RosterError {
    /// A time-of-day string was not `HH:MM` or `HH:MM:SS` within a single day.
    #[error("Invalid time of day '{value}': {reason}")]
    InvalidTimeOfDay { value: String, reason: String },

    /// Day-of-week outside the helpdesk week (Monday=0 .. Friday=4).
    #[error("Day of week {0} is out of range (expected 0-4)")]
    DayOutOfRange(u8),

    /// A shift ends at or before it starts.
    #[error("Shift '{shift_id}' has an empty window: {start} - {end}")]
    InvalidShiftWindow {
        shift_id: ShiftId,
        start: String,
        end: String,
    },

    /// `min_staff` exceeds `max_staff`.
    #[error("Shift '{shift_id}' requires {min_staff} staff but allows at most {max_staff}")]
    InvalidStaffing {
        shift_id: ShiftId,
        min_staff: u32,
        max_staff: u32,
    },

    #[error("Shift '{0}' is defined more than once")]
    DuplicateShift(ShiftId),

    #[error("Unknown student: {0}")]
    UnknownStudent(StudentId),

    #[error("Generation job not found: {0}")]
    JobNotFound(JobId),

    /// A job was asked to move between states its lifecycle does not allow.
    #[error("Generation job {job_id} cannot move from {from} to {to}")]
    InvalidJobTransition {
        job_id: JobId,
        from: GenerationStatus,
        to: GenerationStatus,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RosterError {
    /// Whether the error was caused by caller-supplied data rather than by the
    /// core itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RosterError::InvalidTimeOfDay { .. }
                | RosterError::DayOutOfRange(_)
                | RosterError::InvalidShiftWindow { .. }
                | RosterError::InvalidStaffing { .. }
                | RosterError::DuplicateShift(_)
                | RosterError::UnknownStudent(_)
        )
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Serialization(err.to_string())
    }
}
