//! Service layer for orchestration around the core algorithms.
//!
//! Services convert between the editor's shift-keyed map and the flat records a
//! schedule stores, and run generation jobs in the background.

pub mod assignments;
pub mod generation;
pub mod job_tracker;

pub use assignments::{flatten_assignments, group_by_shift};
pub use generation::{
    GenerationBackend, GenerationInput, GenerationOutcome, GenerationRequest, RequestContext,
    SolverBackend,
};
pub use job_tracker::{
    GenerationJob, GenerationJobTracker, GenerationStatus, JobId, JobTiming, FAILED_MESSAGE,
    INFEASIBLE_MESSAGE,
};
