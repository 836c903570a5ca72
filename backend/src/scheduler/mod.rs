//! Automatic shift assignment.
//!
//! [`availability`] holds the per-student predicate; [`solver`] builds a full
//! shift-to-students mapping greedily from it. Both are synchronous and pure so
//! they can be called from the generation job, the HTTP `solve` endpoint and
//! tests alike.

pub mod availability;
pub mod solver;

pub use availability::{is_available, is_student_available};
pub use solver::{auto_generate, FillPolicy, GreedySolver, ShiftShortfall, SolveResult};
