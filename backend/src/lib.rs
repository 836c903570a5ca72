//! # Helpdesk Roster
//!
//! Shift-assignment core for a student helpdesk rostering tool.
//!
//! An administrator defines weekly shift templates, students declare the hours
//! they can work, and this crate produces a weekly roster: automatically with a
//! greedy solver, then refined by hand in an editor that tracks unsaved changes.
//!
//! ## Architecture
//!
//! - [`models`]: weekdays, times of day, students, shift templates, assignments
//!   and schedules
//! - [`scheduler`]: the availability predicate and the greedy solver
//! - [`editor`]: the editor state machine, dirty tracking and drag-and-drop
//!   encoding
//! - [`services`]: assignment flattening and asynchronous generation jobs
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server (feature `http-server`)
//!
//! ## Example
//!
//! ```
//! use helpdesk_roster::models::{Availability, DayOfWeek, ShiftTemplate, Student, TimeOfDay};
//! use helpdesk_roster::scheduler::GreedySolver;
//!
//! let shift = ShiftTemplate::new(
//!     "mon-am",
//!     DayOfWeek::MONDAY,
//!     TimeOfDay::from_hm(9, 0).unwrap(),
//!     TimeOfDay::from_hm(11, 0).unwrap(),
//!     1,
//! );
//! let student = Student::new("s1", Availability::new().with_hours(DayOfWeek::MONDAY, 9..11));
//!
//! let result = GreedySolver::default().solve(&[shift], &[student]);
//! assert!(result.is_fully_staffed());
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::RosterConfig;
pub use error::{RosterError, RosterResult};
