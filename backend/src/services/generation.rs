//! Schedule generation backends.
//!
//! The job tracker hands a [`GenerationInput`] to a [`GenerationBackend`] once the
//! job is running. [`SolverBackend`] is the in-process implementation built on the
//! greedy solver; tests and hosts may supply their own.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::assignments::flatten_assignments;
use super::job_tracker::{JobId, INFEASIBLE_MESSAGE};
use crate::config::RosterConfig;
use crate::error::{RosterError, RosterResult};
use crate::models::{validate_shift_templates, Assignment, Schedule, ScheduleId, ShiftTemplate, Student, StudentId};
use crate::scheduler::{FillPolicy, GreedySolver};

/// What the user asked to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub title: String,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    pub config_id: Option<String>,
    /// Students to include, in any order.
    pub student_ids: Vec<StudentId>,
}

/// Caller identity, passed explicitly with each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub actor: Option<String>,
}

/// Everything a backend needs to produce a schedule.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub request: GenerationRequest,
    pub context: RequestContext,
    pub shifts: Vec<ShiftTemplate>,
    pub students: Vec<Student>,
}

impl GenerationInput {
    /// Students named in the request, in roster order.
    ///
    /// # Errors
    /// `RosterError::UnknownStudent` for the first requested id missing from the
    /// roster.
    pub fn selected_students(&self) -> RosterResult<Vec<Student>> {
        let known: HashSet<&StudentId> = self.students.iter().map(|s| &s.id).collect();
        if let Some(missing) = self.request.student_ids.iter().find(|id| !known.contains(id)) {
            return Err(RosterError::UnknownStudent(missing.clone()));
        }

        let wanted: HashSet<&StudentId> = self.request.student_ids.iter().collect();
        Ok(self
            .students
            .iter()
            .filter(|s| wanted.contains(&s.id))
            .cloned()
            .collect())
    }

    /// Build the inactive schedule record a completed job hands back.
    pub fn build_schedule(&self, job_id: JobId, assignments: Vec<Assignment>) -> Schedule {
        Schedule {
            schedule_id: ScheduleId::generate(),
            title: self.request.title.clone(),
            is_active: false,
            assignments,
            created_at: Utc::now(),
            created_by: self.context.actor.clone(),
            updated_at: None,
            archived_at: None,
            effective_from: self.request.effective_from,
            effective_to: self.request.effective_to,
            generation_id: Some(job_id),
            config_id: self.request.config_id.clone(),
        }
    }
}

/// Result a backend reports for a running job.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(Schedule),
    /// The backend gave up; the message is shown to the user.
    Failed(String),
    /// No schedule satisfies the constraints.
    Infeasible(String),
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce a schedule for `input`. An `Err` marks the job failed with a
    /// generic message; the detail is only logged.
    async fn generate(&self, job_id: JobId, input: &GenerationInput) -> RosterResult<GenerationOutcome>;
}

/// Runs the greedy solver in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverBackend {
    solver: GreedySolver,
    infeasible_on_shortfall: bool,
}

impl SolverBackend {
    pub fn new(policy: FillPolicy, infeasible_on_shortfall: bool) -> Self {
        Self {
            solver: GreedySolver::new(policy),
            infeasible_on_shortfall,
        }
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        Self::new(config.solver.fill_policy, config.jobs.infeasible_on_shortfall)
    }
}

#[async_trait]
impl GenerationBackend for SolverBackend {
    async fn generate(&self, job_id: JobId, input: &GenerationInput) -> RosterResult<GenerationOutcome> {
        validate_shift_templates(&input.shifts)?;
        let students = input.selected_students()?;

        let needs_staff = input.shifts.iter().any(|s| s.min_staff > 0);
        if needs_staff && students.is_empty() {
            return Ok(GenerationOutcome::Infeasible(INFEASIBLE_MESSAGE.to_string()));
        }

        let result = self.solver.solve(&input.shifts, &students);
        if !result.unfilled.is_empty() {
            debug!(
                "job {}: {} shift(s) below minimum staffing",
                job_id,
                result.unfilled.len()
            );
            if self.infeasible_on_shortfall {
                return Ok(GenerationOutcome::Infeasible(INFEASIBLE_MESSAGE.to_string()));
            }
        }

        let assignments = flatten_assignments(&result.assignments, &input.shifts);
        Ok(GenerationOutcome::Completed(input.build_schedule(job_id, assignments)))
    }
}
