//! Job tracking for asynchronous schedule generation.
//!
//! A [`GenerationJobTracker`] follows at most one generation job per editing
//! session. Each job moves `pending -> running -> completed | failed | infeasible`;
//! a background driver task performs the transitions and calls the configured
//! [`GenerationBackend`]. Starting a new job or dropping the tracker cancels the
//! previous driver, after which that job never changes again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::generation::{GenerationBackend, GenerationInput, GenerationOutcome};
use crate::config::JobSettings;
use crate::define_uuid_id;
use crate::error::{RosterError, RosterResult};
use crate::models::{Schedule, ScheduleId};

define_uuid_id!(
    /// Generation job identifier.
    JobId
);

/// Message recorded when generation fails for reasons other than the constraints.
pub const FAILED_MESSAGE: &str = "An unexpected error occurred during schedule generation.";

/// Message recorded when no schedule can satisfy the constraints.
pub const INFEASIBLE_MESSAGE: &str = "Could not find a feasible schedule with the given constraints.";

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Infeasible,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Completed | GenerationStatus::Failed | GenerationStatus::Infeasible
        )
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Running => "running",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
            GenerationStatus::Infeasible => "infeasible",
        };
        f.write_str(name)
    }
}

/// Externally visible state of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: JobId,
    pub status: GenerationStatus,
    pub schedule_id: Option<ScheduleId>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Percentage, 0-100.
    pub progress: u8,
}

impl GenerationJob {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            status: GenerationStatus::Pending,
            schedule_id: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: 0,
        }
    }

    /// The backend picked the job up. Only valid while pending.
    pub fn mark_running(&mut self) -> RosterResult<()> {
        self.guard(GenerationStatus::Pending, GenerationStatus::Running)?;
        self.status = GenerationStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_completed(&mut self, schedule_id: ScheduleId) -> RosterResult<()> {
        self.guard(GenerationStatus::Running, GenerationStatus::Completed)?;
        self.status = GenerationStatus::Completed;
        self.schedule_id = Some(schedule_id);
        self.completed_at = Some(Utc::now());
        self.progress = 100;
        Ok(())
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) -> RosterResult<()> {
        self.finish_unsuccessfully(GenerationStatus::Failed, message.into())
    }

    pub fn mark_infeasible(&mut self, message: impl Into<String>) -> RosterResult<()> {
        self.finish_unsuccessfully(GenerationStatus::Infeasible, message.into())
    }

    fn finish_unsuccessfully(&mut self, status: GenerationStatus, message: String) -> RosterResult<()> {
        self.guard(GenerationStatus::Running, status)?;
        self.status = status;
        self.error_message = Some(message);
        self.completed_at = Some(Utc::now());
        self.progress = 0;
        Ok(())
    }

    fn guard(&self, expected: GenerationStatus, to: GenerationStatus) -> RosterResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(RosterError::InvalidJobTransition {
                job_id: self.id,
                from: self.status,
                to,
            })
        }
    }
}

/// Delays the driver waits before each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTiming {
    /// Pending until the backend picks the job up.
    pub pickup_delay: Duration,
    /// Running before the backend is asked for the outcome.
    pub completion_delay: Duration,
}

impl Default for JobTiming {
    fn default() -> Self {
        Self {
            pickup_delay: Duration::from_millis(800),
            completion_delay: Duration::from_millis(2500),
        }
    }
}

impl From<&JobSettings> for JobTiming {
    fn from(settings: &JobSettings) -> Self {
        Self {
            pickup_delay: Duration::from_millis(settings.pickup_delay_ms),
            completion_delay: Duration::from_millis(settings.completion_delay_ms),
        }
    }
}

/// State shared between the tracker handle and its driver tasks.
struct Shared {
    jobs: RwLock<HashMap<JobId, GenerationJob>>,
    schedules: RwLock<HashMap<JobId, Schedule>>,
    updates: watch::Sender<Option<GenerationJob>>,
}

impl Shared {
    /// Apply `change` to the job unless `cancel` has fired. The cancellation check
    /// happens under the write lock that [`GenerationJobTracker::cancel`] also
    /// takes, so no transition lands after a cancel returns.
    fn transition(
        &self,
        job_id: JobId,
        cancel: &CancellationToken,
        change: impl FnOnce(&mut GenerationJob) -> RosterResult<()>,
    ) -> RosterResult<Option<GenerationJob>> {
        let mut jobs = self.jobs.write();
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let job = jobs.get_mut(&job_id).ok_or(RosterError::JobNotFound(job_id))?;
        change(job)?;
        let snapshot = job.clone();
        drop(jobs);
        self.updates.send_replace(Some(snapshot.clone()));
        Ok(Some(snapshot))
    }
}

struct ActiveJob {
    id: JobId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    active: Option<ActiveJob>,
    /// Most recently started job, tracked or not.
    latest: Option<JobId>,
}

/// Tracks the generation job of one editing session.
///
/// Only the current job and the one it replaced are retained; older records and
/// their schedules are released when a new job starts.
pub struct GenerationJobTracker {
    shared: Arc<Shared>,
    backend: Arc<dyn GenerationBackend>,
    timing: JobTiming,
    slot: Mutex<Slot>,
}

impl GenerationJobTracker {
    pub fn new(backend: Arc<dyn GenerationBackend>, timing: JobTiming) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                jobs: RwLock::new(HashMap::new()),
                schedules: RwLock::new(HashMap::new()),
                updates,
            }),
            backend,
            timing,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Create a pending job and spawn its driver. Any job still tracked is
    /// cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, input: GenerationInput) -> JobId {
        // Held until the new job is stored so concurrent starts serialize.
        let mut slot = self.slot.lock();
        self.dispose(&mut slot.active);

        let job = GenerationJob::new(JobId::generate());
        let job_id = job.id;
        let previous = slot.latest;
        {
            let mut jobs = self.shared.jobs.write();
            jobs.retain(|id, _| Some(*id) == previous);
            jobs.insert(job_id, job.clone());
        }
        self.shared
            .schedules
            .write()
            .retain(|id, _| Some(*id) == previous);
        self.shared.updates.send_replace(Some(job));
        info!("generation job {} created ({})", job_id, input.request.title);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(drive(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            self.timing,
            job_id,
            input,
            cancel.clone(),
        ));

        slot.active = Some(ActiveJob {
            id: job_id,
            cancel,
            handle,
        });
        slot.latest = Some(job_id);
        job_id
    }

    /// Stop tracking the current job. Its record keeps whatever state it had
    /// reached and never changes again. Returns the id of the disposed job.
    pub fn cancel(&self) -> Option<JobId> {
        let mut slot = self.slot.lock();
        self.dispose(&mut slot.active)
    }

    fn dispose(&self, active: &mut Option<ActiveJob>) -> Option<JobId> {
        let active = active.take()?;
        {
            let _jobs = self.shared.jobs.write();
            active.cancel.cancel();
        }
        active.handle.abort();

        let snapshot = self.job(active.id);
        if let Some(job) = &snapshot {
            if !job.status.is_terminal() {
                warn!("generation job {} disposed while {}", job.id, job.status);
            }
        }
        // Wake waiters so they notice the job is no longer tracked.
        self.shared.updates.send_replace(snapshot);
        Some(active.id)
    }

    pub fn active_job_id(&self) -> Option<JobId> {
        self.slot.lock().active.as_ref().map(|a| a.id)
    }

    /// Number of job records currently retained.
    pub fn retained_jobs(&self) -> usize {
        self.shared.jobs.read().len()
    }

    pub fn is_tracking(&self, job_id: JobId) -> bool {
        self.active_job_id() == Some(job_id)
    }

    pub fn job(&self, job_id: JobId) -> Option<GenerationJob> {
        self.shared.jobs.read().get(&job_id).cloned()
    }

    pub fn require_job(&self, job_id: JobId) -> RosterResult<GenerationJob> {
        self.job(job_id).ok_or(RosterError::JobNotFound(job_id))
    }

    /// Schedule produced by a completed job.
    pub fn schedule(&self, job_id: JobId) -> Option<Schedule> {
        self.shared.schedules.read().get(&job_id).cloned()
    }

    /// Receive every status change of the tracked job.
    pub fn subscribe(&self) -> watch::Receiver<Option<GenerationJob>> {
        self.shared.updates.subscribe()
    }

    /// Wait until `job_id` reaches a terminal state or stops being tracked, and
    /// return its final record.
    pub async fn wait_for_terminal(&self, job_id: JobId) -> RosterResult<GenerationJob> {
        let mut updates = self.subscribe();
        loop {
            let job = self.require_job(job_id)?;
            if job.status.is_terminal() || !self.is_tracking(job_id) {
                return Ok(job);
            }
            if updates.changed().await.is_err() {
                return Ok(job);
            }
        }
    }
}

impl Drop for GenerationJobTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn drive(
    shared: Arc<Shared>,
    backend: Arc<dyn GenerationBackend>,
    timing: JobTiming,
    job_id: JobId,
    input: GenerationInput,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(timing.pickup_delay) => {}
    }
    match shared.transition(job_id, &cancel, GenerationJob::mark_running) {
        Ok(Some(_)) => info!("generation job {} running", job_id),
        Ok(None) => return,
        Err(e) => {
            warn!("generation job {} could not start: {}", job_id, e);
            return;
        }
    }

    let outcome = tokio::select! {
        _ = cancel.cancelled() => return,
        outcome = async {
            tokio::time::sleep(timing.completion_delay).await;
            backend.generate(job_id, &input).await
        } => outcome,
    };

    let finished = match outcome {
        Ok(GenerationOutcome::Completed(schedule)) => {
            let schedule_id = schedule.schedule_id;
            let assignments = schedule.assignments.len();
            let result = shared.transition(job_id, &cancel, |job| {
                job.mark_completed(schedule_id)?;
                shared.schedules.write().insert(job_id, schedule);
                Ok(())
            });
            if let Ok(Some(_)) = result {
                info!(
                    "generation job {} completed: schedule {} with {} assignment(s)",
                    job_id, schedule_id, assignments
                );
            }
            result
        }
        Ok(GenerationOutcome::Infeasible(message)) => {
            info!("generation job {} infeasible: {}", job_id, message);
            shared.transition(job_id, &cancel, |job| job.mark_infeasible(message))
        }
        Ok(GenerationOutcome::Failed(message)) => {
            warn!("generation job {} failed: {}", job_id, message);
            shared.transition(job_id, &cancel, |job| job.mark_failed(message))
        }
        Err(e) => {
            warn!("generation job {} failed: {}", job_id, e);
            shared.transition(job_id, &cancel, |job| job.mark_failed(FAILED_MESSAGE))
        }
    };

    if let Err(e) = finished {
        warn!("generation job {} could not record its outcome: {}", job_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = GenerationJob::new(JobId::generate());
        assert_eq!(job.status, GenerationStatus::Pending);
        assert!(job.schedule_id.is_none());
        assert!(job.started_at.is_none());
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn test_completed_lifecycle() {
        let mut job = GenerationJob::new(JobId::generate());
        job.mark_running().unwrap();
        assert!(job.started_at.is_some());
        let schedule_id = ScheduleId::generate();
        job.mark_completed(schedule_id).unwrap();
        assert_eq!(job.status, GenerationStatus::Completed);
        assert_eq!(job.schedule_id, Some(schedule_id));
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let mut job = GenerationJob::new(JobId::generate());
        job.mark_running().unwrap();
        job.mark_infeasible(INFEASIBLE_MESSAGE).unwrap();
        let frozen = job.clone();

        assert!(job.mark_failed("late").is_err());
        assert!(job.mark_completed(ScheduleId::generate()).is_err());
        assert!(job.mark_running().is_err());
        assert_eq!(job, frozen);
    }

    #[test]
    fn test_cannot_finish_before_running() {
        let mut job = GenerationJob::new(JobId::generate());
        let err = job.mark_failed(FAILED_MESSAGE).unwrap_err();
        assert_eq!(
            err,
            RosterError::InvalidJobTransition {
                job_id: job.id,
                from: GenerationStatus::Pending,
                to: GenerationStatus::Failed,
            }
        );
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&GenerationStatus::Infeasible).unwrap(),
            "\"infeasible\""
        );
        assert!(GenerationStatus::Failed.is_terminal());
        assert!(!GenerationStatus::Running.is_terminal());
    }
}
