//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ScheduleId, ShiftTemplate, Student};
use crate::scheduler::FillPolicy;
use crate::services::{GenerationJob, GenerationRequest, GenerationStatus, JobId};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
}

/// Request body for a synchronous solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub shifts: Vec<ShiftTemplate>,
    pub students: Vec<Student>,
    /// Overrides the configured policy for this run
    #[serde(default)]
    pub fill_policy: Option<FillPolicy>,
}

/// Request body for starting a generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGenerationRequest {
    #[serde(flatten)]
    pub request: GenerationRequest,
    pub shifts: Vec<ShiftTemplate>,
    pub students: Vec<Student>,
    /// Who asked for the schedule
    #[serde(default)]
    pub actor: Option<String>,
}

/// Job status as polled by the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: JobId,
    pub status: GenerationStatus,
    pub schedule_id: Option<ScheduleId>,
    pub error_message: Option<String>,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<GenerationJob> for JobStatusResponse {
    fn from(job: GenerationJob) -> Self {
        Self {
            id: job.id,
            status: job.status,
            schedule_id: job.schedule_id,
            error_message: job.error_message,
            progress: job.progress,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

/// Response for closing a session's generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelGenerationResponse {
    /// Job that was still tracked, if any
    pub cancelled_job_id: Option<JobId>,
}
